//! Local file storage for uploaded images

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store an uploaded file under a fresh unique name and return the
    /// stored filename. The original name only contributes a sanitized
    /// suffix, so path components in it cannot escape the upload dir.
    pub async fn store(&self, original_name: &str, data: &[u8]) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {}", e)))?;

        let filename = format!("{}_{}", Uuid::new_v4(), sanitize_filename(original_name));
        let path = self.dir.join(&filename);

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;

        tracing::debug!(file = %filename, size = data.len(), "stored upload");
        Ok(filename)
    }
}

fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_lose_path_components_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("zdjęcie profilowe.png"), "zdj_cie_profilowe.png");
        assert_eq!(sanitize_filename(""), "upload");
    }
}
