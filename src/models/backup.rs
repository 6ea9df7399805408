//! Profile backup document (JSON export/import round-trip)
//!
//! Field names stay camelCase so backups produced by earlier deployments
//! keep importing cleanly.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBackup {
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub join_date: String,
    pub shelves: Vec<ShelfBackup>,
    #[serde(default)]
    pub reviews: Vec<ReviewBackup>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShelfBackup {
    pub name: String,
    pub books: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBackup {
    pub book_title: String,
    pub rating: i32,
    pub content: Option<String>,
    pub created_at: String,
}

/// Aggregate outcome of a best-effort profile import. Missing book titles
/// are skipped silently per item; this only surfaces the totals.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ImportReport {
    pub shelves_processed: usize,
    pub books_added: usize,
    pub books_skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_document_round_trips_with_camel_case_keys() {
        let backup = ProfileBackup {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            bio: None,
            join_date: "2024-01-01T00:00:00Z".to_string(),
            shelves: vec![ShelfBackup {
                name: "Przeczytane".to_string(),
                books: vec!["Wiedźmin".to_string()],
            }],
            reviews: vec![ReviewBackup {
                book_title: "Wiedźmin".to_string(),
                rating: 9,
                content: Some("Świetna".to_string()),
                created_at: "2024-02-01T12:00:00Z".to_string(),
            }],
        };

        let json = serde_json::to_string_pretty(&backup).unwrap();
        assert!(json.contains("\"joinDate\""));
        assert!(json.contains("\"bookTitle\""));

        let parsed: ProfileBackup = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.shelves[0].books, vec!["Wiedźmin"]);
        assert_eq!(parsed.reviews[0].rating, 9);
    }

    #[test]
    fn backup_without_reviews_still_parses() {
        let json = r#"{
            "username": "bob",
            "email": "bob@example.com",
            "bio": null,
            "joinDate": "",
            "shelves": []
        }"#;
        let parsed: ProfileBackup = serde_json::from_str(json).unwrap();
        assert!(parsed.reviews.is_empty());
    }
}
