//! Account service: registration, authentication, profile, admin actions
//! and the profile backup round-trip.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Datelike, Utc};
use validator::Validate;

use crate::{
    config::SecurityConfig,
    error::{AppError, AppResult},
    models::{
        backup::{ImportReport, ProfileBackup, ReviewBackup, ShelfBackup},
        user::{RegisterRequest, SessionClaims, User},
    },
    repository::Repository,
    services::{shelves::DEFAULT_SHELVES, storage::FileStorage},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: SecurityConfig,
    storage: FileStorage,
}

impl UsersService {
    pub fn new(repository: Repository, config: SecurityConfig, storage: FileStorage) -> Self {
        Self {
            repository,
            config,
            storage,
        }
    }

    /// Register a new account. The user row and the three default shelves
    /// are created in one transaction; a shelf failure rolls back the user.
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<User> {
        request.validate()?;

        if self.repository.users.username_exists(&request.username).await? {
            return Err(AppError::Business(format!(
                "Username '{}' is already taken",
                request.username
            )));
        }
        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Business(format!(
                "Email '{}' is already registered",
                request.email
            )));
        }

        let password_hash = self.hash_password(&request.password)?;

        let mut tx = self.repository.pool.begin().await?;
        let user = self
            .repository
            .users
            .create_tx(&mut tx, &request.username, &request.email, &password_hash)
            .await?;
        for name in DEFAULT_SHELVES {
            self.repository
                .shelves
                .create_tx(&mut tx, name, true, user.id)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Authenticate by username and password, returning a signed session
    /// token and the account. Blocked accounts are rejected.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user.password, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }
        if !user.enabled {
            return Err(AppError::Authentication("Account is blocked".to_string()));
        }

        let token = self.create_token_for(&user)?;
        Ok((token, user))
    }

    /// Sign session claims for an already verified account
    pub fn create_token_for(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            iat: now,
            exp: now + self.config.session_ttl_hours as i64 * 3600,
        };
        claims
            .create_token(&self.config.session_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<User> {
        self.repository
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))
    }

    /// Update bio and, when a non-empty upload is present, the avatar.
    /// The stored path is what browsers fetch, so it carries the
    /// `/uploads/` prefix.
    pub async fn update_profile(
        &self,
        user_id: i64,
        bio: Option<&str>,
        avatar_upload: Option<(&str, &[u8])>,
    ) -> AppResult<User> {
        if let Some(bio) = bio {
            if bio.chars().count() > 1000 {
                return Err(AppError::Business(
                    "Bio must be at most 1000 characters".to_string(),
                ));
            }
        }

        let avatar_path = match avatar_upload {
            Some((name, data)) if !data.is_empty() => {
                let filename = self.storage.store(name, data).await?;
                Some(format!("/uploads/{}", filename))
            }
            _ => None,
        };

        self.repository
            .users
            .update_profile(user_id, bio, avatar_path.as_deref())
            .await
    }

    /// Flip the enabled flag. Existing session tokens stay valid until
    /// expiry; the login gate is what enforces the block.
    pub async fn toggle_block(&self, user_id: i64) -> AppResult<bool> {
        let enabled = self.repository.users.toggle_enabled(user_id).await?;
        tracing::info!(user_id, enabled, "user block toggled");
        Ok(enabled)
    }

    /// Remove an account. Reviews are anonymized first, then shelves go,
    /// then the user row, all in one transaction.
    pub async fn delete_by_admin(&self, user_id: i64) -> AppResult<()> {
        self.repository.users.get_by_id(user_id).await?;

        let mut tx = self.repository.pool.begin().await?;
        self.repository
            .reviews
            .anonymize_by_user_tx(&mut tx, user_id)
            .await?;
        self.repository
            .shelves
            .delete_all_by_user_tx(&mut tx, user_id)
            .await?;
        self.repository.users.delete_tx(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(user_id, "user deleted, reviews anonymized");
        Ok(())
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list_all().await
    }

    /// Reviews the user wrote in the current calendar year
    pub async fn books_read_this_year(&self, user_id: i64) -> AppResult<i64> {
        let year = Utc::now().year();
        self.repository
            .statistics
            .books_reviewed_in_year(user_id, year)
            .await
    }

    /// Serialize a user's profile, shelves and reviews as a pretty-printed
    /// JSON backup document.
    pub async fn export_profile(&self, user_id: i64) -> AppResult<Vec<u8>> {
        let user = self.repository.users.get_by_id(user_id).await?;

        let mut shelves = Vec::new();
        for shelf in self.repository.shelves.all_by_user(user.id).await? {
            let books = self
                .repository
                .shelves
                .books_on_shelf(shelf.id)
                .await?
                .into_iter()
                .map(|b| b.title)
                .collect();
            shelves.push(ShelfBackup {
                name: shelf.name,
                books,
            });
        }

        let reviews = self
            .repository
            .reviews
            .by_user(user.id)
            .await?
            .into_iter()
            .map(|r| ReviewBackup {
                book_title: r.book_title,
                rating: r.rating,
                content: Some(r.content),
                created_at: r.created_at.to_rfc3339(),
            })
            .collect();

        let backup = ProfileBackup {
            username: user.username,
            email: user.email,
            bio: user.bio,
            join_date: user.created_at.to_rfc3339(),
            shelves,
            reviews,
        };

        serde_json::to_vec_pretty(&backup)
            .map_err(|e| AppError::Internal(format!("Failed to serialize backup: {}", e)))
    }

    /// Restore shelves from a backup document, best effort. Shelves are
    /// found or created by exact name; books resolve by exact title, and
    /// titles no longer in the catalog are skipped. Only a malformed
    /// document fails the whole import.
    pub async fn import_profile(&self, user_id: i64, data: &[u8]) -> AppResult<ImportReport> {
        let backup: ProfileBackup = serde_json::from_slice(data)
            .map_err(|e| AppError::Business(format!("Invalid backup file: {}", e)))?;

        let mut report = ImportReport::default();
        for shelf_backup in &backup.shelves {
            let shelf = match self
                .repository
                .shelves
                .find_by_name_and_user(&shelf_backup.name, user_id)
                .await?
            {
                Some(shelf) => shelf,
                None => {
                    self.repository
                        .shelves
                        .create(&shelf_backup.name, false, user_id)
                        .await?
                }
            };
            report.shelves_processed += 1;

            for title in &shelf_backup.books {
                match self.repository.books.find_by_title(title).await? {
                    Some(book) => {
                        if self.repository.shelves.add_book(shelf.id, book.id).await? {
                            report.books_added += 1;
                        }
                    }
                    None => {
                        tracing::debug!(title = %title, "import skipped unknown title");
                        report.books_skipped += 1;
                    }
                }
            }
        }

        tracing::info!(
            user_id,
            shelves = report.shelves_processed,
            added = report.books_added,
            skipped = report.books_skipped,
            "profile import finished"
        );
        Ok(report)
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, stored_hash: &str, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
