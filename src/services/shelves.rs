//! Shelf service
//!
//! Every user owns three system shelves created at registration; system
//! shelves cannot be renamed or deleted. The "read" shelf doubles as the
//! source for the yearly reading counter.

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::shelf::{CreateShelfRequest, Shelf, ShelfWithBooks},
    repository::Repository,
};

/// Default shelf names, kept in the original Polish form because existing
/// profile backups reference them verbatim.
pub const DEFAULT_SHELVES: [&str; 3] = ["Przeczytane", "Chcę przeczytać", "Teraz czytam"];

/// The shelf counted by the yearly reading statistics
pub const READ_SHELF: &str = "Przeczytane";

#[derive(Clone)]
pub struct ShelvesService {
    repository: Repository,
}

impl ShelvesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All of a user's shelves with their books loaded
    pub async fn shelves_with_books(&self, user_id: i64) -> AppResult<Vec<ShelfWithBooks>> {
        let shelves = self.repository.shelves.all_by_user(user_id).await?;

        let mut result = Vec::with_capacity(shelves.len());
        for shelf in shelves {
            let books = self.repository.shelves.books_on_shelf(shelf.id).await?;
            result.push(ShelfWithBooks {
                id: shelf.id,
                name: shelf.name,
                is_system_shelf: shelf.is_system_shelf,
                books,
            });
        }
        Ok(result)
    }

    /// Create a custom shelf. Names are unique per user (exact match).
    pub async fn create_shelf(&self, user_id: i64, request: &CreateShelfRequest) -> AppResult<Shelf> {
        request.validate()?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::Business("Shelf name cannot be blank".to_string()));
        }
        if self
            .repository
            .shelves
            .name_exists_for_user(name, user_id)
            .await?
        {
            return Err(AppError::Business(format!(
                "Shelf named '{}' already exists",
                name
            )));
        }
        self.repository.shelves.create(name, false, user_id).await
    }

    /// Put a book on one of the caller's shelves. Re-adding an already
    /// shelved book is a no-op.
    pub async fn add_book(&self, user_id: i64, shelf_id: i64, book_id: i64) -> AppResult<()> {
        let shelf = self.owned_shelf(user_id, shelf_id).await?;
        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::Business(format!(
                "Book with id {} does not exist",
                book_id
            )));
        }
        self.repository.shelves.add_book(shelf.id, book_id).await?;
        Ok(())
    }

    /// Take a book off one of the caller's shelves. Removing a book that
    /// is not there is a no-op.
    pub async fn remove_book(&self, user_id: i64, shelf_id: i64, book_id: i64) -> AppResult<()> {
        let shelf = self.owned_shelf(user_id, shelf_id).await?;
        self.repository.shelves.remove_book(shelf.id, book_id).await?;
        Ok(())
    }

    /// Move a book between two of the caller's shelves. Equivalent to a
    /// remove from the source followed by an add to the target, in one
    /// transaction so the book never vanishes from both. Both halves keep
    /// their no-op semantics: a book absent from the source still lands
    /// on the target.
    pub async fn move_book(
        &self,
        user_id: i64,
        source_shelf_id: i64,
        book_id: i64,
        target_shelf_id: i64,
    ) -> AppResult<()> {
        let source = self.owned_shelf(user_id, source_shelf_id).await?;
        let target = self.owned_shelf(user_id, target_shelf_id).await?;

        let mut tx = self.repository.pool.begin().await?;
        self.repository
            .shelves
            .remove_book_tx(&mut tx, source.id, book_id)
            .await?;
        self.repository
            .shelves
            .add_book_tx(&mut tx, target.id, book_id)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    /// How many books a user has on the read shelf. Zero when the shelf is
    /// somehow missing rather than an error.
    pub async fn books_read_count(&self, user_id: i64) -> AppResult<i64> {
        match self
            .repository
            .shelves
            .find_by_name_and_user(READ_SHELF, user_id)
            .await?
        {
            Some(shelf) => self.repository.shelves.count_books(shelf.id).await,
            None => Ok(0),
        }
    }

    async fn owned_shelf(&self, user_id: i64, shelf_id: i64) -> AppResult<Shelf> {
        let shelf = self
            .repository
            .shelves
            .get(shelf_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shelf with id {} not found", shelf_id)))?;
        if shelf.user_id != user_id {
            return Err(AppError::Business(
                "Shelf belongs to a different user".to_string(),
            ));
        }
        Ok(shelf)
    }
}
