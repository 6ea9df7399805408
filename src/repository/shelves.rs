//! Shelves repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::AppResult,
    models::shelf::{Shelf, ShelfBook},
};

#[derive(Clone)]
pub struct ShelvesRepository {
    pool: Pool<Postgres>,
}

impl ShelvesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All shelves for one user, system shelves first, then by id
    pub async fn all_by_user(&self, user_id: i64) -> AppResult<Vec<Shelf>> {
        let shelves = sqlx::query_as::<_, Shelf>(
            r#"
            SELECT id, name, is_system_shelf, user_id FROM shelves
            WHERE user_id = $1
            ORDER BY is_system_shelf DESC, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shelves)
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<Shelf>> {
        let shelf = sqlx::query_as::<_, Shelf>(
            "SELECT id, name, is_system_shelf, user_id FROM shelves WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shelf)
    }

    /// Exact (case-sensitive) name match within one user's shelves
    pub async fn find_by_name_and_user(&self, name: &str, user_id: i64) -> AppResult<Option<Shelf>> {
        let shelf = sqlx::query_as::<_, Shelf>(
            "SELECT id, name, is_system_shelf, user_id FROM shelves WHERE name = $1 AND user_id = $2",
        )
        .bind(name)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shelf)
    }

    pub async fn name_exists_for_user(&self, name: &str, user_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM shelves WHERE name = $1 AND user_id = $2)",
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create(&self, name: &str, is_system: bool, user_id: i64) -> AppResult<Shelf> {
        let shelf = sqlx::query_as::<_, Shelf>(
            r#"
            INSERT INTO shelves (name, is_system_shelf, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, is_system_shelf, user_id
            "#,
        )
        .bind(name)
        .bind(is_system)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(shelf)
    }

    pub async fn create_tx(
        &self,
        conn: &mut PgConnection,
        name: &str,
        is_system: bool,
        user_id: i64,
    ) -> AppResult<Shelf> {
        let shelf = sqlx::query_as::<_, Shelf>(
            r#"
            INSERT INTO shelves (name, is_system_shelf, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, is_system_shelf, user_id
            "#,
        )
        .bind(name)
        .bind(is_system)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(shelf)
    }

    /// Books on a shelf, in insertion-id order
    pub async fn books_on_shelf(&self, shelf_id: i64) -> AppResult<Vec<ShelfBook>> {
        let books = sqlx::query_as::<_, ShelfBook>(
            r#"
            SELECT b.id, b.title, b.cover_image
            FROM shelf_books sb
            JOIN books b ON sb.book_id = b.id
            WHERE sb.shelf_id = $1
            ORDER BY b.id
            "#,
        )
        .bind(shelf_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Idempotent link insert
    pub async fn add_book(&self, shelf_id: i64, book_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO shelf_books (shelf_id, book_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(shelf_id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn add_book_tx(
        &self,
        conn: &mut PgConnection,
        shelf_id: i64,
        book_id: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO shelf_books (shelf_id, book_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(shelf_id)
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Idempotent link removal
    pub async fn remove_book(&self, shelf_id: i64, book_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM shelf_books WHERE shelf_id = $1 AND book_id = $2")
            .bind(shelf_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_book_tx(
        &self,
        conn: &mut PgConnection,
        shelf_id: i64,
        book_id: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM shelf_books WHERE shelf_id = $1 AND book_id = $2")
            .bind(shelf_id)
            .bind(book_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Unlink a book from every shelf it sits on (book deletion cascade)
    pub async fn remove_book_everywhere_tx(
        &self,
        conn: &mut PgConnection,
        book_id: i64,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM shelf_books WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Drop a user's shelves and their links (account deletion cascade)
    pub async fn delete_all_by_user_tx(&self, conn: &mut PgConnection, user_id: i64) -> AppResult<()> {
        sqlx::query(
            "DELETE FROM shelf_books WHERE shelf_id IN (SELECT id FROM shelves WHERE user_id = $1)",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM shelves WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn count_books(&self, shelf_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shelf_books WHERE shelf_id = $1")
            .bind(shelf_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
