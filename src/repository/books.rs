//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookInput, BookSummary},
};

/// Shared SELECT for the display DTO: author name joined in, average
/// rating computed from live review rows, 0.0 when there are none.
const SUMMARY_SELECT: &str = r#"
    SELECT b.id, b.title, b.isbn, b.cover_image, b.description, b.author_id,
           a.first_name || ' ' || a.last_name AS author_name,
           COALESCE(r.avg_rating, 0.0) AS average_rating
    FROM books b
    JOIN authors a ON b.author_id = a.id
    LEFT JOIN (
        SELECT book_id, AVG(rating)::float8 AS avg_rating
        FROM reviews GROUP BY book_id
    ) r ON r.book_id = b.id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Paginated catalog listing
    pub async fn page_summaries(&self, page: i64, per_page: i64) -> AppResult<(Vec<BookSummary>, i64)> {
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let query = format!("{} ORDER BY b.id LIMIT $1 OFFSET $2", SUMMARY_SELECT);
        let books = sqlx::query_as::<_, BookSummary>(&query)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Free-text search: case-insensitive LIKE on title, author last name
    /// or ISBN substring.
    pub async fn search_summaries(
        &self,
        term: &str,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BookSummary>, i64)> {
        let offset = (page - 1) * per_page;
        let pattern = format!("%{}%", term.to_lowercase());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM books b JOIN authors a ON b.author_id = a.id
            WHERE LOWER(b.title) LIKE $1
               OR LOWER(a.last_name) LIKE $1
               OR LOWER(b.isbn) LIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            r#"{}
            WHERE LOWER(b.title) LIKE $1
               OR LOWER(a.last_name) LIKE $1
               OR LOWER(b.isbn) LIKE $1
            ORDER BY b.id LIMIT $2 OFFSET $3
            "#,
            SUMMARY_SELECT
        );
        let books = sqlx::query_as::<_, BookSummary>(&query)
            .bind(&pattern)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Full unpaginated summary list (CSV export)
    pub async fn all_summaries(&self) -> AppResult<Vec<BookSummary>> {
        let query = format!("{} ORDER BY b.id", SUMMARY_SELECT);
        let books = sqlx::query_as::<_, BookSummary>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Top books by review count, ties broken by id (homepage)
    pub async fn most_popular(&self, limit: i64) -> AppResult<Vec<BookSummary>> {
        let query = format!(
            r#"{}
            LEFT JOIN (
                SELECT book_id, COUNT(*) AS review_count
                FROM reviews GROUP BY book_id
            ) rc ON rc.book_id = b.id
            ORDER BY COALESCE(rc.review_count, 0) DESC, b.id ASC
            LIMIT $1
            "#,
            SUMMARY_SELECT
        );
        let books = sqlx::query_as::<_, BookSummary>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Display DTO by id
    pub async fn summary_by_id(&self, id: i64) -> AppResult<BookSummary> {
        let query = format!("{} WHERE b.id = $1", SUMMARY_SELECT);
        sqlx::query_as::<_, BookSummary>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Raw book row by id
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, isbn, cover_image, description, author_id FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    pub async fn exists_by_author(&self, author_id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE author_id = $1)")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Exact-title lookup used by profile import
    pub async fn find_by_title(&self, title: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, isbn, cover_image, description, author_id FROM books WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Create a new book
    pub async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, isbn, cover_image, description, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, isbn, cover_image, description, author_id
            "#,
        )
        .bind(&input.title)
        .bind(&input.isbn)
        .bind(&input.cover_image)
        .bind(&input.description)
        .bind(input.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    /// Replace all mutable fields, including the author assignment
    pub async fn update(&self, id: i64, input: &BookInput) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, isbn = $2, cover_image = $3, description = $4, author_id = $5
            WHERE id = $6
            RETURNING id, title, isbn, cover_image, description, author_id
            "#,
        )
        .bind(&input.title)
        .bind(&input.isbn)
        .bind(&input.cover_image)
        .bind(&input.description)
        .bind(input.author_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book row inside a caller-managed transaction. Reviews and
    /// shelf links must already be gone (explicit service-level cascade).
    pub async fn delete_tx(&self, conn: &mut PgConnection, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
