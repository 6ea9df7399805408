//! Catalog service: books, authors and per-book statistics

use std::collections::BTreeMap;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, BookInput, BookStats, BookSummary, RatingStat},
    },
    repository::Repository,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Upper bound on the page number, so the `(page - 1) * per_page`
/// OFFSET can never overflow or go negative on hostile input.
pub const MAX_PAGE: i64 = 1_000_000;

/// Header of the catalog CSV export. Kept byte-for-byte stable so
/// downstream spreadsheets keep importing.
pub const CSV_HEADER: &str = "ID;Tytul;Autor;ISBN;Ocena";

fn clamp_paging(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, per_page)
}

/// Semicolons are the field separator; strip them out of free text.
fn csv_field(value: &str) -> String {
    value.replace(';', " ")
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(
        &self,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<(Vec<BookSummary>, i64)> {
        let (page, per_page) = clamp_paging(page, per_page);
        self.repository.books.page_summaries(page, per_page).await
    }

    /// Search by title, author last name or ISBN. A blank term falls back
    /// to the plain listing.
    pub async fn search_books(
        &self,
        term: &str,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<(Vec<BookSummary>, i64)> {
        let term = term.trim();
        if term.is_empty() {
            return self.list_books(page, per_page).await;
        }
        let (page, per_page) = clamp_paging(page, per_page);
        self.repository
            .books
            .search_summaries(term, page, per_page)
            .await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<BookSummary> {
        self.repository.books.summary_by_id(id).await
    }

    pub async fn most_popular(&self, limit: i64) -> AppResult<Vec<BookSummary>> {
        self.repository.books.most_popular(limit).await
    }

    /// Raw per-book histogram: only ratings that were actually cast,
    /// highest rating first.
    pub async fn rating_distribution(&self, book_id: i64) -> AppResult<Vec<RatingStat>> {
        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }
        let stats = self
            .repository
            .statistics
            .rating_distribution(book_id)
            .await?
            .into_iter()
            .map(|(rating, count)| RatingStat { rating, count })
            .collect();
        Ok(stats)
    }

    /// Rating statistics for one book. The distribution always carries
    /// every rating 1-10, padding unseen ratings with zero.
    pub async fn book_stats(&self, book_id: i64) -> AppResult<BookStats> {
        let raw = self.rating_distribution(book_id).await?;

        let average_rating = self
            .repository
            .statistics
            .average_rating(book_id)
            .await?
            .unwrap_or(0.0);
        let rating_count = self.repository.statistics.rating_count(book_id).await?;
        let reader_count = self.repository.statistics.reader_count(book_id).await?;

        let mut rating_distribution: BTreeMap<i32, i64> = (1..=10).map(|r| (r, 0)).collect();
        for stat in raw {
            rating_distribution.insert(stat.rating, stat.count);
        }

        Ok(BookStats {
            average_rating,
            rating_count,
            reader_count,
            rating_distribution,
        })
    }

    pub async fn create_book(&self, input: &BookInput) -> AppResult<Book> {
        input.validate()?;
        self.ensure_author_exists(input.author_id).await?;
        if self.repository.books.isbn_exists(&input.isbn, None).await? {
            return Err(AppError::Business(format!(
                "A book with ISBN {} already exists",
                input.isbn
            )));
        }
        self.repository.books.create(input).await
    }

    pub async fn update_book(&self, id: i64, input: &BookInput) -> AppResult<Book> {
        input.validate()?;
        self.ensure_author_exists(input.author_id).await?;
        if self
            .repository
            .books
            .isbn_exists(&input.isbn, Some(id))
            .await?
        {
            return Err(AppError::Business(format!(
                "A book with ISBN {} already exists",
                input.isbn
            )));
        }
        self.repository.books.update(id, input).await
    }

    /// Delete a book and everything hanging off it. Reviews and shelf
    /// links go in the same transaction, so a failure leaves the catalog
    /// untouched.
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;

        self.repository.reviews.delete_by_book_tx(&mut tx, id).await?;
        self.repository
            .shelves
            .remove_book_everywhere_tx(&mut tx, id)
            .await?;
        self.repository.books.delete_tx(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!(book_id = id, "book deleted with reviews and shelf links");
        Ok(())
    }

    /// Catalog CSV export, one row per book. Average ratings are printed
    /// with one decimal (books without reviews show 0.0).
    pub async fn export_books_csv(&self) -> AppResult<String> {
        let books = self.repository.books.all_summaries().await?;

        let mut csv = String::from(CSV_HEADER);
        csv.push('\n');
        for book in &books {
            csv.push_str(&format!(
                "{};{};{};{};{:.1}\n",
                book.id,
                csv_field(&book.title),
                csv_field(&book.author_name),
                csv_field(&book.isbn),
                book.average_rating
            ));
        }

        Ok(csv)
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: i64) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, author: &CreateAuthor) -> AppResult<Author> {
        author.validate()?;
        self.repository.authors.create(author).await
    }

    pub async fn update_author(&self, id: i64, author: &UpdateAuthor) -> AppResult<Author> {
        author.validate()?;
        self.repository.authors.update(id, author).await
    }

    /// Authors with assigned books cannot be removed.
    pub async fn delete_author(&self, id: i64) -> AppResult<()> {
        self.repository.authors.get_by_id(id).await?;
        if self.repository.books.exists_by_author(id).await? {
            return Err(AppError::Conflict(
                "Author has assigned books and cannot be deleted".to_string(),
            ));
        }
        self.repository.authors.delete(id).await
    }

    async fn ensure_author_exists(&self, author_id: i64) -> AppResult<()> {
        self.repository
            .authors
            .get_by_id(author_id)
            .await
            .map_err(|e| missing_author_error(e, author_id))?;
        Ok(())
    }
}

/// Only a missing author becomes a business error; database failures
/// keep their own status.
fn missing_author_error(err: AppError, author_id: i64) -> AppError {
    match err {
        AppError::NotFound(_) => {
            AppError::Business(format!("Author with id {} does not exist", author_id))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_defaults_and_clamps() {
        assert_eq!(clamp_paging(None, None), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(clamp_paging(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_paging(Some(3), Some(500)), (3, MAX_PAGE_SIZE));
    }

    #[test]
    fn huge_page_numbers_cannot_overflow_the_offset() {
        let (page, per_page) = clamp_paging(Some(i64::MAX), None);
        assert_eq!((page, per_page), (MAX_PAGE, DEFAULT_PAGE_SIZE));

        // The OFFSET expression used by the book queries
        let offset = (page - 1) * MAX_PAGE_SIZE;
        assert!(offset >= 0);
    }

    #[test]
    fn only_a_missing_author_maps_to_a_business_error() {
        let err = missing_author_error(AppError::NotFound("Author not found".to_string()), 7);
        assert!(matches!(err, AppError::Business(_)));

        let err = missing_author_error(AppError::Database(sqlx::Error::PoolClosed), 7);
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn csv_fields_never_contain_the_separator() {
        assert_eq!(csv_field("a;b;c"), "a b c");
        assert_eq!(csv_field("plain"), "plain");
    }
}
