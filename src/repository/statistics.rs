//! Aggregate queries backing the statistics views

use sqlx::{Pool, Postgres, Row};

use crate::error::AppResult;

#[derive(Clone)]
pub struct StatisticsRepository {
    pool: Pool<Postgres>,
}

impl StatisticsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Vote counts per rating value for one book. Only ratings that were
    /// actually cast appear; callers pad the 1..=10 range themselves.
    pub async fn rating_distribution(&self, book_id: i64) -> AppResult<Vec<(i32, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT rating, COUNT(*) AS votes
            FROM reviews
            WHERE book_id = $1
            GROUP BY rating
            ORDER BY rating DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("rating"), row.get("votes")))
            .collect())
    }

    pub async fn average_rating(&self, book_id: i64) -> AppResult<Option<f64>> {
        let row = sqlx::query("SELECT AVG(rating)::float8 AS avg FROM reviews WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("avg"))
    }

    pub async fn rating_count(&self, book_id: i64) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM reviews WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("cnt"))
    }

    /// Distinct shelves holding this book, across all users
    pub async fn reader_count(&self, book_id: i64) -> AppResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(DISTINCT shelf_id) AS cnt FROM shelf_books WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("cnt"))
    }

    /// Books a user reviewed in a given calendar year. Review date stands
    /// in for read date.
    pub async fn books_reviewed_in_year(&self, user_id: i64, year: i32) -> AppResult<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt FROM reviews
            WHERE user_id = $1 AND EXTRACT(YEAR FROM created_at)::int = $2
            "#,
        )
        .bind(user_id)
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("cnt"))
    }
}
