//! Reviews repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::review::{Review, ReviewDetail},
};

const DETAIL_SELECT: &str = r#"
    SELECT r.id, r.rating, r.content, r.created_at, r.book_id, r.user_id,
           b.title AS book_title, u.username
    FROM reviews r
    JOIN books b ON r.book_id = b.id
    LEFT JOIN users u ON r.user_id = u.id
"#;

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Reviews for one book, newest first. Anonymized reviews come back
    /// with a NULL username.
    pub async fn for_book(&self, book_id: i64) -> AppResult<Vec<ReviewDetail>> {
        let query = format!("{} WHERE r.book_id = $1 ORDER BY r.created_at DESC", DETAIL_SELECT);
        let reviews = sqlx::query_as::<_, ReviewDetail>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    /// All reviews, newest first (moderation view)
    pub async fn all(&self) -> AppResult<Vec<ReviewDetail>> {
        let query = format!("{} ORDER BY r.created_at DESC", DETAIL_SELECT);
        let reviews = sqlx::query_as::<_, ReviewDetail>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    /// One user's reviews, oldest first (profile backup order)
    pub async fn by_user(&self, user_id: i64) -> AppResult<Vec<ReviewDetail>> {
        let query = format!("{} WHERE r.user_id = $1 ORDER BY r.created_at ASC", DETAIL_SELECT);
        let reviews = sqlx::query_as::<_, ReviewDetail>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    pub async fn create(
        &self,
        book_id: i64,
        user_id: i64,
        rating: i32,
        content: Option<&str>,
    ) -> AppResult<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (rating, content, book_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, rating, content, created_at, book_id, user_id
            "#,
        )
        .bind(rating)
        .bind(content)
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    /// Detach a user's reviews from their account, keeping rating history
    pub async fn anonymize_by_user_tx(&self, conn: &mut PgConnection, user_id: i64) -> AppResult<u64> {
        let result = sqlx::query("UPDATE reviews SET user_id = NULL WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Review with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete_by_book_tx(&self, conn: &mut PgConnection, book_id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM reviews WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}
