//! Review model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Review row from database. `user_id` is nullable: it is severed
/// (anonymized) when the author's account is deleted.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Review {
    pub id: i64,
    pub rating: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub book_id: i64,
    pub user_id: Option<i64>,
}

/// Review joined with its author's username and the book title,
/// used by listings and the admin surface.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReviewDetail {
    pub id: i64,
    pub rating: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub book_id: i64,
    pub book_title: String,
    /// None for anonymized reviews
    pub username: Option<String>,
}

/// Add-review request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 10, message = "Rating must be between 1 and 10"))]
    pub rating: i32,
    #[validate(length(min = 5, max = 4000, message = "Review must be 5-4000 characters"))]
    pub content: String,
}
