//! Shelf model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Shelf row from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Shelf {
    pub id: i64,
    pub name: String,
    pub is_system_shelf: bool,
    pub user_id: i64,
}

/// Minimal book reference carried inside a shelf listing
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ShelfBook {
    pub id: i64,
    pub title: String,
    pub cover_image: Option<String>,
}

/// Shelf with its (explicitly loaded) book collection
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShelfWithBooks {
    pub id: i64,
    pub name: String,
    pub is_system_shelf: bool,
    pub books: Vec<ShelfBook>,
}

/// Create-shelf request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShelfRequest {
    #[validate(length(min = 2, max = 50, message = "Shelf name must be 2-50 characters"))]
    pub name: String,
}

/// Add-book-to-shelf request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddBookRequest {
    pub book_id: i64,
}

/// Move-book-between-shelves request
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveBookRequest {
    pub book_id: i64,
    pub target_shelf_id: i64,
}
