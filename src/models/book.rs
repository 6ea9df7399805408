//! Book model, display DTOs and catalog statistics types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// ISBN-10 / ISBN-13, validated after stripping separators
static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:97[89])?\d{9}[\dX]$").expect("invalid ISBN regex"));

pub fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    let normalized: String = isbn
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect::<String>()
        .to_uppercase();
    if ISBN_RE.is_match(&normalized) {
        Ok(())
    } else {
        let mut error = ValidationError::new("isbn");
        error.message = Some("Invalid ISBN format".into());
        Err(error)
    }
}

/// Full book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub author_id: i64,
}

/// Display DTO for catalog listings: joined author name plus the computed
/// average rating (0.0 when the book has no reviews, never null).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub author_id: i64,
    pub author_name: String,
    pub average_rating: f64,
}

/// Create/replace book request. Update replaces all mutable fields,
/// including reassigning the author.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 2, max = 100, message = "Title must be 2-100 characters"))]
    pub title: String,
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: String,
    #[validate(length(max = 255, message = "Cover path is too long"))]
    pub cover_image: Option<String>,
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,
    pub author_id: i64,
}

/// Pagination parameters for catalog listings
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Free-text search parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub query: String,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// One histogram entry of the raw per-book rating distribution
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RatingStat {
    pub rating: i32,
    pub count: i64,
}

/// Rating statistics for one book. The distribution carries every rating
/// 1-10, unseen ratings padded with 0.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookStats {
    pub average_rating: f64,
    pub rating_count: i64,
    /// Distinct shelves holding this book
    pub reader_count: i64,
    pub rating_distribution: BTreeMap<i32, i64>,
}

impl BookStats {
    /// Share of votes for one rating, in whole percent
    pub fn percentage(&self, rating: i32) -> i64 {
        if self.rating_count == 0 {
            return 0;
        }
        let count = self.rating_distribution.get(&rating).copied().unwrap_or(0);
        count * 100 / self.rating_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isbn_accepts_ten_and_thirteen_digit_forms() {
        assert!(validate_isbn("83-246-0279-8").is_ok());
        assert!(validate_isbn("978-83-246-0279-5").is_ok());
        assert!(validate_isbn("043942089X").is_ok());
        assert!(validate_isbn("12345").is_err());
        assert!(validate_isbn("not-an-isbn").is_err());
    }

    #[test]
    fn stats_percentage_handles_zero_votes() {
        let stats = BookStats {
            average_rating: 0.0,
            rating_count: 0,
            reader_count: 0,
            rating_distribution: BTreeMap::new(),
        };
        assert_eq!(stats.percentage(5), 0);

        let mut distribution = BTreeMap::new();
        distribution.insert(5, 2);
        distribution.insert(4, 1);
        let stats = BookStats {
            average_rating: 4.67,
            rating_count: 3,
            reader_count: 1,
            rating_distribution: distribution,
        };
        assert_eq!(stats.percentage(5), 66);
        assert_eq!(stats.percentage(1), 0);
    }
}
