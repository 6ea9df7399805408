//! Review service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::review::{CreateReviewRequest, Review, ReviewDetail},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn for_book(&self, book_id: i64) -> AppResult<Vec<ReviewDetail>> {
        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }
        self.repository.reviews.for_book(book_id).await
    }

    pub async fn all(&self) -> AppResult<Vec<ReviewDetail>> {
        self.repository.reviews.all().await
    }

    pub async fn add_review(
        &self,
        book_id: i64,
        user_id: i64,
        request: &CreateReviewRequest,
    ) -> AppResult<Review> {
        let content = validated_content(request)?;

        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::Business(format!(
                "Book with id {} does not exist",
                book_id
            )));
        }
        // The account must still exist at write time
        self.repository.users.get_by_id(user_id).await.map_err(|_| {
            AppError::Business(format!("User with id {} does not exist", user_id))
        })?;

        self.repository
            .reviews
            .create(book_id, user_id, request.rating, Some(&content))
            .await
    }

    pub async fn delete_review(&self, id: i64) -> AppResult<()> {
        self.repository.reviews.delete(id).await?;
        tracing::info!(review_id = id, "review deleted");
        Ok(())
    }
}

/// Rating and content limits apply to what actually gets stored, so the
/// content is trimmed before validation.
fn validated_content(request: &CreateReviewRequest) -> AppResult<String> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(AppError::Business("Review content cannot be blank".to_string()));
    }
    let normalized = CreateReviewRequest {
        rating: request.rating,
        content: content.to_string(),
    };
    normalized.validate()?;
    Ok(normalized.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_limits_apply_after_trimming() {
        let request = CreateReviewRequest {
            rating: 8,
            content: "  ab ".to_string(),
        };
        assert!(matches!(
            validated_content(&request),
            Err(AppError::Validation(_))
        ));

        let request = CreateReviewRequest {
            rating: 8,
            content: "   ".to_string(),
        };
        assert!(matches!(
            validated_content(&request),
            Err(AppError::Business(_))
        ));

        let request = CreateReviewRequest {
            rating: 8,
            content: "  worth reading twice  ".to_string(),
        };
        assert_eq!(validated_content(&request).unwrap(), "worth reading twice");
    }
}
