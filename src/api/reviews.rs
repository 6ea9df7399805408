//! Review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::review::{CreateReviewRequest, Review, ReviewDetail},
    AppState,
};

use super::AuthenticatedUser;

/// Reviews for one book, newest first
#[utoipa::path(
    get,
    path = "/books/{id}/reviews",
    tag = "reviews",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Reviews for the book", body = [ReviewDetail]),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_reviews(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<ReviewDetail>>> {
    let reviews = state.services.reviews.for_book(id).await?;
    Ok(Json(reviews))
}

/// Add a review to a book as the authenticated caller
#[utoipa::path(
    post,
    path = "/books/{id}/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Validation or business error"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn add_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state
        .services
        .reviews
        .add_review(id, claims.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// All reviews, newest first (admin moderation)
#[utoipa::path(
    get,
    path = "/admin/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All reviews", body = [ReviewDetail]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_all_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<ReviewDetail>>> {
    let reviews = state.services.reviews.all().await?;
    Ok(Json(reviews))
}

/// Delete a review (admin moderation)
#[utoipa::path(
    delete,
    path = "/admin/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.reviews.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
