//! Shelf endpoints, all scoped to the authenticated caller

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::shelf::{AddBookRequest, CreateShelfRequest, MoveBookRequest, Shelf, ShelfWithBooks},
    AppState,
};

use super::AuthenticatedUser;

/// The caller's shelves with their books
#[utoipa::path(
    get,
    path = "/shelves",
    tag = "shelves",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's shelves", body = [ShelfWithBooks]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_shelves(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ShelfWithBooks>>> {
    let shelves = state
        .services
        .shelves
        .shelves_with_books(claims.user_id)
        .await?;
    Ok(Json(shelves))
}

/// Create a custom shelf
#[utoipa::path(
    post,
    path = "/shelves",
    tag = "shelves",
    security(("bearer_auth" = [])),
    request_body = CreateShelfRequest,
    responses(
        (status = 201, description = "Shelf created", body = Shelf),
        (status = 400, description = "Validation error or duplicate name")
    )
)]
pub async fn create_shelf(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateShelfRequest>,
) -> AppResult<(StatusCode, Json<Shelf>)> {
    let shelf = state
        .services
        .shelves
        .create_shelf(claims.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(shelf)))
}

/// Put a book on a shelf. Re-adding is a no-op.
#[utoipa::path(
    post,
    path = "/shelves/{id}/books",
    tag = "shelves",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Shelf ID")),
    request_body = AddBookRequest,
    responses(
        (status = 204, description = "Book on shelf"),
        (status = 400, description = "Foreign shelf or unknown book"),
        (status = 404, description = "Shelf not found")
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<AddBookRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .shelves
        .add_book(claims.user_id, id, request.book_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Take a book off a shelf. Removing an absent book is a no-op.
#[utoipa::path(
    delete,
    path = "/shelves/{id}/books/{book_id}",
    tag = "shelves",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Shelf ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book removed"),
        (status = 404, description = "Shelf not found")
    )
)]
pub async fn remove_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, book_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .services
        .shelves
        .remove_book(claims.user_id, id, book_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a book from this shelf to another of the caller's shelves.
/// Behaves like remove-then-add, so a book absent from the source still
/// ends up on the target.
#[utoipa::path(
    post,
    path = "/shelves/{id}/move",
    tag = "shelves",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Source shelf ID")),
    request_body = MoveBookRequest,
    responses(
        (status = 204, description = "Book moved"),
        (status = 400, description = "Foreign shelf"),
        (status = 404, description = "Shelf not found")
    )
)]
pub async fn move_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<MoveBookRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .shelves
        .move_book(claims.user_id, id, request.book_id, request.target_shelf_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
