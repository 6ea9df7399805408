//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookInput, BookQuery, BookStats, BookSummary, SearchQuery},
    AppState,
};

use super::PaginatedResponse;

/// List books with pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Books per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Paginated book list", body = PaginatedResponse<BookSummary>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookSummary>>> {
    let (items, total) = state
        .services
        .catalog
        .list_books(query.page, query.per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Search books by title, author last name or ISBN
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(
        ("query" = String, Query, description = "Search term"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Books per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Matching books", body = PaginatedResponse<BookSummary>)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<PaginatedResponse<BookSummary>>> {
    let (items, total) = state
        .services
        .catalog
        .search_books(&query.query, query.page, query.per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookSummary),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookSummary>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Rating statistics for one book
#[utoipa::path(
    get,
    path = "/books/{id}/stats",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Rating statistics", body = BookStats),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookStats>> {
    let stats = state.services.catalog.book_stats(id).await?;
    Ok(Json(stats))
}

/// Create a new book (admin)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(input): Json<BookInput>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.create_book(&input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book's fields (admin)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<BookInput>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update_book(id, &input).await?;
    Ok(Json(book))
}

/// Delete a book with its reviews and shelf links (admin)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
