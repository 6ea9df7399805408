//! OpenAPI documentation

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health, reviews, shelves, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookhive API",
        version = "1.0.0",
        description = "Book community REST API: catalog, reviews, shelves and profiles",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::search_books,
        books::get_book,
        books::book_stats,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Reviews
        reviews::book_reviews,
        reviews::add_review,
        reviews::list_all_reviews,
        reviews::delete_review,
        // Shelves
        shelves::list_shelves,
        shelves::create_shelf,
        shelves::add_book,
        shelves::remove_book,
        shelves::move_book,
        // Users
        users::register,
        users::update_profile,
        users::export_profile,
        users::import_profile,
        users::toggle_block,
        users::delete_user,
        users::list_users,
    ),
    components(
        schemas(
            health::HealthResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            users::ToggleBlockResponse,
            crate::error::ErrorResponse,
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookInput,
            crate::models::book::BookStats,
            crate::models::book::RatingStat,
            crate::models::review::Review,
            crate::models::review::ReviewDetail,
            crate::models::review::CreateReviewRequest,
            crate::models::shelf::Shelf,
            crate::models::shelf::ShelfBook,
            crate::models::shelf::ShelfWithBooks,
            crate::models::shelf::CreateShelfRequest,
            crate::models::shelf::AddBookRequest,
            crate::models::shelf::MoveBookRequest,
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterRequest,
            crate::models::backup::ProfileBackup,
            crate::models::backup::ShelfBackup,
            crate::models::backup::ReviewBackup,
            crate::models::backup::ImportReport,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication"),
        (name = "books", description = "Book catalog"),
        (name = "authors", description = "Authors"),
        (name = "reviews", description = "Reviews"),
        (name = "shelves", description = "Personal shelves"),
        (name = "users", description = "Accounts and profiles")
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated document
pub fn swagger_router() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
