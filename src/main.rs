//! Bookhive Server - Book Community Platform
//!
//! REST API and server-rendered pages for a book community: catalog,
//! reviews, personal shelves and profile backups.

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookhive_server::{
    api,
    config::AppConfig,
    repository::Repository,
    security,
    services::Services,
    web, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("bookhive_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bookhive Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.security.clone(),
        config.uploads.clone(),
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/register", post(api::users::register))
        .route("/auth/me", get(api::auth::me))
        // Books
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/search", get(api::books::search_books))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/books/:id/stats", get(api::books::book_stats))
        .route("/books/:id/reviews", get(api::reviews::book_reviews))
        .route("/books/:id/reviews", post(api::reviews::add_review))
        // Authors
        .route("/authors", get(api::authors::list_authors))
        .route("/authors", post(api::authors::create_author))
        .route("/authors/:id", get(api::authors::get_author))
        .route("/authors/:id", put(api::authors::update_author))
        .route("/authors/:id", delete(api::authors::delete_author))
        // Shelves
        .route("/shelves", get(api::shelves::list_shelves))
        .route("/shelves", post(api::shelves::create_shelf))
        .route("/shelves/:id/books", post(api::shelves::add_book))
        .route("/shelves/:id/books/:book_id", delete(api::shelves::remove_book))
        .route("/shelves/:id/move", post(api::shelves::move_book))
        // Users
        .route("/users/register", post(api::users::register))
        .route("/users/profile", patch(api::users::update_profile))
        .route("/users/profile/export", get(api::users::export_profile))
        .route("/users/profile/import", post(api::users::import_profile))
        .route("/users/:id/toggle-block", patch(api::users::toggle_block))
        .route("/users/:id", delete(api::users::delete_user))
        // Admin
        .route("/admin/users", get(api::users::list_users))
        .route("/admin/reviews", get(api::reviews::list_all_reviews))
        .route("/admin/reviews/:id", delete(api::reviews::delete_review));

    // HTML pages
    let pages = Router::new()
        .route("/", get(web::public::home))
        .route("/register", get(web::public::register_page))
        .route("/register", post(web::public::register_submit))
        .route("/login", get(web::public::login_page))
        .route("/login", post(web::public::login_submit))
        .route("/logout", get(web::public::logout))
        .route("/books", get(web::public::book_list))
        .route("/books/:id", get(web::public::book_detail))
        .route("/books/:id/review", post(web::public::add_review))
        .route("/books/:id/add-to-shelf", post(web::public::add_to_shelf))
        .route("/profile", get(web::profile::profile_page))
        .route("/profile/update", post(web::profile::update_profile))
        .route("/profile/export", get(web::profile::export_profile))
        .route("/profile/import", post(web::profile::import_profile))
        .route("/profile/shelves/create", post(web::profile::create_shelf))
        .route("/profile/shelves/:id/remove", post(web::profile::remove_book))
        .route("/profile/shelves/:id/move", post(web::profile::move_book))
        // Admin pages
        .route("/admin", get(web::admin::dashboard))
        .route("/admin/books", get(web::admin::book_list))
        .route("/admin/books/new", get(web::admin::book_new))
        .route("/admin/books/new", post(web::admin::book_create))
        .route("/admin/books/export", get(web::admin::book_export))
        .route("/admin/books/:id/edit", get(web::admin::book_edit))
        .route("/admin/books/:id/edit", post(web::admin::book_update))
        .route("/admin/books/:id/delete", get(web::admin::book_delete))
        .route("/admin/authors", get(web::admin::author_list))
        .route("/admin/authors/new", get(web::admin::author_new))
        .route("/admin/authors/new", post(web::admin::author_create))
        .route("/admin/authors/:id/edit", get(web::admin::author_edit))
        .route("/admin/authors/:id/edit", post(web::admin::author_update))
        .route("/admin/authors/:id/delete", get(web::admin::author_delete))
        .route("/admin/users", get(web::admin::user_list))
        .route("/admin/users/:id/toggle-block", get(web::admin::user_toggle_block))
        .route("/admin/users/:id/delete", get(web::admin::user_delete))
        .route("/admin/reviews", get(web::admin::review_list))
        .route("/admin/reviews/:id/delete", get(web::admin::review_delete));

    // OpenAPI documentation
    let openapi = api::openapi::swagger_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(pages)
        .merge(openapi)
        .nest_service("/static", ServeDir::new("static"))
        .nest_service(
            "/uploads",
            ServeDir::new(&state.config.uploads.dir),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security::authorize,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
