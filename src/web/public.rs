//! Public pages: home, auth forms, catalog browsing and book details

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use maud::{html, Markup};
use serde::Deserialize;

use crate::{
    api::auth::{clear_session_cookie, session_cookie},
    error::{validation_field_map, AppError, AppResult},
    models::{
        book::BookSummary,
        review::CreateReviewRequest,
        user::{RegisterRequest, SessionClaims},
    },
    web::{error_banner, layout, rating_badge, with_error},
    AppState,
};

#[derive(Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub query: Option<String>,
    pub page: Option<i64>,
}

fn book_card(book: &BookSummary) -> Markup {
    html! {
        div .book-card {
            a href=(format!("/books/{}", book.id)) {
                @if let Some(cover) = &book.cover_image {
                    img src=(cover) alt=(book.title);
                }
                h3 { (book.title) }
            }
            p .author { (book.author_name) }
            (rating_badge(book.average_rating))
        }
    }
}

/// Home page with the six most reviewed books
pub async fn home(
    State(state): State<AppState>,
    identity: Option<Extension<SessionClaims>>,
) -> AppResult<Markup> {
    let popular = state.services.catalog.most_popular(6).await?;

    Ok(layout(
        "Strona główna",
        identity.as_deref(),
        html! {
            h1 { "Popularne książki" }
            div .book-grid {
                @for book in &popular {
                    (book_card(book))
                }
            }
        },
    ))
}

fn register_form(
    values: Option<&RegisterRequest>,
    errors: &std::collections::HashMap<String, String>,
    banner: Option<&str>,
) -> Markup {
    let field = |name: &str| errors.get(name).map(String::as_str);
    layout(
        "Rejestracja",
        None,
        html! {
            h1 { "Załóż konto" }
            (error_banner(banner))
            form method="post" action="/register" {
                label { "Nazwa użytkownika"
                    input type="text" name="username"
                        value=(values.map(|v| v.username.as_str()).unwrap_or(""));
                }
                @if let Some(msg) = field("username") { p .field-error { (msg) } }
                label { "E-mail"
                    input type="email" name="email"
                        value=(values.map(|v| v.email.as_str()).unwrap_or(""));
                }
                @if let Some(msg) = field("email") { p .field-error { (msg) } }
                label { "Hasło"
                    input type="password" name="password";
                }
                @if let Some(msg) = field("password") { p .field-error { (msg) } }
                button type="submit" { "Zarejestruj" }
            }
        },
    )
}

pub async fn register_page() -> Markup {
    register_form(None, &Default::default(), None)
}

/// Handle the registration form. Validation failures re-render the form
/// with per-field messages; success lands on the login page.
pub async fn register_submit(
    State(state): State<AppState>,
    Form(request): Form<RegisterRequest>,
) -> Response {
    match state.services.users.register(&request).await {
        Ok(_) => Redirect::to("/login?registered=1").into_response(),
        Err(AppError::Validation(errors)) => {
            register_form(Some(&request), &validation_field_map(&errors), None).into_response()
        }
        Err(AppError::Business(message)) => {
            register_form(Some(&request), &Default::default(), Some(&message)).into_response()
        }
        Err(other) => other.into_response(),
    }
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub registered: Option<String>,
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Markup {
    layout(
        "Logowanie",
        None,
        html! {
            h1 { "Zaloguj się" }
            @if query.registered.is_some() {
                div .info-banner { "Konto utworzone, możesz się zalogować." }
            }
            (error_banner(query.error.as_deref()))
            form method="post" action="/login" {
                label { "Nazwa użytkownika"
                    input type="text" name="username";
                }
                label { "Hasło"
                    input type="password" name="password";
                }
                button type="submit" { "Zaloguj" }
            }
        },
    )
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Handle the login form: set the session cookie and go home, or bounce
/// back to the form with the failure message.
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state
        .services
        .users
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok((token, _)) => {
            let cookie = session_cookie(&token, state.config.security.session_ttl_hours);
            ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
        }
        Err(AppError::Authentication(message)) => {
            Redirect::to(&with_error("/login", &message)).into_response()
        }
        Err(other) => other.into_response(),
    }
}

pub async fn logout() -> impl IntoResponse {
    ([(header::SET_COOKIE, clear_session_cookie())], Redirect::to("/"))
}

/// Catalog listing with optional search
pub async fn book_list(
    State(state): State<AppState>,
    identity: Option<Extension<SessionClaims>>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Markup> {
    let term = query.query.as_deref().unwrap_or("");
    let (books, total) = state
        .services
        .catalog
        .search_books(term, query.page, None)
        .await?;
    let page = query.page.unwrap_or(1).max(1);
    let has_next = page * crate::services::catalog::DEFAULT_PAGE_SIZE < total;

    Ok(layout(
        "Książki",
        identity.as_deref(),
        html! {
            h1 { "Katalog" }
            form .search method="get" action="/books" {
                input type="text" name="query" value=(term) placeholder="Tytuł, autor lub ISBN";
                button type="submit" { "Szukaj" }
            }
            div .book-grid {
                @for book in &books {
                    (book_card(book))
                }
            }
            @if books.is_empty() {
                p { "Brak wyników." }
            }
            div .pager {
                @if page > 1 {
                    a href=(format!("/books?query={}&page={}", super::encode_query(term), page - 1)) { "Poprzednia" }
                }
                @if has_next {
                    a href=(format!("/books?query={}&page={}", super::encode_query(term), page + 1)) { "Następna" }
                }
            }
        },
    ))
}

/// Book detail: summary, rating histogram, reviews and the shelf picker
pub async fn book_detail(
    State(state): State<AppState>,
    identity: Option<Extension<SessionClaims>>,
    Path(id): Path<i64>,
    Query(query): Query<ErrorQuery>,
) -> AppResult<Markup> {
    let book = state.services.catalog.get_book(id).await?;
    let stats = state.services.catalog.book_stats(id).await?;
    let reviews = state.services.reviews.for_book(id).await?;

    let shelves = match &identity {
        Some(Extension(claims)) => state
            .services
            .shelves
            .shelves_with_books(claims.user_id)
            .await?,
        None => Vec::new(),
    };

    Ok(layout(
        &book.title,
        identity.as_deref(),
        html! {
            (error_banner(query.error.as_deref()))
            div .book-detail {
                @if let Some(cover) = &book.cover_image {
                    img src=(cover) alt=(book.title);
                }
                div {
                    h1 { (book.title) }
                    p .author { (book.author_name) }
                    p .isbn { "ISBN: " (book.isbn) }
                    (rating_badge(book.average_rating))
                    p .readers { (stats.reader_count) " czytelników ma tę książkę na półce" }
                    @if let Some(description) = &book.description {
                        p .description { (description) }
                    }
                }
            }

            h2 { "Rozkład ocen" }
            table .histogram {
                @for rating in (1..=10).rev() {
                    tr {
                        td { (rating) }
                        td {
                            div .bar style=(format!("width: {}%", stats.percentage(rating))) {}
                        }
                        td { (stats.rating_distribution.get(&rating).copied().unwrap_or(0)) }
                    }
                }
            }

            @if !shelves.is_empty() {
                form .shelf-picker method="post" action=(format!("/books/{}/add-to-shelf", id)) {
                    select name="shelf_id" {
                        @for shelf in &shelves {
                            option value=(shelf.id) { (shelf.name) }
                        }
                    }
                    button type="submit" { "Dodaj na półkę" }
                }
            }

            h2 { "Recenzje (" (stats.rating_count) ")" }
            @if identity.is_some() {
                form .review-form method="post" action=(format!("/books/{}/review", id)) {
                    label { "Ocena"
                        select name="rating" {
                            @for rating in (1..=10).rev() {
                                option value=(rating) { (rating) }
                            }
                        }
                    }
                    label { "Recenzja"
                        textarea name="content" rows="4" {}
                    }
                    button type="submit" { "Dodaj recenzję" }
                }
            } @else {
                p { a href="/login" { "Zaloguj się" } " aby dodać recenzję." }
            }
            @for review in &reviews {
                article .review {
                    header {
                        strong { (review.username.as_deref().unwrap_or("konto usunięte")) }
                        span .rating { (review.rating) "/10" }
                        time { (review.created_at.format("%Y-%m-%d")) }
                    }
                    p { (review.content) }
                }
            }
        },
    ))
}

#[derive(Deserialize)]
pub struct ReviewForm {
    pub rating: i32,
    pub content: String,
}

/// Review form target; bounces back to the book page either way
pub async fn add_review(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<i64>,
    Form(form): Form<ReviewForm>,
) -> Response {
    let request = CreateReviewRequest {
        rating: form.rating,
        content: form.content,
    };
    let back = format!("/books/{}", id);
    match state
        .services
        .reviews
        .add_review(id, claims.user_id, &request)
        .await
    {
        Ok(_) => Redirect::to(&back).into_response(),
        Err(AppError::Validation(errors)) => {
            let message = validation_field_map(&errors)
                .into_values()
                .next()
                .unwrap_or_else(|| "Nieprawidłowa recenzja".to_string());
            Redirect::to(&with_error(&back, &message)).into_response()
        }
        Err(AppError::Business(message)) => Redirect::to(&with_error(&back, &message)).into_response(),
        Err(other) => other.into_response(),
    }
}

#[derive(Deserialize)]
pub struct AddToShelfForm {
    pub shelf_id: i64,
}

/// Shelf picker target on the book page
pub async fn add_to_shelf(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<i64>,
    Form(form): Form<AddToShelfForm>,
) -> Response {
    let back = format!("/books/{}", id);
    match state
        .services
        .shelves
        .add_book(claims.user_id, form.shelf_id, id)
        .await
    {
        Ok(()) => Redirect::to(&back).into_response(),
        Err(AppError::Business(message)) => Redirect::to(&with_error(&back, &message)).into_response(),
        Err(other) => other.into_response(),
    }
}
