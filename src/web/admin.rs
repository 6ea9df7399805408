//! Admin HTML surface: catalog management, users and review moderation

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use maud::{html, Markup};
use serde::Deserialize;
use std::collections::HashMap;

use crate::{
    error::{validation_field_map, AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::BookInput,
        user::SessionClaims,
    },
    web::{error_banner, layout, with_error},
    AppState,
};

use super::public::ErrorQuery;

/// Admin dashboard with section links and headline counts
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AppResult<Markup> {
    let (_, book_count) = state.services.catalog.list_books(Some(1), Some(1)).await?;
    let users = state.services.users.list_users().await?;
    let reviews = state.services.reviews.all().await?;

    Ok(layout(
        "Administracja",
        Some(&claims),
        html! {
            h1 { "Panel administratora" }
            ul .admin-menu {
                li { a href="/admin/books" { "Książki (" (book_count) ")" } }
                li { a href="/admin/authors" { "Autorzy" } }
                li { a href="/admin/users" { "Użytkownicy (" (users.len()) ")" } }
                li { a href="/admin/reviews" { "Recenzje (" (reviews.len()) ")" } }
                li { a href="/admin/books/export" { "Eksport katalogu (CSV)" } }
            }
        },
    ))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub error: Option<String>,
}

/// Book management list
pub async fn book_list(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(query): Query<PageQuery>,
) -> AppResult<Markup> {
    let (books, total) = state
        .services
        .catalog
        .list_books(query.page, Some(50))
        .await?;
    let page = query.page.unwrap_or(1).max(1);

    Ok(layout(
        "Książki",
        Some(&claims),
        html! {
            (error_banner(query.error.as_deref()))
            h1 { "Książki (" (total) ")" }
            p { a href="/admin/books/new" { "Dodaj książkę" } }
            table {
                tr { th { "ID" } th { "Tytuł" } th { "Autor" } th { "ISBN" } th { "Ocena" } th {} }
                @for book in &books {
                    tr {
                        td { (book.id) }
                        td { (book.title) }
                        td { (book.author_name) }
                        td { (book.isbn) }
                        td { (format!("{:.1}", book.average_rating)) }
                        td {
                            a href=(format!("/admin/books/{}/edit", book.id)) { "Edytuj" }
                            " "
                            a href=(format!("/admin/books/{}/delete", book.id)) { "Usuń" }
                        }
                    }
                }
            }
            div .pager {
                @if page > 1 {
                    a href=(format!("/admin/books?page={}", page - 1)) { "Poprzednia" }
                }
                @if page * 50 < total {
                    a href=(format!("/admin/books?page={}", page + 1)) { "Następna" }
                }
            }
        },
    ))
}

#[derive(Deserialize)]
pub struct BookForm {
    pub title: String,
    pub isbn: String,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub author_id: i64,
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<BookForm> for BookInput {
    fn from(form: BookForm) -> Self {
        BookInput {
            title: form.title,
            isbn: form.isbn,
            cover_image: none_if_blank(form.cover_image),
            description: none_if_blank(form.description),
            author_id: form.author_id,
        }
    }
}

fn book_form_page(
    claims: &SessionClaims,
    action: &str,
    values: Option<&BookInput>,
    authors: &[Author],
    errors: &HashMap<String, String>,
    banner: Option<&str>,
) -> Markup {
    let field = |name: &str| errors.get(name).map(String::as_str);
    layout(
        "Edycja książki",
        Some(claims),
        html! {
            h1 { "Dane książki" }
            (error_banner(banner))
            form method="post" action=(action) {
                label { "Tytuł"
                    input type="text" name="title"
                        value=(values.map(|v| v.title.as_str()).unwrap_or(""));
                }
                @if let Some(msg) = field("title") { p .field-error { (msg) } }
                label { "ISBN"
                    input type="text" name="isbn"
                        value=(values.map(|v| v.isbn.as_str()).unwrap_or(""));
                }
                @if let Some(msg) = field("isbn") { p .field-error { (msg) } }
                label { "Okładka (URL)"
                    input type="text" name="cover_image"
                        value=(values.and_then(|v| v.cover_image.as_deref()).unwrap_or(""));
                }
                label { "Opis"
                    textarea name="description" rows="5" {
                        (values.and_then(|v| v.description.as_deref()).unwrap_or(""))
                    }
                }
                @if let Some(msg) = field("description") { p .field-error { (msg) } }
                label { "Autor"
                    select name="author_id" {
                        @for author in authors {
                            option value=(author.id)
                                selected[values.map(|v| v.author_id == author.id).unwrap_or(false)] {
                                (author.full_name())
                            }
                        }
                    }
                }
                button type="submit" { "Zapisz" }
            }
        },
    )
}

pub async fn book_new(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AppResult<Markup> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(book_form_page(
        &claims,
        "/admin/books/new",
        None,
        &authors,
        &HashMap::new(),
        None,
    ))
}

pub async fn book_create(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Form(form): Form<BookForm>,
) -> Response {
    let input = BookInput::from(form);
    match state.services.catalog.create_book(&input).await {
        Ok(book) => Redirect::to(&format!("/books/{}", book.id)).into_response(),
        Err(error) => book_form_error(&state, &claims, "/admin/books/new", input, error).await,
    }
}

pub async fn book_edit(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<i64>,
) -> AppResult<Markup> {
    let book = state.services.catalog.get_book(id).await?;
    let authors = state.services.catalog.list_authors().await?;

    let values = BookInput {
        title: book.title,
        isbn: book.isbn,
        cover_image: book.cover_image,
        description: book.description,
        author_id: book.author_id,
    };
    Ok(book_form_page(
        &claims,
        &format!("/admin/books/{}/edit", id),
        Some(&values),
        &authors,
        &HashMap::new(),
        None,
    ))
}

pub async fn book_update(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<i64>,
    Form(form): Form<BookForm>,
) -> Response {
    let input = BookInput::from(form);
    let action = format!("/admin/books/{}/edit", id);
    match state.services.catalog.update_book(id, &input).await {
        Ok(book) => Redirect::to(&format!("/books/{}", book.id)).into_response(),
        Err(error) => book_form_error(&state, &claims, &action, input, error).await,
    }
}

async fn book_form_error(
    state: &AppState,
    claims: &SessionClaims,
    action: &str,
    input: BookInput,
    error: AppError,
) -> Response {
    let authors = match state.services.catalog.list_authors().await {
        Ok(authors) => authors,
        Err(e) => return e.into_response(),
    };
    match error {
        AppError::Validation(errors) => book_form_page(
            claims,
            action,
            Some(&input),
            &authors,
            &validation_field_map(&errors),
            None,
        )
        .into_response(),
        AppError::Business(message) => book_form_page(
            claims,
            action,
            Some(&input),
            &authors,
            &HashMap::new(),
            Some(&message),
        )
        .into_response(),
        other => other.into_response(),
    }
}

/// Delete link target. A plain GET, matching the links in the table.
pub async fn book_delete(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.services.catalog.delete_book(id).await {
        Ok(()) => Redirect::to("/admin/books").into_response(),
        Err(other) => other.into_response(),
    }
}

/// Catalog CSV download
pub async fn book_export(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let csv = state.services.catalog.export_books_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"books.csv\"".to_string(),
            ),
        ],
        csv,
    ))
}

/// Author management list
pub async fn author_list(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(query): Query<ErrorQuery>,
) -> AppResult<Markup> {
    let authors = state.services.catalog.list_authors().await?;

    Ok(layout(
        "Autorzy",
        Some(&claims),
        html! {
            (error_banner(query.error.as_deref()))
            h1 { "Autorzy (" (authors.len()) ")" }
            p { a href="/admin/authors/new" { "Dodaj autora" } }
            table {
                tr { th { "ID" } th { "Imię i nazwisko" } th {} }
                @for author in &authors {
                    tr {
                        td { (author.id) }
                        td { (author.full_name()) }
                        td {
                            a href=(format!("/admin/authors/{}/edit", author.id)) { "Edytuj" }
                            " "
                            a href=(format!("/admin/authors/{}/delete", author.id)) { "Usuń" }
                        }
                    }
                }
            }
        },
    ))
}

#[derive(Deserialize)]
pub struct AuthorForm {
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
}

fn author_form_page(
    claims: &SessionClaims,
    action: &str,
    values: Option<&AuthorForm>,
    errors: &HashMap<String, String>,
) -> Markup {
    let field = |name: &str| errors.get(name).map(String::as_str);
    layout(
        "Edycja autora",
        Some(claims),
        html! {
            h1 { "Dane autora" }
            form method="post" action=(action) {
                label { "Imię"
                    input type="text" name="first_name"
                        value=(values.map(|v| v.first_name.as_str()).unwrap_or(""));
                }
                @if let Some(msg) = field("first_name") { p .field-error { (msg) } }
                label { "Nazwisko"
                    input type="text" name="last_name"
                        value=(values.map(|v| v.last_name.as_str()).unwrap_or(""));
                }
                @if let Some(msg) = field("last_name") { p .field-error { (msg) } }
                label { "Biografia"
                    textarea name="bio" rows="4" {
                        (values.and_then(|v| v.bio.as_deref()).unwrap_or(""))
                    }
                }
                button type="submit" { "Zapisz" }
            }
        },
    )
}

pub async fn author_new(Extension(claims): Extension<SessionClaims>) -> Markup {
    author_form_page(&claims, "/admin/authors/new", None, &HashMap::new())
}

pub async fn author_create(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Form(form): Form<AuthorForm>,
) -> Response {
    let input = CreateAuthor {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        bio: none_if_blank(form.bio.clone()),
    };
    match state.services.catalog.create_author(&input).await {
        Ok(_) => Redirect::to("/admin/authors").into_response(),
        Err(AppError::Validation(errors)) => author_form_page(
            &claims,
            "/admin/authors/new",
            Some(&form),
            &validation_field_map(&errors),
        )
        .into_response(),
        Err(other) => other.into_response(),
    }
}

pub async fn author_edit(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<i64>,
) -> AppResult<Markup> {
    let author = state.services.catalog.get_author(id).await?;
    let values = AuthorForm {
        first_name: author.first_name,
        last_name: author.last_name,
        bio: author.bio,
    };
    Ok(author_form_page(
        &claims,
        &format!("/admin/authors/{}/edit", id),
        Some(&values),
        &HashMap::new(),
    ))
}

pub async fn author_update(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<i64>,
    Form(form): Form<AuthorForm>,
) -> Response {
    let action = format!("/admin/authors/{}/edit", id);
    let input = UpdateAuthor {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        bio: none_if_blank(form.bio.clone()),
    };
    match state.services.catalog.update_author(id, &input).await {
        Ok(_) => Redirect::to("/admin/authors").into_response(),
        Err(AppError::Validation(errors)) => {
            author_form_page(&claims, &action, Some(&form), &validation_field_map(&errors))
                .into_response()
        }
        Err(other) => other.into_response(),
    }
}

/// Delete link target. Refusal (author still has books) bounces back with
/// the conflict message.
pub async fn author_delete(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.services.catalog.delete_author(id).await {
        Ok(()) => Redirect::to("/admin/authors").into_response(),
        Err(AppError::Conflict(message)) => {
            Redirect::to(&with_error("/admin/authors", &message)).into_response()
        }
        Err(other) => other.into_response(),
    }
}

/// User management list
pub async fn user_list(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AppResult<Markup> {
    let users = state.services.users.list_users().await?;

    Ok(layout(
        "Użytkownicy",
        Some(&claims),
        html! {
            h1 { "Użytkownicy (" (users.len()) ")" }
            table {
                tr { th { "ID" } th { "Nazwa" } th { "E-mail" } th { "Rola" } th { "Status" } th {} }
                @for user in &users {
                    tr {
                        td { (user.id) }
                        td { (user.username) }
                        td { (user.email) }
                        td { (user.role) }
                        td { @if user.enabled { "aktywny" } @else { "zablokowany" } }
                        td {
                            a href=(format!("/admin/users/{}/toggle-block", user.id)) {
                                @if user.enabled { "Zablokuj" } @else { "Odblokuj" }
                            }
                            " "
                            a href=(format!("/admin/users/{}/delete", user.id)) { "Usuń" }
                        }
                    }
                }
            }
        },
    ))
}

pub async fn user_toggle_block(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.services.users.toggle_block(id).await {
        Ok(_) => Redirect::to("/admin/users").into_response(),
        Err(other) => other.into_response(),
    }
}

pub async fn user_delete(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.services.users.delete_by_admin(id).await {
        Ok(()) => Redirect::to("/admin/users").into_response(),
        Err(other) => other.into_response(),
    }
}

/// Review moderation list
pub async fn review_list(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AppResult<Markup> {
    let reviews = state.services.reviews.all().await?;

    Ok(layout(
        "Recenzje",
        Some(&claims),
        html! {
            h1 { "Recenzje (" (reviews.len()) ")" }
            table {
                tr { th { "ID" } th { "Książka" } th { "Autor" } th { "Ocena" } th { "Treść" } th {} }
                @for review in &reviews {
                    tr {
                        td { (review.id) }
                        td { a href=(format!("/books/{}", review.book_id)) { (review.book_title) } }
                        td { (review.username.as_deref().unwrap_or("konto usunięte")) }
                        td { (review.rating) "/10" }
                        td { (review.content) }
                        td {
                            a href=(format!("/admin/reviews/{}/delete", review.id)) { "Usuń" }
                        }
                    }
                }
            }
        },
    ))
}

pub async fn review_delete(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.services.reviews.delete_review(id).await {
        Ok(()) => Redirect::to("/admin/reviews").into_response(),
        Err(other) => other.into_response(),
    }
}
