//! Profile pages for the logged-in user

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use maud::{html, Markup};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{shelf::CreateShelfRequest, user::SessionClaims},
    web::{error_banner, layout, notice_banner, with_error, with_notice},
    AppState,
};

use super::public::ErrorQuery;

/// Profile page: account card, yearly counter, shelves and own reviews
pub async fn profile_page(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(query): Query<ErrorQuery>,
) -> AppResult<Markup> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    let shelves = state
        .services
        .shelves
        .shelves_with_books(claims.user_id)
        .await?;
    let read_count = state.services.shelves.books_read_count(claims.user_id).await?;
    let reviewed_this_year = state
        .services
        .users
        .books_read_this_year(claims.user_id)
        .await?;

    Ok(layout(
        "Profil",
        Some(&claims),
        html! {
            (error_banner(query.error.as_deref()))
            (notice_banner(query.notice.as_deref()))
            section .profile-card {
                @if let Some(avatar) = &user.avatar {
                    img .avatar src=(avatar) alt="awatar";
                }
                h1 { (user.username) }
                p { (user.email) }
                @if let Some(bio) = &user.bio {
                    p .bio { (bio) }
                }
                p .stats {
                    "Przeczytane książki: " (read_count)
                    " | Recenzje w tym roku: " (reviewed_this_year)
                }
            }

            section {
                h2 { "Edytuj profil" }
                form method="post" action="/profile/update" enctype="multipart/form-data" {
                    label { "O mnie"
                        textarea name="bio" rows="3" { (user.bio.as_deref().unwrap_or("")) }
                    }
                    label { "Awatar"
                        input type="file" name="avatar" accept="image/*";
                    }
                    button type="submit" { "Zapisz" }
                }
            }

            section {
                h2 { "Kopia zapasowa" }
                p {
                    a href="/profile/export" { "Pobierz kopię profilu" }
                }
                form method="post" action="/profile/import" enctype="multipart/form-data" {
                    input type="file" name="file" accept="application/json";
                    button type="submit" { "Importuj" }
                }
            }

            section {
                h2 { "Półki" }
                form .inline method="post" action="/profile/shelves/create" {
                    input type="text" name="name" placeholder="Nazwa nowej półki";
                    button type="submit" { "Utwórz półkę" }
                }
                @for shelf in &shelves {
                    div .shelf {
                        h3 {
                            (shelf.name)
                            @if shelf.is_system_shelf { span .badge { "systemowa" } }
                        }
                        @if shelf.books.is_empty() {
                            p .empty { "Pusta półka" }
                        }
                        ul {
                            @for book in &shelf.books {
                                li {
                                    a href=(format!("/books/{}", book.id)) { (book.title) }
                                    form .inline method="post"
                                        action=(format!("/profile/shelves/{}/remove", shelf.id)) {
                                        input type="hidden" name="book_id" value=(book.id);
                                        button type="submit" { "Usuń" }
                                    }
                                    form .inline method="post"
                                        action=(format!("/profile/shelves/{}/move", shelf.id)) {
                                        input type="hidden" name="book_id" value=(book.id);
                                        select name="target_shelf_id" {
                                            @for target in shelves.iter().filter(|s| s.id != shelf.id) {
                                                option value=(target.id) { (target.name) }
                                            }
                                        }
                                        button type="submit" { "Przenieś" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    ))
}

/// Multipart profile update: `bio` text plus optional `avatar` file
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    mut multipart: Multipart,
) -> Response {
    let mut bio: Option<String> = None;
    let mut avatar: Option<(String, Vec<u8>)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().map(str::to_string);
                match name.as_deref() {
                    Some("bio") => match field.text().await {
                        Ok(text) => bio = Some(text),
                        Err(_) => {
                            return Redirect::to(&with_error("/profile", "Nieprawidłowy formularz"))
                                .into_response()
                        }
                    },
                    Some("avatar") => {
                        let filename = field.file_name().unwrap_or("avatar").to_string();
                        match field.bytes().await {
                            Ok(data) => avatar = Some((filename, data.to_vec())),
                            Err(_) => {
                                return Redirect::to(&with_error("/profile", "Nieprawidłowy plik"))
                                    .into_response()
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(None) => break,
            Err(_) => {
                return Redirect::to(&with_error("/profile", "Nieprawidłowy formularz"))
                    .into_response()
            }
        }
    }

    let result = state
        .services
        .users
        .update_profile(
            claims.user_id,
            bio.as_deref(),
            avatar.as_ref().map(|(name, data)| (name.as_str(), data.as_slice())),
        )
        .await;

    match result {
        Ok(_) => Redirect::to("/profile").into_response(),
        Err(AppError::Business(message)) => {
            Redirect::to(&with_error("/profile", &message)).into_response()
        }
        Err(other) => other.into_response(),
    }
}

/// Download the profile backup as an attachment
pub async fn export_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AppResult<impl IntoResponse> {
    let data = state.services.users.export_profile(claims.user_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"backup_{}.json\"", claims.sub),
            ),
        ],
        data,
    ))
}

/// Import a backup uploaded through the profile page
pub async fn import_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    mut multipart: Multipart,
) -> Response {
    let mut data: Option<Vec<u8>> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => match field.bytes().await {
                Ok(bytes) => data = Some(bytes.to_vec()),
                Err(_) => {
                    return Redirect::to(&with_error("/profile", "Nieprawidłowy plik"))
                        .into_response()
                }
            },
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(_) => {
                return Redirect::to(&with_error("/profile", "Nieprawidłowy formularz"))
                    .into_response()
            }
        }
    }

    let Some(data) = data else {
        return Redirect::to(&with_error("/profile", "Brak pliku kopii")).into_response();
    };

    match state.services.users.import_profile(claims.user_id, &data).await {
        Ok(report) => {
            let summary = format!(
                "Import zakończony: półki {}, dodane {}, pominięte {}",
                report.shelves_processed, report.books_added, report.books_skipped
            );
            Redirect::to(&with_notice("/profile", &summary)).into_response()
        }
        Err(AppError::Business(message)) => {
            Redirect::to(&with_error("/profile", &message)).into_response()
        }
        Err(other) => other.into_response(),
    }
}

#[derive(Deserialize)]
pub struct CreateShelfForm {
    pub name: String,
}

pub async fn create_shelf(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Form(form): Form<CreateShelfForm>,
) -> Response {
    let request = CreateShelfRequest { name: form.name };
    match state.services.shelves.create_shelf(claims.user_id, &request).await {
        Ok(_) => Redirect::to("/profile").into_response(),
        Err(AppError::Validation(errors)) => {
            let message = crate::error::validation_field_map(&errors)
                .into_values()
                .next()
                .unwrap_or_else(|| "Nieprawidłowa nazwa półki".to_string());
            Redirect::to(&with_error("/profile", &message)).into_response()
        }
        Err(AppError::Business(message)) => {
            Redirect::to(&with_error("/profile", &message)).into_response()
        }
        Err(other) => other.into_response(),
    }
}

#[derive(Deserialize)]
pub struct RemoveBookForm {
    pub book_id: i64,
}

pub async fn remove_book(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(shelf_id): Path<i64>,
    Form(form): Form<RemoveBookForm>,
) -> Response {
    match state
        .services
        .shelves
        .remove_book(claims.user_id, shelf_id, form.book_id)
        .await
    {
        Ok(()) => Redirect::to("/profile").into_response(),
        Err(AppError::Business(message)) => {
            Redirect::to(&with_error("/profile", &message)).into_response()
        }
        Err(other) => other.into_response(),
    }
}

#[derive(Deserialize)]
pub struct MoveBookForm {
    pub book_id: i64,
    pub target_shelf_id: i64,
}

pub async fn move_book(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(shelf_id): Path<i64>,
    Form(form): Form<MoveBookForm>,
) -> Response {
    match state
        .services
        .shelves
        .move_book(claims.user_id, shelf_id, form.book_id, form.target_shelf_id)
        .await
    {
        Ok(()) => Redirect::to("/profile").into_response(),
        Err(AppError::Business(message)) => {
            Redirect::to(&with_error("/profile", &message)).into_response()
        }
        Err(other) => other.into_response(),
    }
}
