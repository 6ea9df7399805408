//! User account endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        backup::ImportReport,
        user::{RegisterRequest, User},
    },
    AppState,
};

use super::AuthenticatedUser;

/// Register a new account with its three default shelves
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Validation error or taken username/email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.users.register(&request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update the caller's bio and avatar (multipart form with `bio` text
/// and optional `avatar` file)
#[utoipa::path(
    patch,
    path = "/users/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated account", body = User),
        (status = 400, description = "Bio too long"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<User>> {
    let mut bio: Option<String> = None;
    let mut avatar: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Business(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("bio") => {
                bio = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Business(format!("Invalid bio field: {}", e)))?,
                );
            }
            Some("avatar") => {
                let filename = field.file_name().unwrap_or("avatar").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Business(format!("Invalid avatar field: {}", e)))?;
                avatar = Some((filename, data.to_vec()));
            }
            _ => {}
        }
    }

    let user = state
        .services
        .users
        .update_profile(
            claims.user_id,
            bio.as_deref(),
            avatar.as_ref().map(|(name, data)| (name.as_str(), data.as_slice())),
        )
        .await?;
    Ok(Json(user))
}

/// Download the caller's profile backup as a JSON attachment
#[utoipa::path(
    get,
    path = "/users/profile/export",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Backup document"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn export_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
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

/// Restore shelves from a backup document (multipart `file` field)
#[utoipa::path(
    post,
    path = "/users/profile/import",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 400, description = "Malformed backup file"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn import_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<ImportReport>> {
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Business(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Business(format!("Invalid file field: {}", e)))?;
            data = Some(bytes.to_vec());
        }
    }

    let data = data.ok_or_else(|| AppError::Business("Missing backup file".to_string()))?;
    let report = state
        .services
        .users
        .import_profile(claims.user_id, &data)
        .await?;
    Ok(Json(report))
}

#[derive(Serialize, ToSchema)]
pub struct ToggleBlockResponse {
    pub id: i64,
    pub enabled: bool,
}

/// Flip a user's enabled flag (admin)
#[utoipa::path(
    patch,
    path = "/users/{id}/toggle-block",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "New enabled state", body = ToggleBlockResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn toggle_block(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ToggleBlockResponse>> {
    let enabled = state.services.users.toggle_block(id).await?;
    Ok(Json(ToggleBlockResponse { id, enabled }))
}

/// Delete a user, anonymizing their reviews first (admin)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.services.users.delete_by_admin(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all accounts (admin)
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(users))
}
