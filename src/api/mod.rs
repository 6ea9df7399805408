//! API handlers for Bookhive REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod health;
pub mod openapi;
pub mod reviews;
pub mod shelves;
pub mod users;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::SessionClaims, security, AppState};

/// Extractor for the authenticated caller. The guard middleware stores
/// resolved claims in request extensions; handlers mounted outside the
/// guard fall back to resolving the headers directly.
pub struct AuthenticatedUser(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<SessionClaims>() {
            return Ok(AuthenticatedUser(claims.clone()));
        }

        security::resolve_identity(&parts.headers, state)
            .await
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Authentication("Authentication required".to_string()))
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}
