//! Bookhive Book Community Server
//!
//! A Rust implementation of a book-community backend: catalog browsing,
//! reviews, personal shelves and profile backup, exposed as a REST JSON
//! API plus a server-rendered HTML surface over the same services.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod security;
pub mod services;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
