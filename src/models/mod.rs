//! Domain models and request/response types

pub mod author;
pub mod backup;
pub mod book;
pub mod review;
pub mod shelf;
pub mod user;
