//! Business logic services

pub mod catalog;
pub mod reviews;
pub mod shelves;
pub mod storage;
pub mod users;

use crate::{
    config::{SecurityConfig, UploadsConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub reviews: reviews::ReviewsService,
    pub shelves: shelves::ShelvesService,
    pub users: users::UsersService,
    pub storage: storage::FileStorage,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, security: SecurityConfig, uploads: UploadsConfig) -> Self {
        let storage = storage::FileStorage::new(uploads.dir);
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            reviews: reviews::ReviewsService::new(repository.clone()),
            shelves: shelves::ShelvesService::new(repository.clone()),
            users: users::UsersService::new(repository, security, storage.clone()),
            storage,
        }
    }
}
