//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod reviews;
pub mod shelves;
pub mod statistics;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub reviews: reviews::ReviewsRepository,
    pub shelves: shelves::ShelvesRepository,
    pub users: users::UsersRepository,
    pub statistics: statistics::StatisticsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            reviews: reviews::ReviewsRepository::new(pool.clone()),
            shelves: shelves::ShelvesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            statistics: statistics::StatisticsRepository::new(pool.clone()),
            pool,
        }
    }
}
