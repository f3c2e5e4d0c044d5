use std::sync::Arc;

use async_trait::async_trait;
use shelf_http::error::AppError;

use super::models::{Book, BookDetails, NewBook};

mod memory;
mod postgres;

pub use memory::InMemoryCatalogRepository;
pub use postgres::PostgresCatalogRepository;

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("Book not found")]
    NotFound { title: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { title } => {
                tracing::debug!(%title, "no book with this title");
                AppError::not_found("Book not found")
            }
            RepositoryError::Database(e) => AppError::internal(e),
        }
    }
}

/// Catalog storage for books and their reviews.
///
/// Titles are not unique; every lookup by title resolves to the matching book
/// with the lowest id.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Every book rated at least `min_rating`, ordered by id
    async fn list_books(&self, min_rating: f64) -> Result<Vec<Book>, RepositoryError>;

    /// Exact-title lookup including review contents
    async fn find_by_title(&self, title: &str) -> Result<Option<BookDetails>, RepositoryError>;

    /// Insert a book, returning it with its assigned id
    async fn add_book(&self, book: NewBook) -> Result<Book, RepositoryError>;

    /// Attach a review to the book titled `title`. Fails with
    /// [`RepositoryError::NotFound`] without inserting anything when no book
    /// has that title.
    async fn add_review(&self, title: &str, content: &str) -> Result<(), RepositoryError>;
}

pub type DynCatalogRepository = Arc<dyn CatalogRepository>;
