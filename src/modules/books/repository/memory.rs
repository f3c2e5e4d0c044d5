use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CatalogRepository, RepositoryError};
use crate::modules::books::models::{Book, BookDetails, BookId, NewBook};

#[derive(Default)]
struct Tables {
    books: Vec<Book>,
    reviews: Vec<(BookId, String)>,
    last_id: BookId,
}

impl Tables {
    /// Books are kept in id order, so the first hit is the lowest id.
    fn first_titled(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.title == title)
    }
}

/// Process-local catalog with the same semantics as the Postgres store.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_books(&self, min_rating: f64) -> Result<Vec<Book>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .iter()
            .filter(|book| book.rating >= min_rating)
            .cloned()
            .collect())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<BookDetails>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.first_titled(title).map(|book| BookDetails {
            book: book.clone(),
            reviews: tables
                .reviews
                .iter()
                .filter(|(book_id, _)| *book_id == book.id)
                .map(|(_, content)| content.clone())
                .collect(),
        }))
    }

    async fn add_book(&self, book: NewBook) -> Result<Book, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.last_id += 1;
        let book = book.into_book(tables.last_id);
        tables.books.push(book.clone());
        Ok(book)
    }

    async fn add_review(&self, title: &str, content: &str) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let book_id = tables
            .first_titled(title)
            .map(|book| book.id)
            .ok_or_else(|| RepositoryError::NotFound {
                title: title.to_string(),
            })?;
        tables.reviews.push((book_id, content.to_string()));
        Ok(())
    }
}
