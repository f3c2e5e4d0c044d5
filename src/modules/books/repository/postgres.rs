use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::{CatalogRepository, RepositoryError};
use crate::modules::books::models::{Book, BookDetails, BookId, NewBook};

#[derive(FromRow)]
struct BookRow {
    id: BookId,
    title: String,
    author: String,
    description: String,
    rating: f64,
    cover_url: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            rating: row.rating,
            cover_url: row.cover_url,
        }
    }
}

pub struct PostgresCatalogRepository {
    db: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_books(&self, min_rating: f64) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, author, description, rating, cover_url
            FROM books
            WHERE rating >= $1
            ORDER BY id
            "#,
        )
        .bind(min_rating)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<BookDetails>, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, author, description, rating, cover_url
            FROM books
            WHERE title = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(title)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviews: Vec<String> =
            sqlx::query_scalar("SELECT content FROM reviews WHERE book_id = $1 ORDER BY id")
                .bind(row.id)
                .fetch_all(&self.db)
                .await?;

        Ok(Some(BookDetails {
            book: row.into(),
            reviews,
        }))
    }

    async fn add_book(&self, book: NewBook) -> Result<Book, RepositoryError> {
        // dropping an uncommitted transaction rolls it back
        let mut tx = self.db.begin().await?;

        let id: BookId = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, description, rating, cover_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.rating)
        .bind(&book.cover_url)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(book.into_book(id))
    }

    async fn add_review(&self, title: &str, content: &str) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await?;

        // Resolve and insert in one statement; the foreign key on book_id
        // guards against the book vanishing in between.
        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO reviews (book_id, content)
            SELECT id, $2
            FROM books
            WHERE title = $1
            ORDER BY id
            LIMIT 1
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(content)
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_none() {
            return Err(RepositoryError::NotFound {
                title: title.to_string(),
            });
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shelf_kernel::ModuleRegistry;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
    use uuid::Uuid;

    use super::*;
    use crate::modules::books::{create_module, repository::InMemoryCatalogRepository};

    /// Repository over a fresh schema with the books migrations applied.
    /// `None` when `DATABASE_URL` is unset.
    async fn scratch_repo() -> Option<(PostgresCatalogRepository, PgPool, String)> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let schema = format!("shelf_test_{}", Uuid::now_v7().simple());

        let admin = PgPool::connect(&url).await.unwrap();
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .unwrap();
        admin.close().await;

        let options = url
            .parse::<PgConnectOptions>()
            .unwrap()
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .unwrap();

        let mut registry = ModuleRegistry::new();
        registry.register_custom(create_module(Arc::new(InMemoryCatalogRepository::new())));
        shelf_db::run_migrations(&pool, &registry.collect_migrations())
            .await
            .unwrap();

        Some((PostgresCatalogRepository::new(pool.clone()), pool, schema))
    }

    async fn drop_schema(pool: PgPool, schema: &str) {
        sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    fn new_book(title: &str, rating: f64) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Herbert".to_string(),
            description: "Desert planet".to_string(),
            rating,
            cover_url: String::new(),
        }
    }

    async fn review_count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT count(*) FROM reviews")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn list_filters_by_rating_in_id_order() {
        let Some((repo, pool, schema)) = scratch_repo().await else {
            return;
        };

        for (title, rating) in [("Low", 1.5), ("High", 4.8), ("Mid", 3.0)] {
            repo.add_book(new_book(title, rating)).await.unwrap();
        }

        let titles: Vec<String> = repo
            .list_books(3.0)
            .await
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect();
        assert_eq!(titles, vec!["High", "Mid"]);
        assert_eq!(repo.list_books(0.0).await.unwrap().len(), 3);

        drop_schema(pool, &schema).await;
    }

    #[tokio::test]
    async fn added_book_is_found_without_reviews() {
        let Some((repo, pool, schema)) = scratch_repo().await else {
            return;
        };

        let created = repo.add_book(new_book("Dune", 4.5)).await.unwrap();
        let details = repo.find_by_title("Dune").await.unwrap().unwrap();

        assert_eq!(details.book, created);
        assert!(details.reviews.is_empty());
        assert!(repo.find_by_title("dune").await.unwrap().is_none());

        drop_schema(pool, &schema).await;
    }

    #[tokio::test]
    async fn review_for_missing_title_inserts_nothing() {
        let Some((repo, pool, schema)) = scratch_repo().await else {
            return;
        };

        let result = repo.add_review("Ghost", "boo").await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        assert_eq!(review_count(&pool).await, 0);

        repo.add_book(new_book("Ghost", 2.0)).await.unwrap();
        repo.add_review("Ghost", "boo").await.unwrap();
        assert_eq!(review_count(&pool).await, 1);

        drop_schema(pool, &schema).await;
    }

    #[tokio::test]
    async fn duplicate_titles_resolve_to_lowest_id() {
        let Some((repo, pool, schema)) = scratch_repo().await else {
            return;
        };

        let first = repo.add_book(new_book("Dune", 4.5)).await.unwrap();
        let second = repo.add_book(new_book("Dune", 2.0)).await.unwrap();
        assert!(first.id < second.id);

        repo.add_review("Dune", "The spice must flow").await.unwrap();

        let details = repo.find_by_title("Dune").await.unwrap().unwrap();
        assert_eq!(details.book.id, first.id);
        assert_eq!(details.reviews, vec!["The spice must flow"]);

        let on_second: i64 = sqlx::query_scalar("SELECT count(*) FROM reviews WHERE book_id = $1")
            .bind(second.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(on_second, 0);

        drop_schema(pool, &schema).await;
    }
}
