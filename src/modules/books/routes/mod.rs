use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use shelf_http::error::AppError;

use super::{
    models::{
        AddBookResponse, Book, BookDetails, ListBooksQuery, MessageResponse, NewBook,
        ReviewRequest,
    },
    repository::DynCatalogRepository,
};

/// HTTP routes of the books module.
pub fn router(repo: DynCatalogRepository) -> Router {
    Router::new()
        .route("/books", get(list_books).post(add_book))
        .route("/books/{title}", get(get_book))
        .route("/books/{title}/review", post(add_review))
        .with_state(repo)
}

async fn list_books(
    State(repo): State<DynCatalogRepository>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(query) = query?;
    let books = repo.list_books(query.min_rating).await?;
    tracing::debug!(min_rating = query.min_rating, count = books.len(), "listed books");
    Ok(Json(books))
}

async fn get_book(
    State(repo): State<DynCatalogRepository>,
    Path(title): Path<String>,
) -> Result<Json<BookDetails>, AppError> {
    repo.find_by_title(&title)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Book not found"))
}

async fn add_book(
    State(repo): State<DynCatalogRepository>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<Json<AddBookResponse>, AppError> {
    let Json(book) = payload?;

    let created = repo.add_book(book.clone()).await.inspect_err(|err| {
        tracing::error!(title = %book.title, error = %err, "failed to insert book");
    })?;
    tracing::info!(book_id = created.id, title = %created.title, "book added");

    Ok(Json(AddBookResponse {
        message: "Book added successfully".to_string(),
        book,
    }))
}

async fn add_review(
    State(repo): State<DynCatalogRepository>,
    Path(title): Path<String>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload?;

    repo.add_review(&title, &request.review).await?;
    tracing::info!(%title, "review added");

    Ok(Json(MessageResponse {
        message: "Review added".to_string(),
    }))
}
