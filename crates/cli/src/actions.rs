//! The client's user actions. Every action reports back through a
//! [`Feedback`] line instead of failing; network errors are never retried.

use std::{fmt, io::ErrorKind, path::Path};

use shelf_app::modules::books::models::NewBook;
use shelf_storage::DEFAULT_CONTENT_TYPE;

use crate::{client::CatalogClient, render};

/// Inline result message of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub ok: bool,
    pub text: String,
}

impl Feedback {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            ok: true,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            ok: false,
            text: text.into(),
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.ok { "✅" } else { "❌" };
        write!(f, "{mark} {}", self.text)
    }
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub description: String,
    pub rating: String,
    /// Local cover image to upload; empty for none
    pub cover_file: String,
}

/// Content type for a local file, `image/jpeg` when the extension is unknown.
pub fn guess_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

pub async fn add_book(client: &CatalogClient, form: &BookForm) -> Feedback {
    let Ok(rating) = form.rating.trim().parse::<f64>() else {
        return Feedback::failure("Invalid rating");
    };

    let filename = form.cover_file.trim();
    let cover_url = if filename.is_empty() {
        String::new()
    } else {
        match upload_cover(client, filename).await {
            Ok(url) => url,
            Err(feedback) => return feedback,
        }
    };

    let book = NewBook {
        title: form.title.trim().to_string(),
        author: form.author.trim().to_string(),
        description: form.description.trim().to_string(),
        rating,
        cover_url,
    };

    match client.add_book(&book).await {
        Ok(response) => Feedback::success(format!("Book added: {}", response.book.title)),
        Err(err) => Feedback::failure(err.to_string()),
    }
}

/// Authorize, read, and `PUT` the cover; yields its public URL.
async fn upload_cover(client: &CatalogClient, filename: &str) -> Result<String, Feedback> {
    let authorization = client.upload_url(filename).await.map_err(|err| {
        tracing::warn!(error = %err, filename, "upload authorization failed");
        Feedback::failure("Failed to get upload URL")
    })?;

    let bytes = tokio::fs::read(Path::new(filename))
        .await
        .map_err(|err| match err.kind() {
            ErrorKind::NotFound => Feedback::failure("Cover file not found."),
            _ => Feedback::failure(format!("Cannot read cover file: {err}")),
        })?;

    client
        .upload_cover(&authorization, bytes, &guess_content_type(filename))
        .await
        .map_err(|err| Feedback::failure(format!("Cover upload failed: {err}")))?;

    Ok(authorization.file_url)
}

pub async fn search(client: &CatalogClient, title: &str) -> Feedback {
    let title = title.trim();
    match client.find_book(title).await {
        Ok(Some(details)) => Feedback::success(render::book_details(&details)),
        Ok(None) => Feedback::failure(format!("Book '{title}' not found")),
        Err(err) => Feedback::failure(format!("Search failed: {err}")),
    }
}

pub async fn review(client: &CatalogClient, title: &str, review: &str) -> Feedback {
    let (title, review) = (title.trim(), review.trim());
    if title.is_empty() || review.is_empty() {
        return Feedback::failure("Please provide both title and review");
    }

    match client.add_review(title, review).await {
        Ok(_) => Feedback::success("Review added"),
        Err(err) => {
            tracing::warn!(error = %err, title, "review rejected");
            Feedback::failure("Failed to add review")
        }
    }
}

/// Render the catalog. An empty filter means every book.
pub async fn refresh(client: &CatalogClient, min_rating: &str) -> Feedback {
    let min_rating = match min_rating.trim() {
        "" => "0",
        value => value,
    };

    match client.list_books(min_rating).await {
        Ok(books) => Feedback::success(render::book_table(&books)),
        Err(err) => Feedback::failure(format!("Failed to load books: {err}")),
    }
}
