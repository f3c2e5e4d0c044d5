//! Typed HTTP client for the catalog service.

use reqwest::{header::CONTENT_TYPE, Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use shelf_app::modules::books::models::{
    AddBookResponse, Book, BookDetails, MessageResponse, NewBook, ReviewRequest,
};
use shelf_http::error::ErrorEnvelope;
use shelf_storage::UploadAuthorization;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("{message}")]
    Api { status: StatusCode, message: String },
}

pub struct CatalogClient {
    http: Client,
    base: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.into()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.into()));
        }

        let http = Client::builder()
            .user_agent(concat!("shelf-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base })
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `min_rating` is passed through as typed; the service validates it.
    pub async fn list_books(&self, min_rating: &str) -> Result<Vec<Book>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["books"])?)
            .query(&[("min_rating", min_rating)])
            .send()
            .await?;
        decode(response).await
    }

    /// `Ok(None)` when the service reports the title as unknown
    pub async fn find_book(&self, title: &str) -> Result<Option<BookDetails>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["books", title])?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    pub async fn add_book(&self, book: &NewBook) -> Result<AddBookResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["books"])?)
            .json(book)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn add_review(
        &self,
        title: &str,
        review: &str,
    ) -> Result<MessageResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["books", title, "review"])?)
            .json(&ReviewRequest {
                review: review.to_string(),
            })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn upload_url(&self, filename: &str) -> Result<UploadAuthorization, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["s3", "upload-url"])?)
            .query(&[("filename", filename)])
            .send()
            .await?;
        decode(response).await
    }

    /// `PUT` the file straight to the object store using a signed URL.
    pub async fn upload_cover(
        &self,
        authorization: &UploadAuthorization,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .put(&authorization.upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Api { status, message })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    tracing::debug!(url = %response.url(), %status, "catalog response");

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await?;
    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.is_empty() => status.to_string(),
        Err(_) => body,
    };
    Err(ClientError::Api { status, message })
}
