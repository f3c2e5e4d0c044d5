use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use shelf_http::error::AppError;
use shelf_kernel::Module;
use shelf_storage::{authorize_upload, DynUploadSigner, UploadAuthorization};

/// Hands out pre-signed cover upload URLs.
pub struct UploadsModule {
    signer: DynUploadSigner,
}

impl UploadsModule {
    pub fn new(signer: DynUploadSigner) -> Self {
        Self { signer }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadUrlQuery {
    pub filename: String,
}

#[async_trait]
impl Module for UploadsModule {
    fn name(&self) -> &'static str {
        "uploads"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/s3/upload-url", get(upload_url))
            .with_state(Arc::clone(&self.signer))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/s3/upload-url": {
                    "get": {
                        "summary": "Issue a one-hour pre-signed PUT URL for a cover image",
                        "tags": ["Uploads"],
                        "parameters": [{
                            "name": "filename",
                            "in": "query",
                            "required": true,
                            "description": "Object key to authorize",
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "Upload authorization",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/UploadAuthorization" }
                                    }
                                }
                            },
                            "422": {
                                "description": "Missing filename",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "500": {
                                "description": "Signing failed",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "UploadAuthorization": {
                        "type": "object",
                        "properties": {
                            "upload_url": { "type": "string", "format": "uri" },
                            "file_url": { "type": "string", "format": "uri" }
                        },
                        "required": ["upload_url", "file_url"]
                    }
                }
            }
        }))
    }
}

async fn upload_url(
    State(signer): State<DynUploadSigner>,
    query: Result<Query<UploadUrlQuery>, QueryRejection>,
) -> Result<Json<UploadAuthorization>, AppError> {
    let Query(query) = query?;
    let authorization = authorize_upload(signer.as_ref(), &query.filename).await?;
    tracing::info!(filename = %query.filename, "upload authorization issued");
    Ok(Json(authorization))
}

/// Create a new instance of the uploads module
pub fn create_module(signer: DynUploadSigner) -> Arc<dyn Module> {
    Arc::new(UploadsModule::new(signer))
}
