pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_kernel::{InitCtx, Migration, Module};

use repository::DynCatalogRepository;

/// Books and their reviews.
pub struct BooksModule {
    repo: DynCatalogRepository,
}

impl BooksModule {
    pub fn new(repo: DynCatalogRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.repo))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let title_param = json!({
            "name": "title",
            "in": "path",
            "required": true,
            "description": "Exact book title",
            "schema": { "type": "string" }
        });

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books rated at least `min_rating`",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "min_rating",
                            "in": "query",
                            "required": false,
                            "schema": { "type": "number", "default": 0 }
                        }],
                        "responses": {
                            "200": {
                                "description": "Matching books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "422": error("Malformed query"),
                            "500": error("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/NewBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Book added",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/AddBookResponse" }
                                    }
                                }
                            },
                            "422": error("Malformed body"),
                            "500": error("Internal server error")
                        }
                    }
                },
                "/books/{title}": {
                    "get": {
                        "summary": "Get a book and its reviews by exact title",
                        "tags": ["Books"],
                        "parameters": [title_param.clone()],
                        "responses": {
                            "200": {
                                "description": "Book with reviews",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookDetails" }
                                    }
                                }
                            },
                            "404": error("Book not found")
                        }
                    }
                },
                "/books/{title}/review": {
                    "post": {
                        "summary": "Add a review to a book",
                        "tags": ["Books"],
                        "parameters": [title_param],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ReviewRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Review added",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/MessageResponse" }
                                    }
                                }
                            },
                            "404": error("Book not found"),
                            "422": error("Malformed body"),
                            "500": error("Internal server error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "description": { "type": "string" },
                            "rating": { "type": "number" },
                            "cover_url": { "type": "string" }
                        },
                        "required": ["id", "title", "author", "description", "rating", "cover_url"]
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "description": { "type": "string" },
                            "rating": { "type": "number" },
                            "cover_url": { "type": "string" }
                        },
                        "required": ["title", "author", "description", "rating", "cover_url"]
                    },
                    "BookDetails": {
                        "allOf": [
                            { "$ref": "#/components/schemas/Book" },
                            {
                                "type": "object",
                                "properties": {
                                    "reviews": { "type": "array", "items": { "type": "string" } }
                                },
                                "required": ["reviews"]
                            }
                        ]
                    },
                    "AddBookResponse": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "book": { "$ref": "#/components/schemas/NewBook" }
                        },
                        "required": ["message", "book"]
                    },
                    "ReviewRequest": {
                        "type": "object",
                        "properties": { "review": { "type": "string" } },
                        "required": ["review"]
                    },
                    "MessageResponse": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id          BIGSERIAL PRIMARY KEY,
                    title       TEXT NOT NULL,
                    author      TEXT NOT NULL,
                    description TEXT NOT NULL,
                    rating      DOUBLE PRECISION NOT NULL,
                    cover_url   TEXT NOT NULL DEFAULT ''
                );
                CREATE INDEX IF NOT EXISTS books_title_idx ON books (title);

                CREATE TABLE IF NOT EXISTS reviews (
                    id      BIGSERIAL PRIMARY KEY,
                    book_id BIGINT NOT NULL REFERENCES books (id),
                    content TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS reviews_book_id_idx ON reviews (book_id);
                "#,
        }]
    }
}

/// Create a new instance of the books module
pub fn create_module(repo: DynCatalogRepository) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(repo))
}
