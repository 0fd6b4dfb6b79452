pub mod form;
pub mod listing;
pub mod models;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch},
    Router,
};
use bookshare_kernel::{InitCtx, Module};
use serde_json::json;

use crate::state::AppState;

/// Room for the text parts and multipart framing around a cover upload.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Book listings: public search plus owner-managed create, update and delete.
pub struct BooksModule {
    state: AppState,
}

impl BooksModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let listed = self.state.store().read(|c| c.books.len()).await?;
        tracing::info!(
            module = self.name(),
            listed,
            strict_ownership = ctx.settings.policy.strict_ownership,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let body_limit = self
            .state
            .uploads()
            .max_bytes
            .saturating_add(FORM_OVERHEAD_BYTES);

        Router::new()
            .route("/", get(routes::list_books).post(routes::create_book))
            .route("/me", get(routes::my_books))
            .route("/recent-books", get(routes::recent_books))
            .route(
                "/{id}",
                get(routes::get_book)
                    .put(routes::update_book)
                    .delete(routes::delete_book),
            )
            .route("/{id}/status", patch(routes::toggle_status))
            .layer(DefaultBodyLimit::max(body_limit))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
            })
        };
        let envelope = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookEnvelope" } } }
            })
        };
        let page = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookPage" } } }
            })
        };
        let id_param = json!({ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } });
        let query_params = json!([
            { "name": "title", "in": "query", "schema": { "type": "string" }, "description": "Matches title or author" },
            { "name": "city", "in": "query", "schema": { "type": "string" } },
            { "name": "genre", "in": "query", "schema": { "type": "string" } },
            { "name": "status", "in": "query", "schema": { "type": "string" } },
            { "name": "page", "in": "query", "schema": { "type": "integer", "default": 0 } },
            { "name": "limit", "in": "query", "schema": { "type": "integer", "default": 8 } }
        ]);
        let form_body = json!({
            "content": {
                "multipart/form-data": { "schema": { "$ref": "#/components/schemas/BookForm" } },
                "application/json": { "schema": { "$ref": "#/components/schemas/BookForm" } }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Search listings",
                        "tags": ["Books"],
                        "parameters": query_params.clone(),
                        "responses": { "200": page("One page of listings") }
                    },
                    "post": {
                        "summary": "Create a listing",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": form_body.clone(),
                        "responses": {
                            "201": envelope("Listing created"),
                            "400": error("Validation failed"),
                            "401": error("Authentication required"),
                            "403": error("Caller is not an owner"),
                            "500": error("Error uploading file")
                        }
                    }
                },
                "/me": {
                    "get": {
                        "summary": "Search the caller's listings",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": query_params,
                        "responses": {
                            "200": page("One page of the caller's listings"),
                            "401": error("Authentication required")
                        }
                    }
                },
                "/recent-books": {
                    "get": {
                        "summary": "Four most recent listings",
                        "tags": ["Books"],
                        "responses": { "200": { "description": "Newest listings first" } }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a listing with its owner's contact details",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": envelope("Listing"),
                            "400": error("Invalid book ID"),
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a listing you own",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [id_param.clone()],
                        "requestBody": form_body,
                        "responses": {
                            "200": envelope("Listing updated"),
                            "403": error("Not your listing"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a listing you own",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": { "description": "Listing deleted" },
                            "403": error("Not your listing"),
                            "404": error("Book not found")
                        }
                    }
                },
                "/{id}/status": {
                    "patch": {
                        "summary": "Change a listing's status",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [id_param],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "status": { "$ref": "#/components/schemas/BookStatus" } },
                                "required": ["status"]
                            } } }
                        },
                        "responses": {
                            "200": envelope("Status changed"),
                            "400": error("Invalid status"),
                            "404": error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookStatus": { "type": "string", "enum": ["available", "rented", "exchanged"] },
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "genre": { "type": "string" },
                            "city": { "type": "string" },
                            "contact": { "type": "string" },
                            "description": { "type": "string" },
                            "ownerId": { "type": "integer" },
                            "status": { "$ref": "#/components/schemas/BookStatus" },
                            "coverImage": { "type": "string", "format": "uri" },
                            "createdAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "author", "city", "contact", "ownerId", "status", "createdAt"]
                    },
                    "BookForm": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "genre": { "type": "string" },
                            "city": { "type": "string" },
                            "contact": { "type": "string" },
                            "description": { "type": "string" },
                            "status": { "$ref": "#/components/schemas/BookStatus" },
                            "coverImage": { "type": "string", "format": "binary" }
                        }
                    },
                    "BookEnvelope": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "book": { "$ref": "#/components/schemas/Book" },
                            "message": { "type": "string" }
                        },
                        "required": ["success", "book"]
                    },
                    "BookPage": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "books": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } },
                            "cities": { "type": "array", "items": { "type": "string" } },
                            "genres": { "type": "array", "items": { "type": "string" } },
                            "total": { "type": "integer" },
                            "page": { "type": "integer" },
                            "limit": { "type": "integer" },
                            "hasMore": { "type": "boolean" }
                        },
                        "required": ["success", "books", "cities", "genres", "total", "page", "limit", "hasMore"]
                    }
                }
            }
        }))
    }
}

/// Create a new instance of the books module
pub fn create_module(state: &AppState) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(state.clone()))
}
