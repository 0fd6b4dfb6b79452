pub mod models;
mod requests;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, put},
    Router,
};
use bookshare_kernel::{InitCtx, Module};
use serde_json::json;

use crate::state::AppState;

/// Profile, dashboard and the request board.
pub struct UsersModule {
    state: AppState,
}

impl UsersModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let (users, requests) = self
            .state
            .store()
            .read(|c| (c.users.len(), c.requests.len()))
            .await?;
        tracing::info!(module = self.name(), users, requests, "users module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/profile", get(routes::get_profile).put(routes::update_profile))
            .route("/dashboard", get(routes::dashboard))
            .route(
                "/requests",
                get(requests::my_requests).post(requests::create_request),
            )
            .route("/requests/owner", get(requests::all_requests))
            .route("/requests/owner/me", get(requests::answered_by_me))
            .route("/requests/owner/{id}", put(requests::respond_to_request))
            .route(
                "/requests/{id}",
                get(requests::get_request).delete(requests::delete_request),
            )
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
            })
        };
        let ok = |description: &str, schema: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": format!("#/components/schemas/{schema}") } } }
            })
        };
        let secured = json!([{ "bearerAuth": [] }]);
        let id_param = json!([{ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }]);

        Some(json!({
            "paths": {
                "/profile": {
                    "get": {
                        "summary": "Caller's profile",
                        "tags": ["Users"],
                        "security": secured.clone(),
                        "responses": {
                            "200": ok("Profile", "ProfileResponse"),
                            "401": error("Authentication required")
                        }
                    },
                    "put": {
                        "summary": "Update name or mobile",
                        "tags": ["Users"],
                        "security": secured.clone(),
                        "requestBody": {
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "name": { "type": "string" }, "mobile": { "type": "string" } }
                            } } }
                        },
                        "responses": {
                            "200": ok("Profile updated", "ProfileResponse"),
                            "401": error("Authentication required")
                        }
                    }
                },
                "/dashboard": {
                    "get": {
                        "summary": "Counts and the first few of the caller's listings",
                        "tags": ["Users"],
                        "security": secured.clone(),
                        "responses": {
                            "200": ok("Dashboard", "DashboardResponse"),
                            "401": error("Authentication required")
                        }
                    }
                },
                "/requests": {
                    "get": {
                        "summary": "Requests filed by the caller",
                        "tags": ["Requests"],
                        "security": secured.clone(),
                        "responses": { "200": ok("Requests", "RequestList") }
                    },
                    "post": {
                        "summary": "File a request",
                        "tags": ["Requests"],
                        "security": secured.clone(),
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "title": { "type": "string" }, "description": { "type": "string" } },
                                "required": ["title"]
                            } } }
                        },
                        "responses": {
                            "201": { "description": "Request filed" },
                            "400": error("Validation failed")
                        }
                    }
                },
                "/requests/owner": {
                    "get": {
                        "summary": "All requests",
                        "tags": ["Requests"],
                        "security": secured.clone(),
                        "responses": {
                            "200": ok("Requests", "RequestList"),
                            "403": error("Caller is not an owner")
                        }
                    }
                },
                "/requests/owner/me": {
                    "get": {
                        "summary": "Requests the caller has answered",
                        "tags": ["Requests"],
                        "security": secured.clone(),
                        "responses": {
                            "200": ok("Requests", "RequestList"),
                            "403": error("Caller is not an owner")
                        }
                    }
                },
                "/requests/owner/{id}": {
                    "put": {
                        "summary": "Answer a request",
                        "tags": ["Requests"],
                        "security": secured.clone(),
                        "parameters": id_param.clone(),
                        "requestBody": {
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "response": { "type": "string" } }
                            } } }
                        },
                        "responses": {
                            "200": { "description": "Request answered" },
                            "403": error("Caller is not an owner"),
                            "404": error("Request not found")
                        }
                    }
                },
                "/requests/{id}": {
                    "get": {
                        "summary": "Get a request with requester and owner",
                        "tags": ["Requests"],
                        "security": secured.clone(),
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": { "description": "Request with `canRespond`" },
                            "400": error("Invalid request ID"),
                            "404": error("Request not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a request you filed",
                        "tags": ["Requests"],
                        "security": secured,
                        "parameters": id_param,
                        "responses": {
                            "200": { "description": "Request deleted" },
                            "403": error("Not your request"),
                            "404": error("Request not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookRequest": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "userId": { "type": "integer" },
                            "respond": { "type": "boolean" },
                            "response": { "type": "string" },
                            "ownerId": { "type": "integer" },
                            "createdAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "userId", "respond", "response", "createdAt"]
                    },
                    "RequestList": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "requests": { "type": "array", "items": { "$ref": "#/components/schemas/BookRequest" } },
                            "message": { "type": "string" }
                        }
                    },
                    "ProfileResponse": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "user": { "$ref": "#/components/schemas/PublicUser" },
                            "message": { "type": "string" }
                        }
                    },
                    "DashboardResponse": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "dashboard": {
                                "type": "object",
                                "properties": {
                                    "totalBooks": { "type": "integer" },
                                    "availableBooks": { "type": "integer" },
                                    "rentedBooks": { "type": "integer" },
                                    "myBooks": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } }
                                }
                            },
                            "message": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }
}

/// Create a new instance of the users module
pub fn create_module(state: &AppState) -> Arc<dyn Module> {
    Arc::new(UsersModule::new(state.clone()))
}
