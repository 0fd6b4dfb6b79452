pub mod models;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Router};
use bookshare_kernel::{InitCtx, Module};
use serde_json::json;

use crate::state::AppState;

/// Registration, login and credential verification.
pub struct AuthModule {
    state: AppState,
}

impl AuthModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            token_mode = ?ctx.settings.auth.token_mode,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/register", post(routes::register))
            .route("/login", post(routes::login))
            .route("/verifyToken/{token}", post(routes::verify_token))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
            })
        };
        let auth_ok = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/AuthResponse" } } }
            })
        };

        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register a new user",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/RegisterPayload" } } }
                        },
                        "responses": {
                            "201": auth_ok("User created"),
                            "400": error("Validation failed or email already registered")
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Log in with email and password",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/LoginPayload" } } }
                        },
                        "responses": {
                            "200": auth_ok("Logged in"),
                            "400": error("Email or password missing"),
                            "401": error("Invalid email or password")
                        }
                    }
                },
                "/verifyToken/{token}": {
                    "post": {
                        "summary": "Resolve a credential to its user",
                        "tags": ["Auth"],
                        "parameters": [
                            { "name": "token", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": auth_ok("Credential is valid"),
                            "401": error("Credential is invalid")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "PublicUser": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "mobile": { "type": "string" },
                            "role": { "type": "string", "enum": ["owner", "seeker"] }
                        },
                        "required": ["id", "name", "email", "mobile", "role"]
                    },
                    "RegisterPayload": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "minLength": 6 },
                            "mobile": { "type": "string", "pattern": "^[0-9]{10}$" },
                            "role": { "type": "string", "enum": ["owner", "seeker"] }
                        },
                        "required": ["name", "email", "password", "mobile", "role"]
                    },
                    "LoginPayload": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string" },
                            "password": { "type": "string" }
                        },
                        "required": ["email", "password"]
                    },
                    "AuthResponse": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "user": { "$ref": "#/components/schemas/PublicUser" },
                            "token": { "type": "string", "description": "Present in signed token mode" }
                        },
                        "required": ["success", "user"]
                    }
                }
            }
        }))
    }
}

/// Create a new instance of the auth module
pub fn create_module(state: &AppState) -> Arc<dyn Module> {
    Arc::new(AuthModule::new(state.clone()))
}
