pub mod models;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use bookden_http::auth::{AuthKeys, CurrentUser};
use bookden_http::envelope::Envelope;
use bookden_http::error::ApiError;
use bookden_http::extract::ApiJson;
use bookden_kernel::{InitCtx, Module};
use bookden_store::MemoryStore;

use models::{AuthData, LoginRequest, RegisterRequest, UserResponse};
use service::AuthService;

/// Auth module: registration, login, and the current-user lookup.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    pub fn new(store: Arc<MemoryStore>, keys: Arc<AuthKeys>) -> Self {
        Self {
            service: Arc::new(AuthService::new(store, keys)),
        }
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
            environment = ?ctx.settings.environment,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/me", get(me))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register a new user and issue a token",
                        "tags": ["Auth"],
                        "responses": {
                            "201": {"description": "User registered"},
                            "409": {"description": "Email already registered", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ErrorResponse"}}}}
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Verify credentials and issue a token",
                        "tags": ["Auth"],
                        "responses": {
                            "200": {"description": "Logged in"},
                            "401": {"description": "Invalid credentials"}
                        }
                    }
                },
                "/me": {
                    "get": {
                        "summary": "Current user profile",
                        "tags": ["Auth"],
                        "responses": {
                            "200": {"description": "User profile"},
                            "401": {"description": "Authentication required"}
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module stopped");
        Ok(())
    }
}

/// POST /register
async fn register(
    State(service): State<Arc<AuthService>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<AuthData>>), ApiError> {
    let data = service.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(data, "User registered successfully")),
    ))
}

/// POST /login
async fn login(
    State(service): State<Arc<AuthService>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<Envelope<AuthData>>, ApiError> {
    let data = service.login(payload).await?;
    Ok(Json(Envelope::with_message(data, "Logged in successfully")))
}

/// GET /me
async fn me(
    State(service): State<Arc<AuthService>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    let user = service.me(user_id).await?;
    Ok(Json(Envelope::data(user)))
}

/// Create a new instance of the auth module
pub fn create_module(store: Arc<MemoryStore>, keys: Arc<AuthKeys>) -> Arc<dyn Module> {
    Arc::new(AuthModule::new(store, keys))
}
