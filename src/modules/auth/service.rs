//! Registration, login, and the current-user lookup. Password hashing and
//! token signing are delegated to bcrypt and the shared JWT keys.

use std::sync::Arc;

use anyhow::Context;
use uuid::Uuid;

use bookden_http::auth::AuthKeys;
use bookden_http::error::ApiError;
use bookden_store::{MemoryStore, NewUser};

use super::models::{AuthData, LoginRequest, RegisterRequest, UserResponse};
use crate::validation::check;

pub struct AuthService {
    store: Arc<MemoryStore>,
    keys: Arc<AuthKeys>,
}

impl AuthService {
    pub fn new(store: Arc<MemoryStore>, keys: Arc<AuthKeys>) -> Self {
        Self { store, keys }
    }

    pub async fn register(&self, payload: RegisterRequest) -> Result<AuthData, ApiError> {
        check(&payload)?;

        let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
            .context("failed to hash password")?;

        let user = self
            .store
            .create_user(NewUser {
                name: payload.name.trim().to_string(),
                email: payload.email.trim().to_lowercase(),
                password_hash,
            })
            .await
            .ok_or_else(|| ApiError::conflict("Email is already registered"))?;

        tracing::info!(user_id = %user.id, "user registered");

        let token = self.keys.issue(user.id)?;
        Ok(AuthData {
            token,
            user: UserResponse::from_record(user),
        })
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<AuthData, ApiError> {
        check(&payload)?;

        // Same answer for unknown email and wrong password.
        let user = self
            .store
            .find_user_by_email(payload.email.trim())
            .await
            .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

        let valid = bcrypt::verify(&payload.password, &user.password_hash)
            .context("failed to verify password")?;
        if !valid {
            return Err(ApiError::unauthorized("Invalid credentials"));
        }

        let token = self.keys.issue(user.id)?;
        Ok(AuthData {
            token,
            user: UserResponse::from_record(user),
        })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserResponse, ApiError> {
        self.store
            .get_user(user_id)
            .await
            .map(UserResponse::from_record)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }
}
