//! Bearer-token authentication: JWT issue/verify plus the `CurrentUser`
//! extractor handlers use to require a verified caller identity.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

/// JWT signing and verification keys, built once from settings and shared
/// through request extensions.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_secs: u64,
    validation: Validation,
}

impl AuthKeys {
    pub fn from_settings(auth: &bookden_kernel::settings::AuthSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
            token_ttl_secs: auth.token_ttl_secs,
            validation: Validation::default(),
        }
    }

    /// Issue a token for the given user id.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc().unix_timestamp() as u64 + self.token_ttl_secs;
        let claims = Claims {
            sub: user_id,
            exp: exp as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify a token and return the caller's user id.
    pub fn verify(&self, token: &str) -> Result<Uuid, ApiError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))
    }
}

/// Verified caller identity, extracted from the `Authorization: Bearer`
/// header. Handlers that take this parameter reject unauthenticated calls.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts
            .extensions
            .get::<Arc<AuthKeys>>()
            .cloned()
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("auth keys not configured")))?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let user_id = keys.verify(token)?;
        Ok(CurrentUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookden_kernel::settings::AuthSettings;

    fn keys() -> AuthKeys {
        AuthKeys::from_settings(&AuthSettings::default())
    }

    #[test]
    fn issued_token_round_trips() {
        let keys = keys();
        let user_id = Uuid::now_v7();
        let token = keys.issue(user_id).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let keys = keys();
        let err = keys.verify("not-a-token").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let keys = keys();
        let other = AuthKeys::from_settings(&AuthSettings {
            jwt_secret: "a-different-secret".to_string(),
            ..AuthSettings::default()
        });
        let token = other.issue(Uuid::now_v7()).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
