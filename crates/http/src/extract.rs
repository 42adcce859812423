//! Request extractors whose rejections speak the API error envelope.
//!
//! Axum's stock `Json` and `Path` reply to malformed input with plain-text
//! bodies; these wrappers convert those rejections into `ApiError` so every
//! failure reaches the client as `{success: false, message, errors}`.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor. Malformed or mistyped bodies become a 400 with
/// field detail instead of axum's plain-text rejection.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_field("body", rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path parameter extractor. A path segment that fails to parse (for
/// example a non-UUID id) becomes a 400 with field detail.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| ApiError::invalid_field("id", rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        rating: u8,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn malformed_json_body_becomes_a_validation_error() {
        let err = ApiJson::<Payload>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        match err {
            ApiError::Validation { errors } => assert_eq!(errors[0].field, "body"),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mistyped_json_field_becomes_a_validation_error() {
        let err = ApiJson::<Payload>::from_request(json_request(r#"{"rating":"five"}"#), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[tokio::test]
    async fn well_formed_body_passes_through() {
        let ApiJson(payload) = ApiJson::<Payload>::from_request(json_request(r#"{"rating":4}"#), &())
            .await
            .unwrap();
        assert_eq!(payload.rating, 4);
    }
}
