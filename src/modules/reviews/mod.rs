pub mod models;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use bookden_http::auth::CurrentUser;
use bookden_http::envelope::Envelope;
use bookden_http::error::ApiError;
use bookden_http::extract::{ApiJson, ApiPath};
use bookden_kernel::settings::ReviewPolicy;
use bookden_kernel::{InitCtx, Module};
use bookden_store::MemoryStore;

use models::{CanReviewResponse, CreateReview, ReviewResponse, UpdateReview, UserReviewResponse};
use service::ReviewService;

/// Reviews module: policy-governed submission plus author-gated mutation.
pub struct ReviewsModule {
    service: Arc<ReviewService>,
    policy: ReviewPolicy,
}

impl ReviewsModule {
    pub fn new(store: Arc<MemoryStore>, policy: ReviewPolicy) -> Self {
        Self {
            service: Arc::new(ReviewService::new(store, policy)),
            policy,
        }
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            policy = ?self.policy,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(submit_review))
            .route("/{id}", put(update_review).delete(delete_review))
            .route("/book/{bookId}", get(reviews_for_book))
            .route("/user/{userId}", get(reviews_by_user))
            .route("/can-review/{bookId}", get(can_review))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Submit a review (create-or-update per the configured policy)",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": {"description": "Existing review updated"},
                            "201": {"description": "Review created"},
                            "404": {"description": "Book not found"},
                            "409": {"description": "Policy violation", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ErrorResponse"}}}}
                        }
                    }
                },
                "/{id}": {
                    "put": {
                        "summary": "Update a review (author only)",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": {"description": "Review updated"},
                            "403": {"description": "Not the author"},
                            "404": {"description": "Review not found"}
                        }
                    },
                    "delete": {
                        "summary": "Delete a review (author only)",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": {"description": "Review deleted"},
                            "403": {"description": "Not the author"},
                            "404": {"description": "Review not found"}
                        }
                    }
                },
                "/book/{bookId}": {
                    "get": {
                        "summary": "Reviews for a book, newest first",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": {"description": "Review list"},
                            "404": {"description": "Book not found"}
                        }
                    }
                },
                "/user/{userId}": {
                    "get": {
                        "summary": "A user's reviews, newest first, with reviewed books embedded",
                        "tags": ["Reviews"],
                        "responses": {"200": {"description": "Review list"}}
                    }
                },
                "/can-review/{bookId}": {
                    "get": {
                        "summary": "Whether the caller may review this book under the active policy",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": {"description": "Eligibility answer"},
                            "404": {"description": "Book not found"}
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module stopped");
        Ok(())
    }
}

/// POST /: create-or-update per the configured policy. Replies 201 for a
/// new review, 200 for an in-place update.
async fn submit_review(
    State(service): State<Arc<ReviewService>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<CreateReview>,
) -> Result<(StatusCode, Json<Envelope<ReviewResponse>>), ApiError> {
    let outcome = service.submit(user_id, payload).await?;
    let (status, message) = if outcome.created {
        (StatusCode::CREATED, "Review created successfully")
    } else {
        (StatusCode::OK, "Review updated successfully")
    };
    Ok((status, Json(Envelope::with_message(outcome.review, message))))
}

/// PUT /{id}: author-only update.
async fn update_review(
    State(service): State<Arc<ReviewService>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateReview>,
) -> Result<Json<Envelope<ReviewResponse>>, ApiError> {
    let review = service.update(user_id, id, payload).await?;
    Ok(Json(Envelope::with_message(
        review,
        "Review updated successfully",
    )))
}

/// DELETE /{id}: author-only delete.
async fn delete_review(
    State(service): State<Arc<ReviewService>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    service.delete(user_id, id).await?;
    Ok(Json(Envelope::message("Review deleted successfully")))
}

/// GET /book/{bookId}: public listing, newest first.
async fn reviews_for_book(
    State(service): State<Arc<ReviewService>>,
    ApiPath(book_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<Vec<ReviewResponse>>>, ApiError> {
    let reviews = service.for_book(book_id).await?;
    Ok(Json(Envelope::data(reviews)))
}

/// GET /user/{userId}: public review history.
async fn reviews_by_user(
    State(service): State<Arc<ReviewService>>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<Vec<UserReviewResponse>>>, ApiError> {
    let reviews = service.by_user(user_id).await;
    Ok(Json(Envelope::data(reviews)))
}

/// GET /can-review/{bookId}: eligibility under the active policy.
async fn can_review(
    State(service): State<Arc<ReviewService>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(book_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<CanReviewResponse>>, ApiError> {
    let answer = service.can_review(user_id, book_id).await?;
    Ok(Json(Envelope::data(answer)))
}

/// Create a new instance of the reviews module
pub fn create_module(store: Arc<MemoryStore>, policy: ReviewPolicy) -> Arc<dyn Module> {
    Arc::new(ReviewsModule::new(store, policy))
}
