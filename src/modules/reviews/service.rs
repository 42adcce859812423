//! Review orchestration: policy-governed submission, author-gated mutation,
//! and the listings the frontend reads.
//!
//! The review-uniqueness rule is configured once (`reviews.policy` in
//! Settings) and injected here; no other code path decides it.

use std::sync::Arc;

use uuid::Uuid;

use bookden_http::error::ApiError;
use bookden_kernel::settings::ReviewPolicy;
use bookden_store::{MemoryStore, NewReview, ReviewPatch};

use super::models::{
    CanReviewResponse, CreateReview, ReviewResponse, ReviewedBookSummary, UpdateReview,
    UserReviewResponse,
};
use crate::validation::check;

/// Outcome of a policy-governed submission: the stored review and whether
/// it was newly created (`false` means an in-place update under the
/// single-review policy).
#[derive(Debug)]
pub struct SubmitOutcome {
    pub review: ReviewResponse,
    pub created: bool,
}

pub struct ReviewService {
    store: Arc<MemoryStore>,
    policy: ReviewPolicy,
}

impl ReviewService {
    pub fn new(store: Arc<MemoryStore>, policy: ReviewPolicy) -> Self {
        Self { store, policy }
    }

    /// Create-or-update per the active policy.
    pub async fn submit(&self, actor: Uuid, payload: CreateReview) -> Result<SubmitOutcome, ApiError> {
        check(&payload)?;

        let book = self
            .store
            .get_book(payload.book_id)
            .await
            .ok_or_else(|| ApiError::not_found("Book not found"))?;

        let new = NewReview {
            book_id: payload.book_id,
            user_id: actor,
            rating: payload.rating,
            review_text: payload.review_text.trim().to_string(),
        };

        let (record, created) = match self.policy {
            // One review per (user, book): atomic conditional upsert.
            ReviewPolicy::Single => self.store.upsert_review(new).await,
            // Unlimited reviews, but never on your own book.
            ReviewPolicy::Open => {
                if book.added_by == actor {
                    return Err(ApiError::conflict("You cannot review your own book"));
                }
                (self.store.create_review(new).await, true)
            }
        };

        tracing::info!(
            review_id = %record.id,
            book_id = %record.book_id,
            created,
            "review submitted"
        );

        let reviewer = self.store.get_user(actor).await;
        Ok(SubmitOutcome {
            review: ReviewResponse::from_record(record, reviewer.as_ref()),
            created,
        })
    }

    /// Author-gated update.
    pub async fn update(
        &self,
        actor: Uuid,
        id: Uuid,
        payload: UpdateReview,
    ) -> Result<ReviewResponse, ApiError> {
        check(&payload)?;

        let existing = self
            .store
            .get_review(id)
            .await
            .ok_or_else(|| ApiError::not_found("Review not found"))?;

        if existing.user_id != actor {
            return Err(ApiError::forbidden("Not authorized to update this review"));
        }

        let updated = self
            .store
            .update_review(
                id,
                ReviewPatch {
                    rating: payload.rating,
                    review_text: payload.review_text.map(|s| s.trim().to_string()),
                },
            )
            .await
            .ok_or_else(|| ApiError::not_found("Review not found"))?;

        let reviewer = self.store.get_user(updated.user_id).await;
        Ok(ReviewResponse::from_record(updated, reviewer.as_ref()))
    }

    /// Author-gated delete.
    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), ApiError> {
        let existing = self
            .store
            .get_review(id)
            .await
            .ok_or_else(|| ApiError::not_found("Review not found"))?;

        if existing.user_id != actor {
            return Err(ApiError::forbidden("Not authorized to delete this review"));
        }

        self.store.delete_review(id).await;
        Ok(())
    }

    /// All reviews for a book, newest first.
    pub async fn for_book(&self, book_id: Uuid) -> Result<Vec<ReviewResponse>, ApiError> {
        if self.store.get_book(book_id).await.is_none() {
            return Err(ApiError::not_found("Book not found"));
        }

        let reviews = self.store.reviews_for_book(book_id).await;
        let reviewer_ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
        let reviewers = self.store.users_by_ids(&reviewer_ids).await;

        Ok(reviews
            .into_iter()
            .map(|record| {
                let reviewer = reviewers.get(&record.user_id);
                ReviewResponse::from_record(record, reviewer)
            })
            .collect())
    }

    /// A user's review history, newest first, with reviewed books embedded.
    pub async fn by_user(&self, user_id: Uuid) -> Vec<UserReviewResponse> {
        let reviews = self.store.reviews_by_user(user_id).await;
        let reviewer = self.store.get_user(user_id).await;

        let mut responses = Vec::with_capacity(reviews.len());
        for record in reviews {
            let book = self.store.get_book(record.book_id).await;
            responses.push(UserReviewResponse {
                book: book.as_ref().map(ReviewedBookSummary::from_record),
                review: ReviewResponse::from_record(record, reviewer.as_ref()),
            });
        }
        responses
    }

    /// Whether the caller may submit a review for this book under the
    /// active policy, with the reason and any existing review id.
    pub async fn can_review(
        &self,
        actor: Uuid,
        book_id: Uuid,
    ) -> Result<CanReviewResponse, ApiError> {
        let book = self
            .store
            .get_book(book_id)
            .await
            .ok_or_else(|| ApiError::not_found("Book not found"))?;

        match self.policy {
            ReviewPolicy::Single => {
                let existing = self
                    .store
                    .find_review_by_user_and_book(actor, book_id)
                    .await;
                Ok(CanReviewResponse {
                    can_review: true,
                    reason: existing.as_ref().map(|_| {
                        "You have already reviewed this book; submitting again updates your review"
                            .to_string()
                    }),
                    existing_review_id: existing.map(|r| r.id),
                })
            }
            ReviewPolicy::Open => {
                if book.added_by == actor {
                    Ok(CanReviewResponse {
                        can_review: false,
                        reason: Some("You cannot review your own book".to_string()),
                        existing_review_id: None,
                    })
                } else {
                    Ok(CanReviewResponse {
                        can_review: true,
                        reason: None,
                        existing_review_id: None,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookden_store::{NewBook, NewUser};

    struct Fixture {
        store: Arc<MemoryStore>,
        owner: Uuid,
        reader: Uuid,
        book: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let owner = store
            .create_user(NewUser {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let reader = store
            .create_user(NewUser {
                name: "Reader".to_string(),
                email: "reader@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let book = store
            .create_book(NewBook {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                description: "desc".to_string(),
                genre: "Sci-Fi".to_string(),
                published_year: 1965,
                added_by: owner.id,
            })
            .await;
        Fixture {
            store,
            owner: owner.id,
            reader: reader.id,
            book: book.id,
        }
    }

    fn payload(book_id: Uuid, rating: u8) -> CreateReview {
        CreateReview {
            book_id,
            rating,
            review_text: "a fine read".to_string(),
        }
    }

    #[tokio::test]
    async fn single_policy_upserts_on_repeat_submission() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Single);

        let first = service.submit(f.reader, payload(f.book, 3)).await.unwrap();
        assert!(first.created);

        let second = service.submit(f.reader, payload(f.book, 5)).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.review.id, first.review.id);
        assert_eq!(second.review.rating, 5);
        assert_eq!(f.store.reviews_for_book(f.book).await.len(), 1);
    }

    #[tokio::test]
    async fn open_policy_allows_multiple_reviews_per_user() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Open);

        service.submit(f.reader, payload(f.book, 3)).await.unwrap();
        service.submit(f.reader, payload(f.book, 4)).await.unwrap();
        assert_eq!(f.store.reviews_for_book(f.book).await.len(), 2);
    }

    #[tokio::test]
    async fn open_policy_rejects_self_review_with_conflict() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Open);

        let err = service.submit(f.owner, payload(f.book, 5)).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn single_policy_permits_self_review() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Single);
        assert!(service.submit(f.owner, payload(f.book, 5)).await.is_ok());
    }

    #[tokio::test]
    async fn submit_against_missing_book_is_not_found() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Single);
        let err = service
            .submit(f.reader, payload(Uuid::now_v7(), 4))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_by_non_author_is_forbidden() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Single);
        let outcome = service.submit(f.reader, payload(f.book, 4)).await.unwrap();

        let err = service
            .update(f.owner, outcome.review.id, UpdateReview::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_by_author_removes_the_review() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Single);
        let outcome = service.submit(f.reader, payload(f.book, 4)).await.unwrap();

        service.delete(f.reader, outcome.review.id).await.unwrap();
        assert!(f.store.reviews_for_book(f.book).await.is_empty());
    }

    #[tokio::test]
    async fn can_review_reports_existing_review_under_single_policy() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Single);

        let before = service.can_review(f.reader, f.book).await.unwrap();
        assert!(before.can_review);
        assert!(before.existing_review_id.is_none());

        let outcome = service.submit(f.reader, payload(f.book, 4)).await.unwrap();

        let after = service.can_review(f.reader, f.book).await.unwrap();
        assert!(after.can_review);
        assert_eq!(after.existing_review_id, Some(outcome.review.id));
        assert!(after.reason.is_some());
    }

    #[tokio::test]
    async fn can_review_denies_owner_under_open_policy() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Open);

        let answer = service.can_review(f.owner, f.book).await.unwrap();
        assert!(!answer.can_review);
        assert_eq!(answer.reason.as_deref(), Some("You cannot review your own book"));

        let reader_answer = service.can_review(f.reader, f.book).await.unwrap();
        assert!(reader_answer.can_review);
    }

    #[tokio::test]
    async fn by_user_embeds_the_reviewed_book() {
        let f = fixture().await;
        let service = ReviewService::new(f.store.clone(), ReviewPolicy::Single);
        service.submit(f.reader, payload(f.book, 4)).await.unwrap();

        let history = service.by_user(f.reader).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].book.as_ref().unwrap().title, "Dune");
        assert_eq!(history[0].review.user.as_ref().unwrap().name, "Reader");
    }
}
