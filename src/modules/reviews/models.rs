use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use bookden_store::{BookRecord, ReviewRecord, UserRecord};

/// Review author embedded in review payloads: `{id, name}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerSummary {
    pub id: Uuid,
    pub name: String,
}

impl ReviewerSummary {
    pub fn from_record(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Book reference embedded in a user's review history: `{id, title, author}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedBookSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
}

impl ReviewedBookSummary {
    pub fn from_record(book: &BookRecord) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ReviewerSummary>,
    pub rating: u8,
    pub review_text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ReviewResponse {
    pub fn from_record(record: ReviewRecord, reviewer: Option<&UserRecord>) -> Self {
        Self {
            id: record.id,
            book_id: record.book_id,
            user: reviewer.map(ReviewerSummary::from_record),
            rating: record.rating,
            review_text: record.review_text,
            created_at: record.created_at,
        }
    }
}

/// A review in a user's history, with the reviewed book embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReviewResponse {
    #[serde(flatten)]
    pub review: ReviewResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<ReviewedBookSummary>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub book_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Review text is required and must be less than 500 characters"
    ))]
    pub review_text: String,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReview {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<u8>,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Review text must be less than 500 characters"
    ))]
    pub review_text: Option<String>,
}

/// Answer for `GET /can-review/{bookId}` under the active policy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanReviewResponse {
    pub can_review: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_review_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::check;

    fn create_payload(rating: u8) -> CreateReview {
        CreateReview {
            book_id: Uuid::now_v7(),
            rating,
            review_text: "a fine read".to_string(),
        }
    }

    #[test]
    fn ratings_one_through_five_pass() {
        for rating in 1..=5 {
            assert!(check(&create_payload(rating)).is_ok(), "rating {rating}");
        }
    }

    #[test]
    fn rating_zero_and_six_are_rejected() {
        assert!(check(&create_payload(0)).is_err());
        assert!(check(&create_payload(6)).is_err());
    }

    #[test]
    fn empty_review_text_is_rejected() {
        let payload = CreateReview {
            review_text: String::new(),
            ..create_payload(4)
        };
        assert!(check(&payload).is_err());
    }

    #[test]
    fn over_long_review_text_is_rejected() {
        let payload = CreateReview {
            review_text: "x".repeat(501),
            ..create_payload(4)
        };
        assert!(check(&payload).is_err());
    }
}
