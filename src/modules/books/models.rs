use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use bookden_store::{BookRecord, UserRecord};

use crate::modules::reviews::models::ReviewResponse;

/// Owner embedded in book payloads, mirroring the `{id, name, email}`
/// projection the frontend expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl OwnerSummary {
    pub fn from_record(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Book payload enriched with the derived rating attributes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub published_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<OwnerSummary>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub average_rating: f64,
    pub review_count: usize,
}

impl BookResponse {
    pub fn from_record(
        record: BookRecord,
        owner: Option<OwnerSummary>,
        average_rating: f64,
        review_count: usize,
    ) -> Self {
        Self {
            id: record.id,
            title: record.title,
            author: record.author,
            description: record.description,
            genre: record.genre,
            published_year: record.published_year,
            added_by: owner,
            created_at: record.created_at,
            average_rating,
            review_count,
        }
    }
}

/// Single-book detail: the enriched book plus its full review list,
/// newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetailResponse {
    #[serde(flatten)]
    pub book: BookResponse,
    pub reviews: Vec<ReviewResponse>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title is required and must be less than 200 characters"
    ))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Author is required and must be less than 100 characters"
    ))]
    pub author: String,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Description is required and must be less than 1000 characters"
    ))]
    pub description: String,
    #[validate(length(
        min = 1,
        max = 50,
        message = "Genre is required and must be less than 50 characters"
    ))]
    pub genre: String,
    #[validate(custom(function = validate_published_year))]
    pub published_year: i32,
}

/// Partial update; absent fields are left unchanged. Ownership is not
/// updatable.
#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be less than 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Author must be less than 100 characters"))]
    pub author: Option<String>,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Description must be less than 1000 characters"
    ))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Genre must be less than 50 characters"))]
    pub genre: Option<String>,
    #[validate(custom(function = validate_published_year))]
    pub published_year: Option<i32>,
}

fn validate_published_year(year: i32) -> Result<(), ValidationError> {
    let current_year = OffsetDateTime::now_utc().year();
    if year < 1000 || year > current_year {
        return Err(ValidationError::new("published_year")
            .with_message("Published year must be valid".into()));
    }
    Ok(())
}
