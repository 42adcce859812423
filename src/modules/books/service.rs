//! Book catalog orchestration: listing with rating enrichment, single-book
//! detail assembly, and owner-gated mutation.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use bookden_http::envelope::Pagination;
use bookden_http::error::ApiError;
use bookden_store::{BookPatch, BookRecord, MemoryStore, NewBook};

use super::models::{BookDetailResponse, BookResponse, CreateBook, OwnerSummary, UpdateBook};
use super::query::{build_plan, ListParams};
use super::rating::{average_rating, sort_page_by_rating};
use crate::modules::reviews::models::ReviewResponse;
use crate::validation::check;

/// Book operations over the store. Constructed with its store handle;
/// holds no other state.
pub struct BookService {
    store: Arc<MemoryStore>,
}

impl BookService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Paginated listing: build the query, fetch the page, enrich with
    /// rating stats, then apply the page-local rating re-sort if requested.
    pub async fn list(
        &self,
        params: &ListParams,
        scope_to_owner: Option<Uuid>,
    ) -> Result<(Vec<BookResponse>, Pagination), ApiError> {
        let plan = build_plan(params, scope_to_owner)?;

        let page = self.store.find_books(&plan.query).await;
        let pagination = Pagination::new(plan.page, plan.limit, page.total as u64);

        let mut books = self.enrich(page.items).await;
        if let Some(direction) = plan.rating_sort {
            sort_page_by_rating(&mut books, direction);
        }

        Ok((books, pagination))
    }

    /// Sorted distinct genres across the whole catalog.
    pub async fn genres(&self) -> Vec<String> {
        self.store.distinct_genres().await
    }

    /// Single-book detail: rating stats over the full review set plus the
    /// review list, newest first.
    pub async fn detail(&self, id: Uuid) -> Result<BookDetailResponse, ApiError> {
        let record = self
            .store
            .get_book(id)
            .await
            .ok_or_else(|| ApiError::not_found("Book not found"))?;

        let reviews = self.store.reviews_for_book(id).await;
        let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();
        let review_count = ratings.len();
        let rating = average_rating(&ratings);

        let reviewer_ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
        let reviewers = self.store.users_by_ids(&reviewer_ids).await;
        let review_payloads = reviews
            .into_iter()
            .map(|review| {
                let reviewer = reviewers.get(&review.user_id);
                ReviewResponse::from_record(review, reviewer)
            })
            .collect();

        let owner = self.owner_summary(record.added_by).await;
        Ok(BookDetailResponse {
            book: BookResponse::from_record(record, owner, rating, review_count),
            reviews: review_payloads,
        })
    }

    pub async fn create(&self, owner: Uuid, payload: CreateBook) -> Result<BookResponse, ApiError> {
        check(&payload)?;

        let record = self
            .store
            .create_book(NewBook {
                title: payload.title.trim().to_string(),
                author: payload.author.trim().to_string(),
                description: payload.description.trim().to_string(),
                genre: payload.genre.trim().to_string(),
                published_year: payload.published_year,
                added_by: owner,
            })
            .await;

        tracing::info!(book_id = %record.id, owner = %owner, "book created");

        let owner_summary = self.owner_summary(owner).await;
        Ok(BookResponse::from_record(record, owner_summary, 0.0, 0))
    }

    /// Owner-gated update; the rating stats on the response are recomputed
    /// from current reviews.
    pub async fn update(
        &self,
        actor: Uuid,
        id: Uuid,
        payload: UpdateBook,
    ) -> Result<BookResponse, ApiError> {
        check(&payload)?;

        let existing = self
            .store
            .get_book(id)
            .await
            .ok_or_else(|| ApiError::not_found("Book not found"))?;

        if existing.added_by != actor {
            return Err(ApiError::forbidden("Not authorized to update this book"));
        }

        let updated = self
            .store
            .update_book(
                id,
                BookPatch {
                    title: payload.title.map(|s| s.trim().to_string()),
                    author: payload.author.map(|s| s.trim().to_string()),
                    description: payload.description.map(|s| s.trim().to_string()),
                    genre: payload.genre.map(|s| s.trim().to_string()),
                    published_year: payload.published_year,
                },
            )
            .await
            .ok_or_else(|| ApiError::not_found("Book not found"))?;

        let ratings: Vec<u8> = self
            .store
            .reviews_for_book(id)
            .await
            .iter()
            .map(|r| r.rating)
            .collect();

        let owner = self.owner_summary(updated.added_by).await;
        Ok(BookResponse::from_record(
            updated,
            owner,
            average_rating(&ratings),
            ratings.len(),
        ))
    }

    /// Owner-gated delete; cascades to all reviews of the book.
    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), ApiError> {
        let existing = self
            .store
            .get_book(id)
            .await
            .ok_or_else(|| ApiError::not_found("Book not found"))?;

        if existing.added_by != actor {
            return Err(ApiError::forbidden("Not authorized to delete this book"));
        }

        let dropped_reviews = self.store.delete_reviews_for_book(id).await;
        self.store.delete_book(id).await;

        tracing::info!(book_id = %id, dropped_reviews, "book deleted");
        Ok(())
    }

    /// Enrich one fetched page with rating stats via a single grouped
    /// review query, and embed owner summaries.
    async fn enrich(&self, records: Vec<BookRecord>) -> Vec<BookResponse> {
        let book_ids: Vec<Uuid> = records.iter().map(|b| b.id).collect();
        let grouped = self.store.ratings_for_books(&book_ids).await;

        let owner_ids: Vec<Uuid> = records.iter().map(|b| b.added_by).collect();
        let owners = self.store.users_by_ids(&owner_ids).await;

        records
            .into_iter()
            .map(|record| {
                let empty: Vec<u8> = Vec::new();
                let ratings = grouped.get(&record.id).unwrap_or(&empty);
                let owner = owners.get(&record.added_by).map(OwnerSummary::from_record);
                BookResponse::from_record(record, owner, average_rating(ratings), ratings.len())
            })
            .collect()
    }

    async fn owner_summary(&self, owner_id: Uuid) -> Option<OwnerSummary> {
        self.store
            .get_user(owner_id)
            .await
            .map(|user| OwnerSummary::from_record(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookden_store::{NewReview, NewUser};

    async fn store_with_owner() -> (Arc<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let owner = store
            .create_user(NewUser {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        (store, owner.id)
    }

    fn create_payload(title: &str, genre: &str) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            author: "Author".to_string(),
            description: "desc".to_string(),
            genre: genre.to_string(),
            published_year: 2000,
        }
    }

    #[tokio::test]
    async fn list_pages_twelve_books_as_three_pages() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store);
        for i in 0..12 {
            service
                .create(owner, create_payload(&format!("Book {i:02}"), "Sci-Fi"))
                .await
                .unwrap();
        }

        let params = ListParams {
            page: Some("2".to_string()),
            limit: Some("5".to_string()),
            ..Default::default()
        };
        let (books, pagination) = service.list(&params, None).await.unwrap();

        assert_eq!(books.len(), 5);
        assert_eq!(pagination.current_page, 2);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.total_books, 12);
        assert!(pagination.has_next);
        assert!(pagination.has_prev);
    }

    #[tokio::test]
    async fn list_search_matches_case_insensitively() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store);
        service.create(owner, create_payload("Dune", "Sci-Fi")).await.unwrap();
        service
            .create(owner, create_payload("Foundation", "Sci-Fi"))
            .await
            .unwrap();

        let params = ListParams {
            search: Some("dune".to_string()),
            ..Default::default()
        };
        let (books, pagination) = service.list(&params, None).await.unwrap();
        assert_eq!(pagination.total_books, 1);
        assert_eq!(books[0].title, "Dune");
    }

    #[tokio::test]
    async fn list_enriches_with_average_rating() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store.clone());
        let book = service.create(owner, create_payload("Dune", "Sci-Fi")).await.unwrap();
        for rating in [5, 4, 4] {
            store
                .create_review(NewReview {
                    book_id: book.id,
                    user_id: Uuid::now_v7(),
                    rating,
                    review_text: "text".to_string(),
                })
                .await;
        }

        let (books, _) = service.list(&ListParams::default(), None).await.unwrap();
        assert_eq!(books[0].average_rating, 4.3);
        assert_eq!(books[0].review_count, 3);
    }

    #[tokio::test]
    async fn rating_desc_orders_the_current_page() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store.clone());
        let low = service.create(owner, create_payload("Low", "Sci-Fi")).await.unwrap();
        let high = service.create(owner, create_payload("High", "Sci-Fi")).await.unwrap();
        store
            .create_review(NewReview {
                book_id: low.id,
                user_id: Uuid::now_v7(),
                rating: 2,
                review_text: "meh".to_string(),
            })
            .await;
        store
            .create_review(NewReview {
                book_id: high.id,
                user_id: Uuid::now_v7(),
                rating: 5,
                review_text: "great".to_string(),
            })
            .await;

        let params = ListParams {
            sort_by: Some("rating-desc".to_string()),
            ..Default::default()
        };
        let (books, _) = service.list(&params, None).await.unwrap();
        assert_eq!(books[0].title, "High");
        assert_eq!(books[1].title, "Low");
    }

    #[tokio::test]
    async fn my_books_scope_hides_other_owners() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store.clone());
        service.create(owner, create_payload("Mine", "Sci-Fi")).await.unwrap();

        let other = Uuid::now_v7();
        service.create(other, create_payload("Theirs", "Sci-Fi")).await.unwrap();

        let (books, pagination) = service
            .list(&ListParams::default(), Some(owner))
            .await
            .unwrap();
        assert_eq!(pagination.total_books, 1);
        assert_eq!(books[0].title, "Mine");
    }

    #[tokio::test]
    async fn detail_returns_reviews_newest_first_with_stats() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store.clone());
        let book = service.create(owner, create_payload("Dune", "Sci-Fi")).await.unwrap();
        for rating in [5, 4, 4] {
            store
                .create_review(NewReview {
                    book_id: book.id,
                    user_id: Uuid::now_v7(),
                    rating,
                    review_text: format!("rated {rating}"),
                })
                .await;
        }

        let detail = service.detail(book.id).await.unwrap();
        assert_eq!(detail.book.average_rating, 4.3);
        assert_eq!(detail.book.review_count, 3);
        assert_eq!(detail.reviews.len(), 3);
        // newest first: the last created review leads
        assert_eq!(detail.reviews[0].review_text, "rated 4");
    }

    #[tokio::test]
    async fn detail_of_missing_book_is_not_found() {
        let (store, _) = store_with_owner().await;
        let service = BookService::new(store);
        let err = service.detail(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_by_non_owner_is_forbidden() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store);
        let book = service.create(owner, create_payload("Dune", "Sci-Fi")).await.unwrap();

        let stranger = Uuid::now_v7();
        let err = service
            .update(stranger, book.id, UpdateBook::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_cascades_to_reviews() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store.clone());
        let book = service.create(owner, create_payload("Dune", "Sci-Fi")).await.unwrap();
        store
            .create_review(NewReview {
                book_id: book.id,
                user_id: Uuid::now_v7(),
                rating: 5,
                review_text: "text".to_string(),
            })
            .await;

        service.delete(owner, book.id).await.unwrap();
        assert!(store.get_book(book.id).await.is_none());
        assert!(store.reviews_for_book(book.id).await.is_empty());
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_forbidden_and_keeps_book() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store.clone());
        let book = service.create(owner, create_payload("Dune", "Sci-Fi")).await.unwrap();

        let err = service.delete(Uuid::now_v7(), book.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(store.get_book(book.id).await.is_some());
    }

    #[tokio::test]
    async fn owner_summary_is_embedded_in_listings() {
        let (store, owner) = store_with_owner().await;
        let service = BookService::new(store);
        service.create(owner, create_payload("Dune", "Sci-Fi")).await.unwrap();

        let (books, _) = service.list(&ListParams::default(), None).await.unwrap();
        let embedded = books[0].added_by.as_ref().unwrap();
        assert_eq!(embedded.id, owner);
        assert_eq!(embedded.email, "owner@example.com");
    }
}
