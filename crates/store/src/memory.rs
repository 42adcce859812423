//! In-process memory engine backing the document collections.
//!
//! Each collection is a map behind its own `RwLock`; an insertion sequence
//! number breaks creation-time ties so newest-first orderings stay
//! deterministic. The review upsert takes the write lock once, so
//! insert-if-absent / update-if-present is a single atomic step.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    BookPatch, BookRecord, NewBook, NewReview, NewUser, ReviewPatch, ReviewRecord, UserRecord,
};
use crate::query::{BookFilter, BookQuery, BookSort, Page};

#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    record: T,
}

/// Handle to the in-memory document store. Cheap to share via `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    seq: AtomicU64,
    books: RwLock<HashMap<Uuid, Stored<BookRecord>>>,
    reviews: RwLock<HashMap<Uuid, Stored<ReviewRecord>>>,
    users: RwLock<HashMap<Uuid, Stored<UserRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    // --- books ---

    pub async fn create_book(&self, new: NewBook) -> BookRecord {
        let record = BookRecord {
            id: Uuid::now_v7(),
            title: new.title,
            author: new.author,
            description: new.description,
            genre: new.genre,
            published_year: new.published_year,
            added_by: new.added_by,
            created_at: OffsetDateTime::now_utc(),
        };
        let stored = Stored {
            seq: self.next_seq(),
            record: record.clone(),
        };
        self.books.write().await.insert(record.id, stored);
        record
    }

    pub async fn get_book(&self, id: Uuid) -> Option<BookRecord> {
        self.books.read().await.get(&id).map(|s| s.record.clone())
    }

    /// Execute a filtered, sorted, paginated query. The returned page also
    /// carries the total count of matching books ignoring skip/limit.
    pub async fn find_books(&self, query: &BookQuery) -> Page<BookRecord> {
        let books = self.books.read().await;
        let mut matching: Vec<&Stored<BookRecord>> = books
            .values()
            .filter(|s| query.filter.matches(&s.record))
            .collect();

        sort_books(&mut matching, query.sort);

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .map(|s| s.record.clone())
            .collect();

        Page { items, total }
    }

    pub async fn count_books(&self, filter: &BookFilter) -> usize {
        self.books
            .read()
            .await
            .values()
            .filter(|s| filter.matches(&s.record))
            .count()
    }

    /// Distinct genres across all books, sorted ascending.
    pub async fn distinct_genres(&self) -> Vec<String> {
        let books = self.books.read().await;
        let mut genres: Vec<String> = books.values().map(|s| s.record.genre.clone()).collect();
        genres.sort();
        genres.dedup();
        genres
    }

    pub async fn update_book(&self, id: Uuid, patch: BookPatch) -> Option<BookRecord> {
        let mut books = self.books.write().await;
        let stored = books.get_mut(&id)?;
        let record = &mut stored.record;
        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(author) = patch.author {
            record.author = author;
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(genre) = patch.genre {
            record.genre = genre;
        }
        if let Some(year) = patch.published_year {
            record.published_year = year;
        }
        Some(record.clone())
    }

    pub async fn delete_book(&self, id: Uuid) -> bool {
        self.books.write().await.remove(&id).is_some()
    }

    // --- reviews ---

    pub async fn create_review(&self, new: NewReview) -> ReviewRecord {
        let record = ReviewRecord {
            id: Uuid::now_v7(),
            book_id: new.book_id,
            user_id: new.user_id,
            rating: new.rating,
            review_text: new.review_text,
            created_at: OffsetDateTime::now_utc(),
        };
        let stored = Stored {
            seq: self.next_seq(),
            record: record.clone(),
        };
        self.reviews.write().await.insert(record.id, stored);
        record
    }

    pub async fn get_review(&self, id: Uuid) -> Option<ReviewRecord> {
        self.reviews.read().await.get(&id).map(|s| s.record.clone())
    }

    pub async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> Option<ReviewRecord> {
        let mut reviews = self.reviews.write().await;
        let stored = reviews.get_mut(&id)?;
        if let Some(rating) = patch.rating {
            stored.record.rating = rating;
        }
        if let Some(text) = patch.review_text {
            stored.record.review_text = text;
        }
        Some(stored.record.clone())
    }

    pub async fn delete_review(&self, id: Uuid) -> bool {
        self.reviews.write().await.remove(&id).is_some()
    }

    /// Delete-many cascade used when a book is removed. Returns the number
    /// of reviews dropped.
    pub async fn delete_reviews_for_book(&self, book_id: Uuid) -> usize {
        let mut reviews = self.reviews.write().await;
        let before = reviews.len();
        reviews.retain(|_, s| s.record.book_id != book_id);
        before - reviews.len()
    }

    /// All reviews for one book, newest first.
    pub async fn reviews_for_book(&self, book_id: Uuid) -> Vec<ReviewRecord> {
        let reviews = self.reviews.read().await;
        let mut matching: Vec<&Stored<ReviewRecord>> = reviews
            .values()
            .filter(|s| s.record.book_id == book_id)
            .collect();
        matching.sort_by(|a, b| newest_first(*a, *b));
        matching.into_iter().map(|s| s.record.clone()).collect()
    }

    /// All reviews written by one user, newest first.
    pub async fn reviews_by_user(&self, user_id: Uuid) -> Vec<ReviewRecord> {
        let reviews = self.reviews.read().await;
        let mut matching: Vec<&Stored<ReviewRecord>> = reviews
            .values()
            .filter(|s| s.record.user_id == user_id)
            .collect();
        matching.sort_by(|a, b| newest_first(*a, *b));
        matching.into_iter().map(|s| s.record.clone()).collect()
    }

    /// Grouped rating fetch for a page of books: one pass over the reviews
    /// collection, keyed by book id. Books without reviews get no entry.
    pub async fn ratings_for_books(&self, book_ids: &[Uuid]) -> HashMap<Uuid, Vec<u8>> {
        let reviews = self.reviews.read().await;
        let mut grouped: HashMap<Uuid, Vec<u8>> = HashMap::new();
        for stored in reviews.values() {
            if book_ids.contains(&stored.record.book_id) {
                grouped
                    .entry(stored.record.book_id)
                    .or_default()
                    .push(stored.record.rating);
            }
        }
        grouped
    }

    pub async fn find_review_by_user_and_book(
        &self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> Option<ReviewRecord> {
        self.reviews
            .read()
            .await
            .values()
            .find(|s| s.record.user_id == user_id && s.record.book_id == book_id)
            .map(|s| s.record.clone())
    }

    /// Atomic conditional upsert keyed by (user, book): updates the existing
    /// review in place or inserts a new one, under a single write lock.
    /// Returns the resulting record and whether it was newly created.
    pub async fn upsert_review(&self, new: NewReview) -> (ReviewRecord, bool) {
        let mut reviews = self.reviews.write().await;
        let existing = reviews
            .values_mut()
            .find(|s| s.record.user_id == new.user_id && s.record.book_id == new.book_id);

        if let Some(stored) = existing {
            stored.record.rating = new.rating;
            stored.record.review_text = new.review_text;
            return (stored.record.clone(), false);
        }

        let record = ReviewRecord {
            id: Uuid::now_v7(),
            book_id: new.book_id,
            user_id: new.user_id,
            rating: new.rating,
            review_text: new.review_text,
            created_at: OffsetDateTime::now_utc(),
        };
        let stored = Stored {
            seq: self.next_seq(),
            record: record.clone(),
        };
        reviews.insert(record.id, stored);
        (record, true)
    }

    // --- users ---

    /// Create a user; returns `None` when the email is already registered.
    /// The uniqueness check and insert happen under one write lock.
    pub async fn create_user(&self, new: NewUser) -> Option<UserRecord> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|s| s.record.email.eq_ignore_ascii_case(&new.email))
        {
            return None;
        }
        let record = UserRecord {
            id: Uuid::now_v7(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        let stored = Stored {
            seq: self.next_seq(),
            record: record.clone(),
        };
        users.insert(record.id, stored);
        Some(record)
    }

    pub async fn get_user(&self, id: Uuid) -> Option<UserRecord> {
        self.users.read().await.get(&id).map(|s| s.record.clone())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<UserRecord> {
        self.users
            .read()
            .await
            .values()
            .find(|s| s.record.email.eq_ignore_ascii_case(email))
            .map(|s| s.record.clone())
    }

    /// Batch user lookup for embedding owner/author summaries in responses.
    pub async fn users_by_ids(&self, ids: &[Uuid]) -> HashMap<Uuid, UserRecord> {
        let users = self.users.read().await;
        ids.iter()
            .filter_map(|id| users.get(id).map(|s| (*id, s.record.clone())))
            .collect()
    }
}

fn sort_books(books: &mut [&Stored<BookRecord>], sort: BookSort) {
    match sort {
        BookSort::CreatedDesc => books.sort_by(|a, b| newest_first(*a, *b)),
        BookSort::CreatedAsc => books.sort_by(|a, b| newest_first(*b, *a)),
        BookSort::YearDesc => books.sort_by(|a, b| b.record.published_year.cmp(&a.record.published_year)),
        BookSort::YearAsc => books.sort_by(|a, b| a.record.published_year.cmp(&b.record.published_year)),
        BookSort::TitleAsc => books.sort_by(|a, b| a.record.title.cmp(&b.record.title)),
        BookSort::TitleDesc => books.sort_by(|a, b| b.record.title.cmp(&a.record.title)),
    }
}

trait Timestamped {
    fn created_at(&self) -> OffsetDateTime;
    fn seq(&self) -> u64;
}

impl Timestamped for Stored<BookRecord> {
    fn created_at(&self) -> OffsetDateTime {
        self.record.created_at
    }
    fn seq(&self) -> u64 {
        self.seq
    }
}

impl Timestamped for Stored<ReviewRecord> {
    fn created_at(&self) -> OffsetDateTime {
        self.record.created_at
    }
    fn seq(&self) -> u64 {
        self.seq
    }
}

fn newest_first<T: Timestamped>(a: &T, b: &T) -> std::cmp::Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.seq().cmp(&a.seq()))
}
