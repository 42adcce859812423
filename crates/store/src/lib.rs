//! Document collections for bookden: books, reviews, and users.
//!
//! The store exposes the operations the services need (find-with-filter,
//! count, sort, skip/limit, create, update-by-id, delete-by-id, delete-many,
//! and an atomic review upsert) over an in-process memory engine. Services
//! receive the store handle as a constructor parameter; there is no
//! process-wide singleton.

pub mod memory;
pub mod models;
pub mod query;

pub use memory::MemoryStore;
pub use models::{
    BookPatch, BookRecord, NewBook, NewReview, NewUser, ReviewPatch, ReviewRecord, UserRecord,
};
pub use query::{BookFilter, BookQuery, BookSort, Page};
