//! Book query types: filter predicate, sort order, and pagination window.
//!
//! The query is built by the caller (see the books module) and executed
//! mechanically by the store engine. Rating-based sorts are not expressible
//! here because the rating is derived after the fetch; callers fall back to
//! `BookSort::CreatedDesc` and re-sort the enriched page in memory.

use uuid::Uuid;

use crate::models::BookRecord;

/// Filter predicate over the books collection.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Restrict to books added by this user.
    pub owner: Option<Uuid>,
    /// Case-insensitive substring match against title OR author.
    pub search: Option<String>,
    /// Exact genre match.
    pub genre: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &BookRecord) -> bool {
        if let Some(owner) = self.owner {
            if book.added_by != owner {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = book.title.to_lowercase().contains(&needle);
            let in_author = book.author.to_lowercase().contains(&needle);
            if !in_title && !in_author {
                return false;
            }
        }
        if let Some(genre) = &self.genre {
            if &book.genre != genre {
                return false;
            }
        }
        true
    }
}

/// Store-level sort order for book listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    /// Newest first; the default.
    #[default]
    CreatedDesc,
    CreatedAsc,
    YearDesc,
    YearAsc,
    TitleAsc,
    TitleDesc,
}

/// A filtered, sorted, paginated query over the books collection.
#[derive(Debug, Clone)]
pub struct BookQuery {
    pub filter: BookFilter,
    pub sort: BookSort,
    pub skip: usize,
    pub limit: usize,
}

/// One page of records plus the total count ignoring pagination.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}
