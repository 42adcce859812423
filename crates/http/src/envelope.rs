//! JSON response envelope shared by every handler:
//! `{success, data?, message?, pagination?}`.

use serde::Serialize;

/// Successful response body. Errors use the same outer shape via `ApiError`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

/// Pagination metadata attached to listing responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_books: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// `total_pages = ceil(total / limit)`; `has_next`/`has_prev` derive
    /// from the current page position.
    pub fn new(current_page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit.max(1));
        Self {
            current_page,
            total_pages,
            total_books: total,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_math_for_partial_last_page() {
        // 12 matching books, page 2 of limit 5 -> 3 pages, both neighbors.
        let p = Pagination::new(2, 5, 12);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.total_books, 12);
        assert!(p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn pagination_first_and_last_page_flags() {
        let first = Pagination::new(1, 5, 12);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let last = Pagination::new(3, 5, 12);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn pagination_with_no_results_has_zero_pages() {
        let p = Pagination::new(1, 5, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn envelope_serializes_in_camel_case() {
        let body = Envelope::paginated(vec![1, 2, 3], Pagination::new(1, 5, 3));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["pagination"]["currentPage"], 1);
        assert_eq!(json["pagination"]["totalBooks"], 3);
        assert!(json.get("message").is_none());
    }
}
