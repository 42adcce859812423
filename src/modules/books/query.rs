//! Translates listing request parameters into a store query.
//!
//! Rating sorts cannot run at the store level because the rating is derived
//! after the fetch; for those the query falls back to newest-first and the
//! returned plan tells the caller to re-sort the enriched page.

use serde::Deserialize;
use uuid::Uuid;

use bookden_http::error::{ApiError, FieldError};
use bookden_store::{BookFilter, BookQuery, BookSort};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 5;
pub const MAX_LIMIT: u64 = 50;

/// Raw listing parameters as they arrive on the query string. `page` and
/// `limit` stay strings here so that non-numeric input reaches the
/// validation step and comes back with field detail instead of failing
/// inside the query-string deserializer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub genre: Option<String>,
    pub sort_by: Option<String>,
}

/// Direction of the in-memory, page-local rating re-sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingSort {
    Desc,
    Asc,
}

/// Validated query plan: the store-level query plus what the caller must do
/// after enrichment.
#[derive(Debug, Clone)]
pub struct ListPlan {
    pub query: BookQuery,
    pub page: u64,
    pub limit: u64,
    pub rating_sort: Option<RatingSort>,
}

/// Validate the parameters and build the query. Out-of-range page/limit are
/// reported with field detail, never clamped.
pub fn build_plan(params: &ListParams, scope_to_owner: Option<Uuid>) -> Result<ListPlan, ApiError> {
    let mut errors = Vec::new();

    let page = match parse_bound(&params.page) {
        Some(None) => DEFAULT_PAGE,
        Some(Some(p)) if p >= 1 => p,
        _ => {
            errors.push(FieldError::new("page", "Page must be a positive integer"));
            DEFAULT_PAGE
        }
    };

    let limit = match parse_bound(&params.limit) {
        Some(None) => DEFAULT_LIMIT,
        Some(Some(l)) if (1..=MAX_LIMIT).contains(&l) => l,
        _ => {
            errors.push(FieldError::new("limit", "Limit must be between 1 and 50"));
            DEFAULT_LIMIT
        }
    };

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let filter = BookFilter {
        owner: scope_to_owner,
        search: params.search.clone().filter(|s| !s.is_empty()),
        genre: params.genre.clone().filter(|g| !g.is_empty()),
    };

    let (sort, rating_sort) = match params.sort_by.as_deref() {
        Some("oldest") => (BookSort::CreatedAsc, None),
        Some("year-desc") => (BookSort::YearDesc, None),
        Some("year-asc") => (BookSort::YearAsc, None),
        Some("title-asc") => (BookSort::TitleAsc, None),
        Some("title-desc") => (BookSort::TitleDesc, None),
        // Rating is derived post-fetch; fetch newest-first and re-sort the
        // enriched page in memory.
        Some("rating-desc") => (BookSort::CreatedDesc, Some(RatingSort::Desc)),
        Some("rating-asc") => (BookSort::CreatedDesc, Some(RatingSort::Asc)),
        // "newest", unknown values, and absence all mean the default order.
        _ => (BookSort::CreatedDesc, None),
    };

    // A huge page number would overflow the skip window; reject it with the
    // same field detail as any other out-of-range page.
    let skip = (page - 1)
        .checked_mul(limit)
        .and_then(|skip| usize::try_from(skip).ok())
        .ok_or_else(|| ApiError::invalid_field("page", "Page is out of range"))?;

    Ok(ListPlan {
        query: BookQuery {
            filter,
            sort,
            skip,
            limit: limit as usize,
        },
        page,
        limit,
        rating_sort,
    })
}

/// `Some(None)` means absent, `Some(Some(n))` a parsed value, and `None` a
/// present but non-numeric parameter.
fn parse_bound(raw: &Option<String>) -> Option<Option<u64>> {
    match raw {
        None => Some(None),
        Some(s) => s.trim().parse::<u64>().ok().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_absent() {
        let plan = build_plan(&ListParams::default(), None).unwrap();
        assert_eq!(plan.page, 1);
        assert_eq!(plan.limit, 5);
        assert_eq!(plan.query.skip, 0);
        assert_eq!(plan.query.sort, BookSort::CreatedDesc);
        assert!(plan.rating_sort.is_none());
    }

    #[test]
    fn skip_is_page_minus_one_times_limit() {
        let params = ListParams {
            page: Some("4".to_string()),
            limit: Some("10".to_string()),
            ..Default::default()
        };
        let plan = build_plan(&params, None).unwrap();
        assert_eq!(plan.query.skip, 30);
        assert_eq!(plan.query.limit, 10);
    }

    #[test]
    fn zero_page_is_rejected_not_clamped() {
        let params = ListParams {
            page: Some("0".to_string()),
            ..Default::default()
        };
        let err = build_plan(&params, None).unwrap_err();
        match err {
            ApiError::Validation { errors } => {
                assert_eq!(errors[0].field, "page");
            }
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn limit_over_50_is_rejected() {
        let params = ListParams {
            limit: Some("51".to_string()),
            ..Default::default()
        };
        assert!(build_plan(&params, None).is_err());
    }

    #[test]
    fn both_violations_are_reported_together() {
        let params = ListParams {
            page: Some("-1".to_string()),
            limit: Some("0".to_string()),
            ..Default::default()
        };
        let err = build_plan(&params, None).unwrap_err();
        match err {
            ApiError::Validation { errors } => {
                assert_eq!(errors.len(), 2);
            }
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn non_numeric_page_is_rejected_with_field_detail() {
        let params = ListParams {
            page: Some("abc".to_string()),
            ..Default::default()
        };
        let err = build_plan(&params, None).unwrap_err();
        match err {
            ApiError::Validation { errors } => {
                assert_eq!(errors[0].field, "page");
                assert_eq!(errors[0].message, "Page must be a positive integer");
            }
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn non_numeric_limit_is_rejected_with_field_detail() {
        let params = ListParams {
            limit: Some("lots".to_string()),
            ..Default::default()
        };
        let err = build_plan(&params, None).unwrap_err();
        match err {
            ApiError::Validation { errors } => {
                assert_eq!(errors[0].field, "limit");
            }
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn page_overflowing_the_skip_window_is_rejected() {
        let params = ListParams {
            page: Some(i64::MAX.to_string()),
            limit: Some("50".to_string()),
            ..Default::default()
        };
        let err = build_plan(&params, None).unwrap_err();
        match err {
            ApiError::Validation { errors } => {
                assert_eq!(errors[0].field, "page");
            }
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn rating_sort_falls_back_to_newest_and_flags_resort() {
        let params = ListParams {
            sort_by: Some("rating-desc".to_string()),
            ..Default::default()
        };
        let plan = build_plan(&params, None).unwrap();
        assert_eq!(plan.query.sort, BookSort::CreatedDesc);
        assert_eq!(plan.rating_sort, Some(RatingSort::Desc));
    }

    #[test]
    fn sort_names_map_to_store_orders() {
        let cases = [
            ("oldest", BookSort::CreatedAsc),
            ("year-desc", BookSort::YearDesc),
            ("year-asc", BookSort::YearAsc),
            ("title-asc", BookSort::TitleAsc),
            ("title-desc", BookSort::TitleDesc),
            ("newest", BookSort::CreatedDesc),
            ("unknown", BookSort::CreatedDesc),
        ];
        for (name, expected) in cases {
            let params = ListParams {
                sort_by: Some(name.to_string()),
                ..Default::default()
            };
            let plan = build_plan(&params, None).unwrap();
            assert_eq!(plan.query.sort, expected, "sortBy={name}");
        }
    }

    #[test]
    fn owner_scope_lands_in_the_filter() {
        let owner = Uuid::now_v7();
        let plan = build_plan(&ListParams::default(), Some(owner)).unwrap();
        assert_eq!(plan.query.filter.owner, Some(owner));
    }

    #[test]
    fn empty_search_and_genre_are_ignored() {
        let params = ListParams {
            search: Some(String::new()),
            genre: Some(String::new()),
            ..Default::default()
        };
        let plan = build_plan(&params, None).unwrap();
        assert!(plan.query.filter.search.is_none());
        assert!(plan.query.filter.genre.is_none());
    }
}
