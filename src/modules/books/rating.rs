//! Derived rating attributes for books.
//!
//! Always computed fresh from the current reviews; nothing is cached across
//! requests. The rating re-sort operates only on the page it is given. The
//! store has already paginated, so a rating sort never reaches beyond the
//! current page.

use std::cmp::Ordering;

use super::models::BookResponse;
use super::query::RatingSort;

/// Mean rating rounded half-up to one decimal: multiply by 10, round to the
/// nearest integer, divide by 10. Zero when there are no reviews.
pub fn average_rating(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
    let mean = f64::from(sum) / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Re-sort an already-enriched page by average rating. The sort is stable,
/// so ties keep their fetched order.
pub fn sort_page_by_rating(books: &mut [BookResponse], direction: RatingSort) {
    books.sort_by(|a, b| {
        let ordering = a
            .average_rating
            .partial_cmp(&b.average_rating)
            .unwrap_or(Ordering::Equal);
        match direction {
            RatingSort::Asc => ordering,
            RatingSort::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn response(title: &str, average_rating: f64) -> BookResponse {
        BookResponse {
            id: Uuid::now_v7(),
            title: title.to_string(),
            author: "Author".to_string(),
            description: "desc".to_string(),
            genre: "Sci-Fi".to_string(),
            published_year: 2000,
            added_by: None,
            created_at: OffsetDateTime::now_utc(),
            average_rating,
            review_count: 1,
        }
    }

    #[test]
    fn no_reviews_means_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn five_four_four_rounds_to_4_3() {
        // mean 4.333... -> 4.3
        assert_eq!(average_rating(&[5, 4, 4]), 4.3);
    }

    #[test]
    fn rounding_is_half_up_at_one_decimal() {
        // mean 4.666... -> 4.7
        assert_eq!(average_rating(&[5, 5, 4]), 4.7);
        // mean 4.5 stays 4.5; one decimal digit is exact
        assert_eq!(average_rating(&[4, 5]), 4.5);
        // mean 3.25 -> 3.3 (half-up at the single decimal digit)
        assert_eq!(average_rating(&[3, 3, 3, 4]), 3.3);
    }

    #[test]
    fn average_is_always_within_rating_bounds() {
        assert_eq!(average_rating(&[1, 1, 1]), 1.0);
        assert_eq!(average_rating(&[5, 5, 5]), 5.0);
    }

    #[test]
    fn page_resorts_descending_by_rating() {
        let mut page = vec![
            response("low", 2.0),
            response("high", 4.8),
            response("mid", 3.3),
        ];
        sort_page_by_rating(&mut page, RatingSort::Desc);
        let titles: Vec<&str> = page.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "mid", "low"]);
    }

    #[test]
    fn page_resorts_ascending_by_rating() {
        let mut page = vec![response("high", 4.8), response("low", 2.0)];
        sort_page_by_rating(&mut page, RatingSort::Asc);
        assert_eq!(page[0].title, "low");
    }
}
