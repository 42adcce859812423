//! Demo data for local development: two users, a small catalog, and a few
//! reviews so listings, rating sorts, and the detail page have something to
//! show.

use anyhow::Context;
use bookden_store::{MemoryStore, NewBook, NewReview, NewUser};

const DEMO_PASSWORD: &str = "read-more-books";

pub async fn load_demo_data(store: &MemoryStore) -> anyhow::Result<()> {
    let password_hash =
        bcrypt::hash(DEMO_PASSWORD, bcrypt::DEFAULT_COST).context("failed to hash demo password")?;

    let ada = store
        .create_user(NewUser {
            name: "Ada".to_string(),
            email: "ada@bookden.example".to_string(),
            password_hash: password_hash.clone(),
        })
        .await
        .context("demo user already present")?;
    let basil = store
        .create_user(NewUser {
            name: "Basil".to_string(),
            email: "basil@bookden.example".to_string(),
            password_hash,
        })
        .await
        .context("demo user already present")?;

    let catalog = [
        ("Dune", "Frank Herbert", "Sci-Fi", 1965, ada.id),
        ("Foundation", "Isaac Asimov", "Sci-Fi", 1951, ada.id),
        ("The Left Hand of Darkness", "Ursula K. Le Guin", "Sci-Fi", 1969, basil.id),
        ("The Name of the Rose", "Umberto Eco", "Mystery", 1980, basil.id),
        ("Pride and Prejudice", "Jane Austen", "Classic", 1813, ada.id),
    ];

    let mut book_ids = Vec::new();
    for (title, author, genre, year, owner) in catalog {
        let book = store
            .create_book(NewBook {
                title: title.to_string(),
                author: author.to_string(),
                description: format!("{title} by {author}"),
                genre: genre.to_string(),
                published_year: year,
                added_by: owner,
            })
            .await;
        book_ids.push(book.id);
    }

    // Cross-reviews: each demo user reviews a book the other added.
    store
        .create_review(NewReview {
            book_id: book_ids[0],
            user_id: basil.id,
            rating: 5,
            review_text: "The spice must flow.".to_string(),
        })
        .await;
    store
        .create_review(NewReview {
            book_id: book_ids[2],
            user_id: ada.id,
            rating: 4,
            review_text: "Genly Ai's journey stays with you.".to_string(),
        })
        .await;

    tracing::info!(
        users = 2,
        books = book_ids.len(),
        reviews = 2,
        "demo data loaded"
    );
    Ok(())
}
