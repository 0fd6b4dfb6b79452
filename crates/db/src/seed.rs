//! Sample data for a fresh store.

use time::OffsetDateTime;

use crate::error::StoreResult;
use crate::models::{Book, BookStatus, Role, User};
use crate::store::Store;

pub const SAMPLE_OWNER_EMAIL: &str = "owner@example.com";
pub const SAMPLE_SEEKER_EMAIL: &str = "seeker@example.com";
pub const SAMPLE_PASSWORD: &str = "password123";

/// (title, author, genre, description, city, cover)
const SAMPLE_BOOKS: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("The Great Gatsby", "F. Scott Fitzgerald", "fiction", "A novel set in the 1920s about the American dream.", "New York", "https://covers.openlibrary.org/b/id/8226191-L.jpg"),
    ("To Kill a Mockingbird", "Harper Lee", "fiction", "A novel about racial injustice in the Deep South.", "Chicago", "https://covers.openlibrary.org/b/id/8225269-L.jpg"),
    ("1984", "George Orwell", "sci-fi", "A dystopian novel set in a totalitarian society.", "London", "https://covers.openlibrary.org/b/id/7222246-L.jpg"),
    ("The Hobbit", "J.R.R. Tolkien", "fantasy", "A fantasy novel about the journey of a hobbit.", "Bristol", "https://covers.openlibrary.org/b/id/6979861-L.jpg"),
    ("Steve Jobs", "Walter Isaacson", "biography", "A biography of the visionary founder of Apple.", "San Francisco", "https://covers.openlibrary.org/b/id/7444201-L.jpg"),
    ("Sapiens", "Yuval Noah Harari", "history", "A brief history of humankind.", "Tel Aviv", "https://covers.openlibrary.org/b/id/8370082-L.jpg"),
    ("The Power of Now", "Eckhart Tolle", "self-help", "A guide to spiritual enlightenment.", "Berlin", "https://covers.openlibrary.org/b/id/6979680-L.jpg"),
    ("The Da Vinci Code", "Dan Brown", "mystery", "A thrilling mystery novel involving secret societies.", "Paris", "https://covers.openlibrary.org/b/id/7884866-L.jpg"),
    ("Atomic Habits", "James Clear", "self-help", "An easy and proven way to build good habits.", "Los Angeles", "https://covers.openlibrary.org/b/id/10521959-L.jpg"),
    ("Educated", "Tara Westover", "biography", "A memoir about growing up in a survivalist family.", "Denver", "https://covers.openlibrary.org/b/id/9354897-L.jpg"),
    ("Dune", "Frank Herbert", "sci-fi", "A science fiction epic set on a desert planet.", "Las Vegas", "https://covers.openlibrary.org/b/id/8100928-L.jpg"),
    ("The Catcher in the Rye", "J.D. Salinger", "fiction", "A novel about teenage alienation.", "Boston", "https://covers.openlibrary.org/b/id/8221420-L.jpg"),
    ("Thinking, Fast and Slow", "Daniel Kahneman", "non-fiction", "A groundbreaking tour of the mind.", "New Delhi", "https://covers.openlibrary.org/b/id/7235233-L.jpg"),
    ("Becoming", "Michelle Obama", "biography", "A memoir by the former First Lady of the United States.", "Washington, D.C.", "https://covers.openlibrary.org/b/id/9354031-L.jpg"),
    ("The Alchemist", "Paulo Coelho", "fiction", "A journey of self-discovery and personal legend.", "Madrid", "https://covers.openlibrary.org/b/id/8114151-L.jpg"),
    ("The Subtle Art of Not Giving a F*ck", "Mark Manson", "self-help", "A counterintuitive approach to living a good life.", "Austin", "https://covers.openlibrary.org/b/id/8401307-L.jpg"),
];

/// What [`seed_sample_data`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub books: usize,
}

/// Insert sample users when there are none, and sample books owned by the
/// sample owner when there are no books.
pub async fn seed_sample_data(store: &Store) -> StoreResult<SeedReport> {
    let report = store
        .write(|c| {
            let mut report = SeedReport::default();

            if c.users.is_empty() {
                c.users.insert(sample_user("John Owner", SAMPLE_OWNER_EMAIL, "1234567890", Role::Owner))?;
                c.users.insert(sample_user("Jane Seeker", SAMPLE_SEEKER_EMAIL, "0987654321", Role::Seeker))?;
                report.users = 2;
            }

            if c.books.is_empty() {
                let owner_id = c
                    .users
                    .find_one(|u| u.email == SAMPLE_OWNER_EMAIL)
                    .map(|u| u.id);
                if let Some(owner_id) = owner_id {
                    let now = OffsetDateTime::now_utc();
                    for &(title, author, genre, description, city, cover) in SAMPLE_BOOKS {
                        c.books.insert(Book {
                            id: 0,
                            title: title.to_string(),
                            author: author.to_string(),
                            genre: genre.to_string(),
                            city: city.to_string(),
                            contact: SAMPLE_OWNER_EMAIL.to_string(),
                            description: description.to_string(),
                            owner_id,
                            status: BookStatus::Available,
                            cover_image: Some(cover.to_string()),
                            created_at: now,
                        })?;
                    }
                    report.books = SAMPLE_BOOKS.len();
                }
            }

            Ok::<_, crate::StoreError>(report)
        })
        .await?;

    if report.users > 0 {
        tracing::info!(count = report.users, "sample users created");
    }
    if report.books > 0 {
        tracing::info!(count = report.books, "sample books created");
    }
    Ok(report)
}

fn sample_user(name: &str, email: &str, mobile: &str, role: Role) -> User {
    User {
        id: 0,
        name: name.to_string(),
        email: email.to_string(),
        password: SAMPLE_PASSWORD.to_string(),
        mobile: mobile.to_string(),
        role,
    }
}
