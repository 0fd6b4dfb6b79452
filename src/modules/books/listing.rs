//! Filtering, facets and offset pagination over a set of listings.

use bookshare_db::Book;

use super::models::{BookPage, BookQuery};

pub const DEFAULT_PAGE: usize = 0;
pub const DEFAULT_LIMIT: usize = 8;
pub const RECENT_LIMIT: usize = 4;

/// Case-insensitive substring filters; all present filters must match.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BookFilter {
    title: Option<String>,
    city: Option<String>,
    genre: Option<String>,
    status: Option<String>,
}

fn needle(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_lowercase)
}

fn contains(haystack: &str, needle: &Option<String>) -> bool {
    needle
        .as_deref()
        .map_or(true, |n| haystack.to_lowercase().contains(n))
}

impl BookFilter {
    pub fn from_query(query: &BookQuery) -> Self {
        Self {
            title: needle(query.title.as_deref()),
            city: needle(query.city.as_deref()),
            genre: needle(query.genre.as_deref()),
            status: needle(query.status.as_deref()),
        }
    }

    /// `title` matches against the title or the author.
    pub fn matches(&self, book: &Book) -> bool {
        let title_or_author = self.title.as_deref().map_or(true, |n| {
            book.title.to_lowercase().contains(n) || book.author.to_lowercase().contains(n)
        });

        title_or_author
            && contains(&book.city, &self.city)
            && contains(&book.genre, &self.genre)
            && contains(book.status.as_str(), &self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn parse_or(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl PageRequest {
    pub fn from_query(query: &BookQuery) -> Self {
        Self {
            page: parse_or(query.page.as_deref(), DEFAULT_PAGE),
            limit: parse_or(query.limit.as_deref(), DEFAULT_LIMIT),
        }
    }

    fn start(&self) -> usize {
        self.page.saturating_mul(self.limit)
    }

    fn end(&self) -> usize {
        self.start().saturating_add(self.limit)
    }
}

/// Distinct non-empty values of `field`, in first-seen order.
pub fn facet_values<'a, F>(books: &'a [Book], field: F) -> Vec<String>
where
    F: Fn(&'a Book) -> &'a str,
{
    let mut values: Vec<String> = Vec::new();
    for value in books.iter().map(field) {
        if !value.is_empty() && !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    values
}

/// Filter `books`, slice out the requested page and compute facets over the
/// unfiltered input.
pub fn paginate(books: &[Book], filter: &BookFilter, page: PageRequest) -> BookPage {
    let matched: Vec<&Book> = books.iter().filter(|b| filter.matches(b)).collect();
    let total = matched.len();

    BookPage {
        success: true,
        books: matched
            .into_iter()
            .skip(page.start())
            .take(page.limit)
            .cloned()
            .collect(),
        cities: facet_values(books, |b| b.city.as_str()),
        genres: facet_values(books, |b| b.genre.as_str()),
        total,
        page: page.page,
        limit: page.limit,
        has_more: page.end() < total,
    }
}

/// The `n` most recently created listings, newest first.
pub fn most_recent(books: &[Book], n: usize) -> Vec<Book> {
    let mut sorted: Vec<&Book> = books.iter().collect();
    sorted.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    sorted.into_iter().take(n).cloned().collect()
}
