//! Payload checks shared by the auth, books and users modules.
//!
//! Every validator returns the full list of human-readable problems; an empty
//! list means the payload is acceptable.

use once_cell::sync::Lazy;
use regex::Regex;

use bookshare_db::Role;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));
static MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("mobile pattern is valid"));

pub const MIN_PASSWORD_CHARS: usize = 6;

/// Registration fields as submitted. `None` means the field was absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserFields<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub mobile: Option<&'a str>,
    pub role: Option<&'a str>,
}

/// Listing fields that must be present on creation.
#[derive(Debug, Default, Clone, Copy)]
pub struct BookFields<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub city: Option<&'a str>,
    pub contact: Option<&'a str>,
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

pub fn validate_user(user: &UserFields<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    if is_blank(user.name) {
        errors.push("Name is required".to_string());
    }

    if !user.email.is_some_and(|email| EMAIL_RE.is_match(email)) {
        errors.push("Valid email is required".to_string());
    }

    if !user
        .password
        .is_some_and(|password| password.chars().count() >= MIN_PASSWORD_CHARS)
    {
        errors.push("Password must be at least 6 characters".to_string());
    }

    if !user.mobile.is_some_and(|mobile| MOBILE_RE.is_match(mobile)) {
        errors.push("Valid 10-digit mobile number is required".to_string());
    }

    if !user.role.is_some_and(|role| role.parse::<Role>().is_ok()) {
        errors.push(r#"Role must be either "owner" or "seeker""#.to_string());
    }

    errors
}

pub fn validate_book(book: &BookFields<'_>) -> Vec<String> {
    let checks = [
        (book.title, "Title is required"),
        (book.author, "Author is required"),
        (book.city, "City/Location is required"),
        (book.contact, "Contact information is required"),
    ];

    checks
        .into_iter()
        .filter(|(value, _)| is_blank(*value))
        .map(|(_, message)| message.to_string())
        .collect()
}

pub fn validate_request(title: Option<&str>) -> Vec<String> {
    if is_blank(title) {
        vec!["Title is required".to_string()]
    } else {
        Vec::new()
    }
}
