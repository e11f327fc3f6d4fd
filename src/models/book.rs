//! Book (catalog entry) model and related types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ids::{LoanId, SerialNumber};
use crate::error::{AppError, AppResult};

/// A book in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub serial_number: SerialNumber,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    /// Present iff the book is currently on loan
    #[serde(default)]
    pub loan: Option<LoanId>,
}

impl Book {
    /// Build a book that is not on loan, validating its descriptive fields
    pub fn new(
        serial_number: SerialNumber,
        title: &str,
        author: &str,
        genres: impl IntoIterator<Item = String>,
    ) -> AppResult<Self> {
        Ok(Self {
            serial_number,
            title: validate_text("Title", title)?,
            author: validate_text("Author", author)?,
            genres: normalize_genres(genres)?,
            loan: None,
        })
    }

    pub fn is_on_loan(&self) -> bool {
        self.loan.is_some()
    }

    /// Copy of this book marked as lent out under `loan_id`
    pub fn lent(&self, loan_id: LoanId) -> Self {
        Self { loan: Some(loan_id), ..self.clone() }
    }

    /// Copy of this book marked as back on the shelf
    pub fn returned(&self) -> Self {
        Self { loan: None, ..self.clone() }
    }

    /// Weaker notion of equality used for duplicate detection: two entries
    /// describing the same work, whatever their serial numbers.
    pub fn is_same_book(&self, other: &Book) -> bool {
        self.title.eq_ignore_ascii_case(&other.title)
            && self.author.eq_ignore_ascii_case(&other.author)
            && self.genres == other.genres
    }

    /// Apply the given changes, keeping serial number and loan state
    pub fn edited(&self, changes: &EditBook) -> AppResult<Self> {
        let mut book = self.clone();
        if let Some(title) = &changes.title {
            book.title = validate_text("Title", title)?;
        }
        if let Some(author) = &changes.author {
            book.author = validate_text("Author", author)?;
        }
        if let Some(genres) = &changes.genres {
            book.genres = normalize_genres(genres.iter().cloned())?;
        }
        Ok(book)
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} by {}", self.serial_number, self.title, self.author)?;
        if !self.genres.is_empty() {
            let genres: Vec<&str> = self.genres.iter().map(String::as_str).collect();
            write!(f, " [{}]", genres.join(", "))?;
        }
        if let Some(loan) = &self.loan {
            write!(f, " (on loan: {})", loan)?;
        }
        Ok(())
    }
}

/// Descriptive fields of a book to be added; the serial number is generated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genres: Vec<String>,
}

/// Fields to replace on an existing book
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genres: Option<Vec<String>>,
}

impl EditBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.genres.is_none()
    }
}

fn validate_text(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} should not be blank", field)));
    }
    Ok(value.to_string())
}

/// Genres are single alphanumeric words, stored upper-case
fn normalize_genres(genres: impl IntoIterator<Item = String>) -> AppResult<BTreeSet<String>> {
    genres
        .into_iter()
        .map(|genre| {
            let genre = genre.trim();
            if genre.is_empty() || !genre.chars().all(char::is_alphanumeric) {
                Err(AppError::Validation(format!(
                    "Genre \"{}\" should be a single alphanumeric word",
                    genre
                )))
            } else {
                Ok(genre.to_uppercase())
            }
        })
        .collect()
}
