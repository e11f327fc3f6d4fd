//! Predicate over the catalog used for the displayed book list

use super::Book;

/// Criteria for the displayed book list. Every non-empty criterion must
/// match; within one criterion any keyword may match. The default filter
/// shows every book.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookFilter {
    pub title_keywords: Vec<String>,
    pub author_keywords: Vec<String>,
    pub genres: Vec<String>,
    pub on_loan: Option<bool>,
}

impl BookFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_all(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, book: &Book) -> bool {
        contains_any_word(&book.title, &self.title_keywords)
            && contains_any_word(&book.author, &self.author_keywords)
            && (self.genres.is_empty()
                || self.genres.iter().any(|genre| book.genres.contains(&genre.to_uppercase())))
            && self.on_loan.map_or(true, |on_loan| book.is_on_loan() == on_loan)
    }
}

/// Whole-word, case-insensitive keyword match
fn contains_any_word(text: &str, keywords: &[String]) -> bool {
    keywords.is_empty()
        || text
            .split_whitespace()
            .any(|word| keywords.iter().any(|keyword| word.eq_ignore_ascii_case(keyword)))
}
