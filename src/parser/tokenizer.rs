//! Splits command arguments into a preamble and prefixed values
//!
//! `t/Harry Botter a/J K Rowling g/Fiction g/Magic` yields an empty preamble,
//! one title, one author and two genres.

use std::collections::HashMap;

use crate::error::{AppError, AppResult};

pub const PREFIX_TITLE: &str = "t/";
pub const PREFIX_AUTHOR: &str = "a/";
pub const PREFIX_GENRE: &str = "g/";
pub const PREFIX_SERIAL_NUMBER: &str = "sn/";
pub const PREFIX_BORROWER_ID: &str = "id/";
pub const PREFIX_NAME: &str = "n/";
pub const PREFIX_PHONE: &str = "p/";
pub const PREFIX_EMAIL: &str = "e/";
pub const PREFIX_LOAN_STATUS: &str = "l/";
pub const PREFIX_LOAN_PERIOD: &str = "lp/";
pub const PREFIX_RENEW_PERIOD: &str = "rp/";
pub const PREFIX_FINE_INCREMENT: &str = "fi/";
pub const PREFIX_MAX_RENEWS: &str = "mr/";

/// Tokenized arguments of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMap {
    preamble: String,
    values: HashMap<&'static str, Vec<String>>,
}

impl ArgumentMap {
    /// Tokenize `args`, recognising only the given prefixes. A prefix must
    /// start a whitespace-separated word.
    pub fn tokenize(args: &str, prefixes: &[&'static str]) -> Self {
        let mut map = Self::default();
        let mut current: Option<&'static str> = None;
        let mut words: Vec<&str> = Vec::new();

        for word in args.split_whitespace() {
            match prefixes.iter().find(|prefix| word.starts_with(**prefix)) {
                Some(prefix) => {
                    map.push(current, &words);
                    current = Some(*prefix);
                    words.clear();
                    let rest = &word[prefix.len()..];
                    if !rest.is_empty() {
                        words.push(rest);
                    }
                }
                None => words.push(word),
            }
        }
        map.push(current, &words);
        map
    }

    fn push(&mut self, prefix: Option<&'static str>, words: &[&str]) {
        let value = words.join(" ");
        match prefix {
            Some(prefix) => self.values.entry(prefix).or_default().push(value),
            None => self.preamble = value,
        }
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn has(&self, prefix: &str) -> bool {
        self.values.contains_key(prefix)
    }

    /// Last value given for `prefix`
    pub fn value(&self, prefix: &str) -> Option<&str> {
        self.values.get(prefix).and_then(|values| values.last()).map(String::as_str)
    }

    /// Every value given for `prefix`, in order
    pub fn all_values(&self, prefix: &str) -> &[String] {
        self.values.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fail unless each prefix was given at most once
    pub fn verify_no_duplicates(&self, prefixes: &[&str]) -> AppResult<()> {
        let duplicated: Vec<&str> = prefixes
            .iter()
            .copied()
            .filter(|prefix| self.all_values(prefix).len() > 1)
            .collect();
        if duplicated.is_empty() {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!(
                "Multiple values specified for the following single-valued field(s): {}",
                duplicated.join(" ")
            )))
        }
    }
}
