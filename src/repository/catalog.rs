//! Catalog: every book in the library, unique by serial number

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{LoanRecords, Record, RecordSet};
use crate::{
    error::AppResult,
    models::{Book, SerialNumber},
};

impl Record for Book {
    type Id = SerialNumber;
    const NAME: &'static str = "book";

    fn id(&self) -> &SerialNumber {
        &self.serial_number
    }

    fn is_duplicate_of(&self, other: &Self) -> bool {
        self.is_same_book(other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    books: RecordSet<Book>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_books(books: impl IntoIterator<Item = Book>) -> AppResult<Self> {
        Ok(Self { books: RecordSet::from_records(books)? })
    }

    pub fn has_book(&self, book: &Book) -> bool {
        self.books.contains(book)
    }

    pub fn has_serial_number(&self, serial_number: &SerialNumber) -> bool {
        self.books.contains_id(serial_number)
    }

    pub fn book(&self, serial_number: &SerialNumber) -> Option<&Book> {
        self.books.get(serial_number)
    }

    pub fn add_book(&mut self, book: Book) -> AppResult<()> {
        self.books.add(book)
    }

    pub fn remove_book(&mut self, serial_number: &SerialNumber) -> AppResult<Book> {
        self.books.remove(serial_number)
    }

    pub fn set_book(&mut self, serial_number: &SerialNumber, book: Book) -> AppResult<Book> {
        self.books.replace(serial_number, book)
    }

    pub fn reset_data(&mut self, other: &Catalog) {
        self.books.reset(&other.books);
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn next_serial_number(&self) -> AppResult<SerialNumber> {
        self.books.next_id()
    }

    /// Books whose active loan was due strictly before `today`
    pub fn overdue_books<'a>(&'a self, loans: &'a LoanRecords, today: NaiveDate) -> Vec<&'a Book> {
        self.books()
            .filter(|book| {
                book.loan
                    .as_ref()
                    .and_then(|loan_id| loans.loan(loan_id))
                    .is_some_and(|loan| loan.is_overdue(today))
            })
            .collect()
    }
}
