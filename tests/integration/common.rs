//! Typical library fixtures shared by the integration tests

use chrono::NaiveDate;

use shelfkeeper::{
    clock::Clock,
    models::{Book, Borrower, BorrowerId, NewBorrower, SerialNumber},
    repository::{BorrowerRecords, Catalog, LoanRecords},
    services::model::Model,
};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 7).unwrap()
}

pub fn sn(value: &str) -> SerialNumber {
    SerialNumber::new(value).unwrap()
}

pub fn borrower_id(value: &str) -> BorrowerId {
    BorrowerId::new(value).unwrap()
}

fn book(serial_number: &str, title: &str, author: &str, genres: &[&str]) -> Book {
    Book::new(sn(serial_number), title, author, genres.iter().map(|g| g.to_string())).unwrap()
}

pub fn typical_books() -> Vec<Book> {
    vec![
        book("B0001", "Harry Botter", "J K Rowling", &["Fiction"]),
        book("B0002", "Legend of the Condor Heroes", "Jin Yong", &["Fiction", "Action"]),
        book("B0003", "Animal the Farm", "George Orwell", &[]),
        book("B0004", "Harri Botter and the Full Blood Prince", "J K Rowling", &["Fiction", "Action"]),
    ]
}

pub fn typical_borrowers() -> Vec<Borrower> {
    let details = [
        ("A0001", "Alex Yeoh", "87438807", "alexyeoh@example.com"),
        ("A0002", "Bernice Yu", "99272758", "berniceyu@example.com"),
    ];
    details
        .iter()
        .map(|(id, name, phone, email)| {
            let details = NewBorrower { name: name.to_string(), phone: phone.to_string(), email: email.to_string() };
            Borrower::new(borrower_id(id), &details).unwrap()
        })
        .collect()
}

/// Typical catalog and borrowers, no loans, dated `today()`
pub fn typical_model() -> Model {
    Model::new(
        Catalog::from_books(typical_books()).unwrap(),
        LoanRecords::new(),
        BorrowerRecords::from_borrowers(typical_borrowers()).unwrap(),
        Default::default(),
    )
    .with_clock(Clock::Fixed(today()))
}
