//! Catalog commands: add, delete, edit, and their replays

use rust_decimal::Decimal;

use super::{resolve_displayed, BookTarget, Command, Executed};
use crate::{
    error::{AppError, AppResult},
    models::{Book, Borrower, EditBook, Loan, NewBook},
    services::model::Model,
};

pub const MESSAGE_DUPLICATE_BOOK: &str = "This book already exists in the catalog";

pub(super) fn add(model: &mut Model, new_book: &NewBook) -> AppResult<Executed> {
    let serial_number = model.next_serial_number()?;
    let book = Book::new(serial_number, &new_book.title, &new_book.author, new_book.genres.iter().cloned())?;
    if model.has_book(&book) {
        return Err(AppError::Duplicate(MESSAGE_DUPLICATE_BOOK.to_string()));
    }
    model.add_book(book.clone())?;
    tracing::info!("Added book {}", book.serial_number);
    Ok(Executed::recorded(
        format!("New book added: {}", book),
        Command::DeleteBook(BookTarget::SerialNumber(book.serial_number.clone())),
        Command::RestoreBook(book),
    ))
}

/// Delete a book. A book on loan is first returned today with the fine
/// waived; undoing brings back the on-loan book, its active loan and the
/// borrower record exactly as they were.
pub(super) fn delete(model: &mut Model, target: &BookTarget) -> AppResult<Executed> {
    let book = resolve_displayed(model, target)?;
    let serial_number = book.serial_number.clone();
    let redo = Command::DeleteBook(BookTarget::SerialNumber(serial_number.clone()));

    let undo = match &book.loan {
        Some(loan_id) => {
            let loan = model.loan(loan_id)?.clone();
            let borrower = model.borrower(&loan.borrower_id)?.clone();
            let returned = loan.returned(model.today(), Decimal::ZERO)?;
            model.close_loan(returned)?;
            tracing::info!("Loan {} closed with fine waived before deleting {}", loan.id, serial_number);
            Command::Undelete { book: book.clone(), loan, borrower }
        }
        None => Command::RestoreBook(book.clone()),
    };
    model.delete_book(&serial_number)?;
    tracing::info!("Deleted book {}", serial_number);

    Ok(Executed::recorded(format!("Deleted Book: {}", book), undo, redo))
}

pub(super) fn edit(model: &mut Model, target: &BookTarget, changes: &EditBook) -> AppResult<Executed> {
    if changes.is_empty() {
        return Err(AppError::BadRequest("At least one field to edit must be provided".to_string()));
    }
    let book = resolve_displayed(model, target)?;
    let edited = book.edited(changes)?;
    if model.exclude_book_being_replaced(&book).has_book(&edited) {
        return Err(AppError::Duplicate(MESSAGE_DUPLICATE_BOOK.to_string()));
    }
    model.set_book(&book.serial_number, edited.clone())?;
    Ok(Executed::recorded(
        format!("Edited Book: {}", edited),
        Command::SetBook(book),
        Command::SetBook(edited),
    ))
}

pub(super) fn restore(model: &mut Model, book: &Book) -> AppResult<Executed> {
    if book.is_on_loan() {
        return Err(AppError::InvalidState(format!(
            "Book {} is on loan and cannot be restored on its own",
            book.serial_number
        )));
    }
    model.add_book(book.clone())?;
    Ok(Executed::recorded(
        format!("Book restored: {}", book),
        Command::DeleteBook(BookTarget::SerialNumber(book.serial_number.clone())),
        Command::RestoreBook(book.clone()),
    ))
}

/// Replace a book's descriptive fields; its loan state must not change
pub(super) fn set(model: &mut Model, book: &Book) -> AppResult<Executed> {
    let current = model.book(&book.serial_number)?;
    if current.loan != book.loan {
        return Err(AppError::InvalidState(format!(
            "Loan state of book {} changed since it was edited",
            book.serial_number
        )));
    }
    let previous = model.set_book(&book.serial_number, book.clone())?;
    Ok(Executed::recorded(
        format!("Book reverted: {}", book),
        Command::SetBook(previous),
        Command::SetBook(book.clone()),
    ))
}

pub(super) fn undelete(model: &mut Model, book: &Book, loan: &Loan, borrower: &Borrower) -> AppResult<Executed> {
    model.restore_deleted_book(book.clone(), loan.clone(), borrower.clone())?;
    Ok(Executed::recorded(
        format!("Book restored: {}", book),
        Command::DeleteBook(BookTarget::SerialNumber(book.serial_number.clone())),
        Command::Undelete { book: book.clone(), loan: loan.clone(), borrower: borrower.clone() },
    ))
}
