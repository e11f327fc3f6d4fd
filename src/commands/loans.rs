//! Circulation commands run while serving a borrower: loan, return, renew

use super::{resolve_displayed, BookTarget, Command, Executed};
use crate::{
    error::{AppError, AppResult},
    models::{loan::add_days, Book, Borrower, Loan, LoanId},
    services::model::Model,
};

pub const MESSAGE_BOOK_ON_LOAN: &str = "This book is already on loan";
pub const MESSAGE_NOT_BORROWED: &str = "This book is not on loan to the borrower being served";

pub(super) fn lend(model: &mut Model, target: &BookTarget) -> AppResult<Executed> {
    let borrower = model.require_serving()?.clone();
    let book = resolve_displayed(model, target)?;
    if book.is_on_loan() {
        return Err(AppError::InvalidState(MESSAGE_BOOK_ON_LOAN.to_string()));
    }
    let today = model.today();
    let due_date = add_days(today, model.user_settings().loan_period_days)?;
    let loan = Loan::new(model.next_loan_id()?, book.serial_number.clone(), borrower.id.clone(), today, due_date)?;
    model.record_loan(loan.clone())?;
    tracing::info!("Loan {} recorded", loan);

    Ok(Executed::recorded(
        format!("Book {} loaned to {}, due on {}", book.title, borrower.name, due_date),
        Command::RevokeLoan(loan.id.clone()),
        Command::RestoreLoan(loan),
    ))
}

/// Resolve a book lent to the served borrower, by its position in the
/// borrower's own list or by serial number
fn resolve_borrowed(model: &Model, borrower: &Borrower, target: &BookTarget) -> AppResult<(Book, Loan)> {
    let book = match target {
        BookTarget::Index(index) => index
            .checked_sub(1)
            .and_then(|i| model.serving_borrower_books().get(i).map(|book| (*book).clone()))
            .ok_or_else(|| AppError::NotFound(format!("The borrower has no book at index {}", index)))?,
        BookTarget::SerialNumber(sn) => model.book(sn)?.clone(),
    };
    let loan = match &book.loan {
        Some(loan_id) if borrower.has_loan(loan_id) => model.loan(loan_id)?.clone(),
        _ => return Err(AppError::InvalidState(MESSAGE_NOT_BORROWED.to_string())),
    };
    Ok((book, loan))
}

pub(super) fn return_book(model: &mut Model, target: &BookTarget) -> AppResult<Executed> {
    let borrower = model.require_serving()?.clone();
    let (book, loan) = resolve_borrowed(model, &borrower, target)?;
    let today = model.today();
    let fine = loan.accrued_fine(today, model.user_settings().fine_increment)?;
    let returned = loan.returned(today, fine)?;
    model.close_loan(returned.clone())?;
    tracing::info!("Loan {} returned with fine {}", loan.id, fine);

    let feedback = if fine.is_zero() {
        format!("Book {} returned by {}", book.title, borrower.name)
    } else {
        format!("Book {} returned by {} {} days late, fine charged: ${}", book.title, borrower.name, loan.days_overdue(today), fine)
    };
    Ok(Executed::recorded(feedback, Command::Unreturn { loan, borrower }, Command::CloseLoan(returned)))
}

pub(super) fn renew(model: &mut Model, target: &BookTarget) -> AppResult<Executed> {
    let borrower = model.require_serving()?.clone();
    let (book, loan) = resolve_borrowed(model, &borrower, target)?;
    if loan.is_overdue(model.today()) {
        return Err(AppError::InvalidState(format!(
            "Book {} is overdue and must be returned instead of renewed",
            book.title
        )));
    }
    let settings = model.user_settings();
    if loan.renew_count >= settings.max_renews {
        return Err(AppError::InvalidState(format!(
            "Book {} has already been renewed the maximum of {} times",
            book.title, settings.max_renews
        )));
    }
    let renewed = loan.renewed(settings.renew_period_days)?;
    model.set_loan(&loan.id, renewed.clone())?;
    tracing::info!("Loan {} renewed until {}", loan.id, renewed.due_date);

    Ok(Executed::recorded(
        format!("Book {} renewed, now due on {}", book.title, renewed.due_date),
        Command::SetLoan(loan),
        Command::SetLoan(renewed),
    ))
}

pub(super) fn restore(model: &mut Model, loan: &Loan) -> AppResult<Executed> {
    model.record_loan(loan.clone())?;
    Ok(Executed::recorded(
        format!("Loan restored: {}", loan),
        Command::RevokeLoan(loan.id.clone()),
        Command::RestoreLoan(loan.clone()),
    ))
}

pub(super) fn revoke(model: &mut Model, loan_id: &LoanId) -> AppResult<Executed> {
    let loan = model.revoke_loan(loan_id)?;
    Ok(Executed::recorded(
        format!("Loan revoked: {}", loan),
        Command::RestoreLoan(loan),
        Command::RevokeLoan(loan_id.clone()),
    ))
}

pub(super) fn close(model: &mut Model, returned: &Loan) -> AppResult<Executed> {
    let borrower = model.borrower(&returned.borrower_id)?.clone();
    let active = model.close_loan(returned.clone())?;
    Ok(Executed::recorded(
        format!("Loan closed: {}", returned),
        Command::Unreturn { loan: active, borrower },
        Command::CloseLoan(returned.clone()),
    ))
}

pub(super) fn unreturn(model: &mut Model, loan: &Loan, borrower: &Borrower) -> AppResult<Executed> {
    let returned = model.loan(&loan.id)?.clone();
    model.reopen_loan(loan.clone(), borrower.clone())?;
    Ok(Executed::recorded(
        format!("Loan reopened: {}", loan),
        Command::CloseLoan(returned),
        Command::Unreturn { loan: loan.clone(), borrower: borrower.clone() },
    ))
}

/// Replace an active loan's dates and renew count
pub(super) fn set(model: &mut Model, loan: &Loan) -> AppResult<Executed> {
    let current = model.loan(&loan.id)?;
    if !current.is_active()
        || !loan.is_active()
        || current.serial_number != loan.serial_number
        || current.borrower_id != loan.borrower_id
    {
        return Err(AppError::InvalidState(format!("Loan {} changed since it was renewed", loan.id)));
    }
    let previous = model.set_loan(&loan.id, loan.clone())?;
    Ok(Executed::recorded(
        format!("Loan updated: {}", loan),
        Command::SetLoan(previous),
        Command::SetLoan(loan.clone()),
    ))
}
