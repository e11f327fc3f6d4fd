//! Borrower registry and serve mode commands

use rust_decimal::Decimal;

use super::{Command, Executed};
use crate::{
    error::{AppError, AppResult},
    models::{Borrower, BorrowerId, EditBorrower, NewBorrower},
    services::model::Model,
};

pub const MESSAGE_DUPLICATE_BORROWER: &str = "A borrower with the same phone number or email already exists";

pub(super) fn register(model: &mut Model, details: &NewBorrower) -> AppResult<Executed> {
    let borrower = Borrower::new(model.next_borrower_id()?, details)?;
    if model.has_borrower(&borrower) {
        return Err(AppError::Duplicate(MESSAGE_DUPLICATE_BORROWER.to_string()));
    }
    model.register_borrower(borrower.clone())?;
    tracing::info!("Registered borrower {}", borrower.id);
    Ok(Executed::recorded(
        format!("New borrower registered: {}", borrower),
        Command::RemoveBorrower(borrower.id.clone()),
        Command::RestoreBorrower(borrower),
    ))
}

pub(super) fn edit(model: &mut Model, changes: &EditBorrower) -> AppResult<Executed> {
    let borrower = model.require_serving()?.clone();
    if changes.is_empty() {
        return Err(AppError::BadRequest("At least one field to edit must be provided".to_string()));
    }
    let edited = borrower.edited(changes)?;
    if model.has_duplicate_borrower(&edited) {
        return Err(AppError::Duplicate(MESSAGE_DUPLICATE_BORROWER.to_string()));
    }
    model.set_borrower(&borrower.id, edited.clone())?;
    Ok(Executed::recorded(
        format!("Edited borrower: {}", edited),
        Command::SetBorrower(borrower),
        Command::SetBorrower(edited),
    ))
}

pub(super) fn serve(model: &mut Model, borrower_id: &BorrowerId) -> AppResult<Executed> {
    if let Some(current) = model.serving_borrower_id() {
        return Err(AppError::InvalidState(format!(
            "Already serving borrower {}, use done first",
            current
        )));
    }
    model.start_serving(borrower_id)?;
    Ok(Executed::recorded(
        format!("Serving borrower: {}", model.serving_borrower()),
        Command::Done,
        Command::Serve(borrower_id.clone()),
    ))
}

pub(super) fn done(model: &mut Model) -> AppResult<Executed> {
    let borrower = model.require_serving()?.clone();
    model.stop_serving();
    Ok(Executed::recorded(
        format!("Done serving borrower {} {}", borrower.id, borrower.name),
        Command::Serve(borrower.id),
        Command::Done,
    ))
}

pub(super) fn pay_fine(model: &mut Model, amount: Decimal) -> AppResult<Executed> {
    let borrower = model.require_serving()?.clone();
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation("Payment amount must be positive".to_string()));
    }
    if amount > borrower.outstanding_fees {
        return Err(AppError::InvalidState(format!(
            "Payment of ${} exceeds outstanding fees of ${}",
            amount, borrower.outstanding_fees
        )));
    }
    let paid = Borrower { outstanding_fees: borrower.outstanding_fees - amount, ..borrower.clone() };
    model.set_borrower(&borrower.id, paid.clone())?;
    tracing::info!("Borrower {} paid {}", borrower.id, amount);
    Ok(Executed::recorded(
        format!("{} paid ${}, remaining fees: ${}", paid.name, amount, paid.outstanding_fees),
        Command::SetBorrower(borrower),
        Command::SetBorrower(paid),
    ))
}

pub(super) fn restore(model: &mut Model, borrower: &Borrower) -> AppResult<Executed> {
    if !borrower.current_loans.is_empty() {
        return Err(AppError::InvalidState(format!(
            "Borrower {} cannot be restored with books on loan",
            borrower.id
        )));
    }
    model.register_borrower(borrower.clone())?;
    Ok(Executed::recorded(
        format!("Borrower restored: {}", borrower),
        Command::RemoveBorrower(borrower.id.clone()),
        Command::RestoreBorrower(borrower.clone()),
    ))
}

pub(super) fn remove(model: &mut Model, borrower_id: &BorrowerId) -> AppResult<Executed> {
    let borrower = model.remove_borrower(borrower_id)?;
    Ok(Executed::recorded(
        format!("Borrower removed: {}", borrower),
        Command::RestoreBorrower(borrower),
        Command::RemoveBorrower(borrower_id.clone()),
    ))
}

/// Replace a borrower's contact details or fees; active loans must not change
pub(super) fn set(model: &mut Model, borrower: &Borrower) -> AppResult<Executed> {
    let current = model.borrower(&borrower.id)?;
    if current.current_loans != borrower.current_loans {
        return Err(AppError::InvalidState(format!(
            "Loans of borrower {} changed since the record was saved",
            borrower.id
        )));
    }
    if model.has_duplicate_borrower(borrower) {
        return Err(AppError::Duplicate(MESSAGE_DUPLICATE_BORROWER.to_string()));
    }
    let previous = model.set_borrower(&borrower.id, borrower.clone())?;
    Ok(Executed::recorded(
        format!("Borrower updated: {}", borrower),
        Command::SetBorrower(previous),
        Command::SetBorrower(borrower.clone()),
    ))
}
