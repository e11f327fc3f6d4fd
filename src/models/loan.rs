//! Loan model and related types

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{BorrowerId, LoanId, SerialNumber};
use crate::error::{AppError, AppResult};

/// A loan record. Returned loans are never modified; returning or renewing
/// produces a new value so the previous one can be kept for undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub serial_number: SerialNumber,
    pub borrower_id: BorrowerId,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Absent while the loan is active
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    #[serde(default)]
    pub renew_count: u32,
    #[serde(default)]
    pub fine_amount: Decimal,
}

impl Loan {
    /// Create an active loan
    pub fn new(
        id: LoanId,
        serial_number: SerialNumber,
        borrower_id: BorrowerId,
        start_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<Self> {
        if due_date < start_date {
            return Err(AppError::Validation(format!(
                "Due date {} is before start date {}",
                due_date, start_date
            )));
        }
        Ok(Self {
            id,
            serial_number,
            borrower_id,
            start_date,
            due_date,
            return_date: None,
            renew_count: 0,
            fine_amount: Decimal::ZERO,
        })
    }

    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_active() && self.due_date < today
    }

    /// Whole days past the due date as of `date`, zero if not late
    pub fn days_overdue(&self, date: NaiveDate) -> i64 {
        (date - self.due_date).num_days().max(0)
    }

    /// Fine owed if the loan were returned on `date`
    pub fn accrued_fine(&self, date: NaiveDate, fine_increment: Decimal) -> AppResult<Decimal> {
        Decimal::from(self.days_overdue(date))
            .checked_mul(fine_increment)
            .ok_or_else(|| AppError::Validation(format!("Fine for loan {} is too large", self.id)))
    }

    /// The returned counterpart of this loan
    pub fn returned(&self, return_date: NaiveDate, fine_amount: Decimal) -> AppResult<Self> {
        if !self.is_active() {
            return Err(AppError::InvalidState(format!("Loan {} is already returned", self.id)));
        }
        if return_date < self.start_date {
            return Err(AppError::Validation(format!(
                "Return date {} is before start date {}",
                return_date, self.start_date
            )));
        }
        Ok(Self {
            return_date: Some(return_date),
            fine_amount,
            ..self.clone()
        })
    }

    /// The renewed counterpart of this loan, due `renew_period_days` later
    pub fn renewed(&self, renew_period_days: u32) -> AppResult<Self> {
        if !self.is_active() {
            return Err(AppError::InvalidState(format!("Loan {} is already returned", self.id)));
        }
        Ok(Self {
            due_date: add_days(self.due_date, renew_period_days)?,
            renew_count: self.renew_count + 1,
            ..self.clone()
        })
    }
}

/// `date` moved `days` forward, failing past the calendar's end
pub fn add_days(date: NaiveDate, days: u32) -> AppResult<NaiveDate> {
    date.checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| AppError::Validation(format!("Date {} plus {} days is out of range", date, days)))
}

impl std::fmt::Display for Loan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} to {} from {} due {}",
            self.id, self.serial_number, self.borrower_id, self.start_date, self.due_date
        )?;
        if let Some(returned) = self.return_date {
            write!(f, ", returned {}", returned)?;
        }
        if !self.fine_amount.is_zero() {
            write!(f, ", fine ${}", self.fine_amount)?;
        }
        Ok(())
    }
}
