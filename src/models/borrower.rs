//! Borrower model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ids::{BorrowerId, LoanId};
use crate::error::{AppError, AppResult};

/// A registered borrower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    pub id: BorrowerId,
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Active loans, in the order they were taken out
    #[serde(default)]
    pub current_loans: Vec<LoanId>,
    #[serde(default)]
    pub outstanding_fees: Decimal,
}

/// Contact details supplied when registering a borrower
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct NewBorrower {
    #[validate(length(min = 1, message = "Name should not be blank"))]
    pub name: String,
    #[validate(length(min = 3, message = "Phone numbers should be at least 3 digits long"))]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Contact details to replace on an existing borrower
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct EditBorrower {
    #[validate(length(min = 1, message = "Name should not be blank"))]
    pub name: Option<String>,
    #[validate(length(min = 3, message = "Phone numbers should be at least 3 digits long"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl EditBorrower {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

impl Borrower {
    /// Register a borrower with no loans and no fees
    pub fn new(id: BorrowerId, details: &NewBorrower) -> AppResult<Self> {
        let details = NewBorrower {
            name: details.name.trim().to_string(),
            phone: details.phone.trim().to_string(),
            email: details.email.trim().to_string(),
        };
        details.validate()?;
        check_phone_digits(&details.phone)?;
        Ok(Self {
            id,
            name: details.name,
            phone: details.phone,
            email: details.email,
            current_loans: Vec::new(),
            outstanding_fees: Decimal::ZERO,
        })
    }

    /// Apply contact changes, keeping id, loans and fees
    pub fn edited(&self, changes: &EditBorrower) -> AppResult<Self> {
        let changes = EditBorrower {
            name: changes.name.as_deref().map(|s| s.trim().to_string()),
            phone: changes.phone.as_deref().map(|s| s.trim().to_string()),
            email: changes.email.as_deref().map(|s| s.trim().to_string()),
        };
        changes.validate()?;
        let mut borrower = self.clone();
        if let Some(name) = changes.name {
            borrower.name = name;
        }
        if let Some(phone) = changes.phone {
            check_phone_digits(&phone)?;
            borrower.phone = phone;
        }
        if let Some(email) = changes.email {
            borrower.email = email;
        }
        Ok(borrower)
    }

    /// Two borrowers clash if they share a phone number or an email address
    pub fn is_same_borrower(&self, other: &Borrower) -> bool {
        self.phone == other.phone || self.email.eq_ignore_ascii_case(&other.email)
    }

    pub fn has_loan(&self, loan_id: &LoanId) -> bool {
        self.current_loans.contains(loan_id)
    }

    /// Copy with `loan_id` appended to the active list
    pub fn with_loan(&self, loan_id: LoanId) -> Self {
        let mut borrower = self.clone();
        borrower.current_loans.push(loan_id);
        borrower
    }

    /// Copy with `loan_id` removed from the active list and `fine` added to the fees
    pub fn with_returned_loan(&self, loan_id: &LoanId, fine: Decimal) -> AppResult<Self> {
        let outstanding_fees = self.outstanding_fees.checked_add(fine).ok_or_else(|| {
            AppError::InvalidState(format!("Outstanding fees of borrower {} are too large", self.id))
        })?;
        let mut borrower = self.clone();
        borrower.current_loans.retain(|id| id != loan_id);
        borrower.outstanding_fees = outstanding_fees;
        Ok(borrower)
    }
}

impl std::fmt::Display for Borrower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (phone: {}, email: {}, loans: {}, fees: ${})",
            self.id,
            self.name,
            self.phone,
            self.email,
            self.current_loans.len(),
            self.outstanding_fees
        )
    }
}

fn check_phone_digits(phone: &str) -> AppResult<()> {
    if phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::Validation("Phone numbers should only contain digits".to_string()))
    }
}
