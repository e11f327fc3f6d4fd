//! Loan ledger: every loan ever recorded, active and returned

use serde::{Deserialize, Serialize};

use super::{Record, RecordSet};
use crate::{
    error::AppResult,
    models::{Loan, LoanId, SerialNumber},
};

impl Record for Loan {
    type Id = LoanId;
    const NAME: &'static str = "loan";

    fn id(&self) -> &LoanId {
        &self.id
    }

    /// A book can only be on one active loan at a time
    fn is_duplicate_of(&self, other: &Self) -> bool {
        self.is_active() && other.is_active() && self.serial_number == other.serial_number
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanRecords {
    loans: RecordSet<Loan>,
}

impl LoanRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_loans(loans: impl IntoIterator<Item = Loan>) -> AppResult<Self> {
        Ok(Self { loans: RecordSet::from_records(loans)? })
    }

    pub fn has_loan(&self, loan: &Loan) -> bool {
        self.loans.contains(loan)
    }

    pub fn has_loan_id(&self, loan_id: &LoanId) -> bool {
        self.loans.contains_id(loan_id)
    }

    pub fn loan(&self, loan_id: &LoanId) -> Option<&Loan> {
        self.loans.get(loan_id)
    }

    pub fn require_loan(&self, loan_id: &LoanId) -> AppResult<&Loan> {
        self.loans.require(loan_id)
    }

    pub fn add_loan(&mut self, loan: Loan) -> AppResult<()> {
        self.loans.add(loan)
    }

    pub fn remove_loan(&mut self, loan_id: &LoanId) -> AppResult<Loan> {
        self.loans.remove(loan_id)
    }

    pub fn set_loan(&mut self, loan_id: &LoanId, loan: Loan) -> AppResult<Loan> {
        self.loans.replace(loan_id, loan)
    }

    pub fn reset_data(&mut self, other: &LoanRecords) {
        self.loans.reset(&other.loans);
    }

    pub fn loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter()
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    pub fn next_loan_id(&self) -> AppResult<LoanId> {
        self.loans.next_id()
    }

    /// Active loan of the given book, if any
    pub fn active_loan_for(&self, serial_number: &SerialNumber) -> Option<&Loan> {
        self.loans().find(|loan| loan.is_active() && &loan.serial_number == serial_number)
    }
}
