//! Borrower registry

use serde::{Deserialize, Serialize};

use super::{Record, RecordSet};
use crate::{
    error::AppResult,
    models::{Borrower, BorrowerId, LoanId},
};

impl Record for Borrower {
    type Id = BorrowerId;
    const NAME: &'static str = "borrower";

    fn id(&self) -> &BorrowerId {
        &self.id
    }

    fn is_duplicate_of(&self, other: &Self) -> bool {
        self.is_same_borrower(other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BorrowerRecords {
    borrowers: RecordSet<Borrower>,
}

impl BorrowerRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_borrowers(borrowers: impl IntoIterator<Item = Borrower>) -> AppResult<Self> {
        Ok(Self { borrowers: RecordSet::from_records(borrowers)? })
    }

    pub fn has_borrower(&self, borrower: &Borrower) -> bool {
        self.borrowers.contains(borrower)
    }

    pub fn has_borrower_id(&self, borrower_id: &BorrowerId) -> bool {
        self.borrowers.contains_id(borrower_id)
    }

    /// True if a borrower other than `borrower` shares its phone or email
    pub fn has_duplicate_borrower(&self, borrower: &Borrower) -> bool {
        self.borrowers
            .iter()
            .any(|other| other.id != borrower.id && other.is_same_borrower(borrower))
    }

    pub fn borrower(&self, borrower_id: &BorrowerId) -> Option<&Borrower> {
        self.borrowers.get(borrower_id)
    }

    pub fn require_borrower(&self, borrower_id: &BorrowerId) -> AppResult<&Borrower> {
        self.borrowers.require(borrower_id)
    }

    pub fn add_borrower(&mut self, borrower: Borrower) -> AppResult<()> {
        self.borrowers.add(borrower)
    }

    pub fn remove_borrower(&mut self, borrower_id: &BorrowerId) -> AppResult<Borrower> {
        self.borrowers.remove(borrower_id)
    }

    pub fn set_borrower(&mut self, borrower_id: &BorrowerId, borrower: Borrower) -> AppResult<Borrower> {
        self.borrowers.replace(borrower_id, borrower)
    }

    pub fn reset_data(&mut self, other: &BorrowerRecords) {
        self.borrowers.reset(&other.borrowers);
    }

    pub fn borrowers(&self) -> impl Iterator<Item = &Borrower> {
        self.borrowers.iter()
    }

    pub fn len(&self) -> usize {
        self.borrowers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.borrowers.is_empty()
    }

    pub fn next_borrower_id(&self) -> AppResult<BorrowerId> {
        self.borrowers.next_id()
    }

    /// Active loans of a borrower, as recorded on the borrower itself
    pub fn active_loans(&self, borrower_id: &BorrowerId) -> AppResult<&[LoanId]> {
        Ok(&self.require_borrower(borrower_id)?.current_loans)
    }
}
