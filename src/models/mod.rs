//! Data models for Shelfkeeper

pub mod book;
pub mod borrower;
pub mod filter;
pub mod ids;
pub mod loan;
pub mod prefs;

use serde::{Deserialize, Serialize};

use crate::repository::{BorrowerRecords, Catalog, LoanRecords};

// Re-export commonly used types
pub use book::{Book, EditBook, NewBook};
pub use borrower::{Borrower, EditBorrower, NewBorrower};
pub use filter::BookFilter;
pub use ids::{BorrowerId, LoanId, SequentialId, SerialNumber};
pub use loan::Loan;
pub use prefs::{SettingsUpdate, UserPrefs, UserSettings};

/// Full, comparable copy of the persisted library state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    pub catalog: Catalog,
    pub loans: LoanRecords,
    pub borrowers: BorrowerRecords,
    pub prefs: UserPrefs,
}
