//! In-memory model of the library: the single mutation surface commands
//! operate on.
//!
//! The model owns the catalog, the loan ledger and the borrower registry,
//! plus session state (displayed-list filter and the borrower being served).
//! Operations that touch several collections validate everything first and
//! only then mutate, so a failing call leaves the model as it was.

use chrono::NaiveDate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        Book, BookFilter, Borrower, BorrowerId, LibrarySnapshot, Loan, LoanId, SerialNumber,
        UserPrefs, UserSettings,
    },
    repository::{BorrowerRecords, Catalog, LoanRecords},
};

pub const MESSAGE_INVALID_BOOK_DISPLAYED_INDEX: &str = "The book index provided is invalid";
pub const MESSAGE_NOT_IN_SERVE_MODE: &str = "This command can only be used while serving a borrower";

#[derive(Debug, Clone)]
pub struct Model {
    prefs: UserPrefs,
    catalog: Catalog,
    loans: LoanRecords,
    borrowers: BorrowerRecords,
    filter: BookFilter,
    serving: Option<BorrowerId>,
    clock: Clock,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Catalog::new(), LoanRecords::new(), BorrowerRecords::new(), UserPrefs::default())
    }
}

impl Model {
    pub fn new(catalog: Catalog, loans: LoanRecords, borrowers: BorrowerRecords, prefs: UserPrefs) -> Self {
        tracing::debug!(
            "Initializing model with {} books, {} loans, {} borrowers",
            catalog.len(),
            loans.len(),
            borrowers.len()
        );
        Self {
            prefs,
            catalog,
            loans,
            borrowers,
            filter: BookFilter::all(),
            serving: None,
            clock: Clock::System,
        }
    }

    pub fn from_snapshot(snapshot: LibrarySnapshot) -> Self {
        Self::new(snapshot.catalog, snapshot.loans, snapshot.borrowers, snapshot.prefs)
    }

    /// Same model, dated by `clock`
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Copy of every persisted collection
    pub fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            catalog: self.catalog.clone(),
            loans: self.loans.clone(),
            borrowers: self.borrowers.clone(),
            prefs: self.prefs.clone(),
        }
    }

    // ========== User prefs ==========

    pub fn prefs(&self) -> &UserPrefs {
        &self.prefs
    }

    pub fn set_prefs(&mut self, prefs: &UserPrefs) -> AppResult<()> {
        prefs.validate()?;
        self.prefs = prefs.clone();
        Ok(())
    }

    pub fn user_settings(&self) -> &UserSettings {
        &self.prefs.user_settings
    }

    pub fn set_user_settings(&mut self, settings: UserSettings) -> AppResult<()> {
        settings.validate()?;
        tracing::debug!("User settings changed to {}", settings);
        self.prefs.user_settings = settings;
        Ok(())
    }

    // ========== Catalog ==========

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: &Catalog) {
        self.catalog.reset_data(catalog);
    }

    pub fn has_book(&self, book: &Book) -> bool {
        self.catalog.has_book(book)
    }

    pub fn has_serial_number(&self, serial_number: &SerialNumber) -> bool {
        self.catalog.has_serial_number(serial_number)
    }

    pub fn book(&self, serial_number: &SerialNumber) -> AppResult<&Book> {
        self.catalog
            .book(serial_number)
            .ok_or_else(|| AppError::NotFound(format!("No book with serial number {}", serial_number)))
    }

    /// Insert a book and show the full list again
    pub fn add_book(&mut self, book: Book) -> AppResult<()> {
        tracing::debug!("Adding book {}", book.serial_number);
        self.catalog.add_book(book)?;
        self.reset_filter();
        Ok(())
    }

    pub fn delete_book(&mut self, serial_number: &SerialNumber) -> AppResult<Book> {
        tracing::debug!("Deleting book {}", serial_number);
        self.catalog.remove_book(serial_number)
    }

    pub fn set_book(&mut self, serial_number: &SerialNumber, book: Book) -> AppResult<Book> {
        tracing::debug!("Replacing book {}", serial_number);
        self.catalog.set_book(serial_number, book)
    }

    pub fn next_serial_number(&self) -> AppResult<SerialNumber> {
        self.catalog.next_serial_number()
    }

    pub fn overdue_books(&self) -> Vec<&Book> {
        self.catalog.overdue_books(&self.loans, self.today())
    }

    /// Copy of this model whose catalog lacks `book`, used to check an edit
    /// for duplicates against every other book
    pub fn exclude_book_being_replaced(&self, book: &Book) -> Model {
        let mut model = self.clone();
        if model.catalog.remove_book(&book.serial_number).is_err() {
            tracing::warn!("Book {} being replaced is not in the catalog", book.serial_number);
        }
        model
    }

    // ========== Displayed list ==========

    pub fn filter(&self) -> &BookFilter {
        &self.filter
    }

    pub fn update_filter(&mut self, filter: BookFilter) {
        self.filter = filter;
    }

    pub fn reset_filter(&mut self) {
        self.filter = BookFilter::all();
    }

    /// Books matching the current filter, in catalog order
    pub fn filtered_books(&self) -> Vec<&Book> {
        self.catalog.books().filter(|book| self.filter.matches(book)).collect()
    }

    /// Resolve a 1-based index into the displayed list
    pub fn displayed_book(&self, index: usize) -> AppResult<&Book> {
        index
            .checked_sub(1)
            .and_then(|i| self.filtered_books().get(i).copied())
            .ok_or_else(|| AppError::NotFound(MESSAGE_INVALID_BOOK_DISPLAYED_INDEX.to_string()))
    }

    // ========== Loan records ==========

    pub fn loans(&self) -> &LoanRecords {
        &self.loans
    }

    pub fn set_loans(&mut self, loans: &LoanRecords) {
        self.loans.reset_data(loans);
    }

    pub fn loan(&self, loan_id: &LoanId) -> AppResult<&Loan> {
        self.loans.require_loan(loan_id)
    }

    pub fn add_loan(&mut self, loan: Loan) -> AppResult<()> {
        self.loans.add_loan(loan)
    }

    pub fn set_loan(&mut self, loan_id: &LoanId, loan: Loan) -> AppResult<Loan> {
        self.loans.set_loan(loan_id, loan)
    }

    pub fn next_loan_id(&self) -> AppResult<LoanId> {
        self.loans.next_loan_id()
    }

    /// Record a new active loan: ledger entry, book marked as lent, loan
    /// appended to the borrower's active list.
    pub fn record_loan(&mut self, loan: Loan) -> AppResult<()> {
        if !loan.is_active() {
            return Err(AppError::InvalidState(format!("Loan {} is already returned", loan.id)));
        }
        if self.loans.has_loan_id(&loan.id) {
            return Err(AppError::Duplicate(format!("A loan with id {} already exists", loan.id)));
        }
        let book = self.book(&loan.serial_number)?;
        if book.is_on_loan() {
            return Err(AppError::InvalidState(format!("Book {} is already on loan", book.serial_number)));
        }
        let lent_book = book.lent(loan.id.clone());
        let borrower = self.borrowers.require_borrower(&loan.borrower_id)?.with_loan(loan.id.clone());

        tracing::debug!("Recording loan {}", loan);
        let serial_number = loan.serial_number.clone();
        let borrower_id = loan.borrower_id.clone();
        self.loans.add_loan(loan)?;
        self.catalog.set_book(&serial_number, lent_book)?;
        self.borrowers.set_borrower(&borrower_id, borrower)?;
        Ok(())
    }

    /// Erase an active loan as if it had never been made; its id becomes free
    pub fn revoke_loan(&mut self, loan_id: &LoanId) -> AppResult<Loan> {
        let loan = self.loan(loan_id)?;
        if !loan.is_active() {
            return Err(AppError::InvalidState(format!("Loan {} is already returned", loan_id)));
        }
        let book = self.book(&loan.serial_number)?;
        if book.loan.as_ref() != Some(loan_id) {
            return Err(AppError::InvalidState(format!("Book {} is not on loan {}", book.serial_number, loan_id)));
        }
        let shelved_book = book.returned();
        let borrower = self.borrowers.require_borrower(&loan.borrower_id)?;
        let mut borrower = borrower.clone();
        borrower.current_loans.retain(|id| id != loan_id);

        tracing::debug!("Revoking loan {}", loan_id);
        let serial_number = shelved_book.serial_number.clone();
        let borrower_id = borrower.id.clone();
        let loan = self.loans.remove_loan(loan_id)?;
        self.catalog.set_book(&serial_number, shelved_book)?;
        self.borrowers.set_borrower(&borrower_id, borrower)?;
        Ok(loan)
    }

    /// Replace an active loan by its returned counterpart, shelve the book and
    /// charge the fine to the borrower. Returns the active loan it replaced.
    pub fn close_loan(&mut self, returned: Loan) -> AppResult<Loan> {
        if returned.is_active() {
            return Err(AppError::InvalidState(format!("Loan {} has no return date", returned.id)));
        }
        let active = self.loan(&returned.id)?;
        if !active.is_active() {
            return Err(AppError::InvalidState(format!("Loan {} is already returned", returned.id)));
        }
        if active.serial_number != returned.serial_number || active.borrower_id != returned.borrower_id {
            return Err(AppError::Validation(format!("Loan {} does not match the recorded loan", returned.id)));
        }
        let book = self.book(&returned.serial_number)?;
        if book.loan.as_ref() != Some(&returned.id) {
            return Err(AppError::InvalidState(format!(
                "Book {} is not on loan {}",
                book.serial_number, returned.id
            )));
        }
        let shelved_book = book.returned();
        let borrower = self
            .borrowers
            .require_borrower(&returned.borrower_id)?
            .with_returned_loan(&returned.id, returned.fine_amount)?;

        tracing::debug!("Closing loan {}", returned);
        let loan_id = returned.id.clone();
        let serial_number = shelved_book.serial_number.clone();
        let borrower_id = borrower.id.clone();
        let previous = self.loans.set_loan(&loan_id, returned)?;
        self.catalog.set_book(&serial_number, shelved_book)?;
        self.borrowers.set_borrower(&borrower_id, borrower)?;
        Ok(previous)
    }

    /// Undo a return: put the active loan back in the ledger, mark the book as
    /// lent again and restore the borrower record as it was before the return.
    pub fn reopen_loan(&mut self, active: Loan, borrower: Borrower) -> AppResult<()> {
        let book = self.book(&active.serial_number)?;
        if book.is_on_loan() {
            return Err(AppError::InvalidState(format!("Book {} is already on loan", book.serial_number)));
        }
        let lent_book = book.lent(active.id.clone());
        self.check_reopen(&active, &borrower)?;

        tracing::debug!("Reopening loan {}", active);
        let serial_number = active.serial_number.clone();
        let loan_id = active.id.clone();
        let borrower_id = borrower.id.clone();
        self.loans.set_loan(&loan_id, active)?;
        self.catalog.set_book(&serial_number, lent_book)?;
        self.borrowers.set_borrower(&borrower_id, borrower)?;
        Ok(())
    }

    /// Undo a delete of a book that was on loan: the on-loan book, its active
    /// loan and the borrower record all come back together.
    pub fn restore_deleted_book(&mut self, book: Book, active: Loan, borrower: Borrower) -> AppResult<()> {
        if book.loan.as_ref() != Some(&active.id) || book.serial_number != active.serial_number {
            return Err(AppError::Validation(format!(
                "Book {} does not belong to loan {}",
                book.serial_number, active.id
            )));
        }
        if self.catalog.has_serial_number(&book.serial_number) {
            return Err(AppError::Duplicate(format!(
                "A book with id {} already exists",
                book.serial_number
            )));
        }
        if self.catalog.has_book(&book) {
            return Err(AppError::Duplicate("This book already exists".to_string()));
        }
        self.check_reopen(&active, &borrower)?;

        tracing::debug!("Restoring deleted book {} with loan {}", book.serial_number, active.id);
        let loan_id = active.id.clone();
        let borrower_id = borrower.id.clone();
        self.loans.set_loan(&loan_id, active)?;
        self.catalog.add_book(book)?;
        self.borrowers.set_borrower(&borrower_id, borrower)?;
        Ok(())
    }

    fn check_reopen(&self, active: &Loan, borrower: &Borrower) -> AppResult<()> {
        if !active.is_active() {
            return Err(AppError::InvalidState(format!("Loan {} has a return date", active.id)));
        }
        if self.loan(&active.id)?.is_active() {
            return Err(AppError::InvalidState(format!("Loan {} is still active", active.id)));
        }
        if borrower.id != active.borrower_id || !borrower.has_loan(&active.id) {
            return Err(AppError::Validation(format!(
                "Borrower {} does not hold loan {}",
                borrower.id, active.id
            )));
        }
        self.borrowers.require_borrower(&borrower.id)?;
        Ok(())
    }

    // ========== Borrower records ==========

    pub fn borrowers(&self) -> &BorrowerRecords {
        &self.borrowers
    }

    pub fn set_borrowers(&mut self, borrowers: &BorrowerRecords) {
        self.borrowers.reset_data(borrowers);
        if let Some(id) = &self.serving {
            if !self.borrowers.has_borrower_id(id) {
                tracing::warn!("Served borrower {} is gone, leaving serve mode", id);
                self.serving = None;
            }
        }
    }

    pub fn has_borrower(&self, borrower: &Borrower) -> bool {
        self.borrowers.has_borrower(borrower)
    }

    pub fn has_borrower_id(&self, borrower_id: &BorrowerId) -> bool {
        self.borrowers.has_borrower_id(borrower_id)
    }

    pub fn has_duplicate_borrower(&self, borrower: &Borrower) -> bool {
        self.borrowers.has_duplicate_borrower(borrower)
    }

    pub fn borrower(&self, borrower_id: &BorrowerId) -> AppResult<&Borrower> {
        self.borrowers.require_borrower(borrower_id)
    }

    pub fn register_borrower(&mut self, borrower: Borrower) -> AppResult<()> {
        tracing::debug!("Registering borrower {}", borrower.id);
        self.borrowers.add_borrower(borrower)
    }

    /// Remove a borrower that has no active loans and is not being served
    pub fn remove_borrower(&mut self, borrower_id: &BorrowerId) -> AppResult<Borrower> {
        let borrower = self.borrower(borrower_id)?;
        if !borrower.current_loans.is_empty() {
            return Err(AppError::InvalidState(format!("Borrower {} still has books on loan", borrower_id)));
        }
        if self.serving.as_ref() == Some(borrower_id) {
            return Err(AppError::InvalidState(format!("Borrower {} is being served", borrower_id)));
        }
        tracing::debug!("Removing borrower {}", borrower_id);
        self.borrowers.remove_borrower(borrower_id)
    }

    pub fn set_borrower(&mut self, borrower_id: &BorrowerId, borrower: Borrower) -> AppResult<Borrower> {
        tracing::debug!("Replacing borrower {}", borrower_id);
        self.borrowers.set_borrower(borrower_id, borrower)
    }

    pub fn next_borrower_id(&self) -> AppResult<BorrowerId> {
        self.borrowers.next_borrower_id()
    }

    // ========== Serve mode ==========

    /// Enter serve mode for an existing borrower
    pub fn start_serving(&mut self, borrower_id: &BorrowerId) -> AppResult<()> {
        if !self.borrowers.has_borrower_id(borrower_id) {
            return Err(AppError::NotFound(format!("No borrower with id {}", borrower_id)));
        }
        tracing::info!("Serving borrower {}", borrower_id);
        self.serving = Some(borrower_id.clone());
        Ok(())
    }

    /// Leave serve mode; no-op when not serving
    pub fn stop_serving(&mut self) {
        if let Some(id) = self.serving.take() {
            tracing::info!("Done serving borrower {}", id);
        }
    }

    pub fn is_serve_mode(&self) -> bool {
        self.serving.is_some()
    }

    pub fn serving_borrower_id(&self) -> Option<&BorrowerId> {
        self.serving.as_ref()
    }

    /// Borrower being served, or `InvalidState` for commands that need one
    pub fn require_serving(&self) -> AppResult<&Borrower> {
        let id = self
            .serving
            .as_ref()
            .ok_or_else(|| AppError::InvalidState(MESSAGE_NOT_IN_SERVE_MODE.to_string()))?;
        self.borrower(id)
    }

    /// Borrower being served.
    ///
    /// # Panics
    ///
    /// Panics outside serve mode: callers must check `is_serve_mode` first.
    pub fn serving_borrower(&self) -> &Borrower {
        let id = self.serving.as_ref().expect("Not in serve mode");
        self.borrowers.borrower(id).expect("Served borrower is registered")
    }

    /// Books currently lent to the borrower being served, in loan order.
    ///
    /// # Panics
    ///
    /// Panics outside serve mode.
    pub fn serving_borrower_books(&self) -> Vec<&Book> {
        self.serving_borrower()
            .current_loans
            .iter()
            .filter_map(|loan_id| self.loans.loan(loan_id))
            .filter_map(|loan| self.catalog.book(&loan.serial_number))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBorrower;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn model() -> Model {
        let mut model = Model::default().with_clock(Clock::Fixed(date(2024, 6, 1)));
        for (i, title) in ["Harry Botter", "Animal the Farm"].iter().enumerate() {
            let sn = model.next_serial_number().unwrap();
            model.add_book(Book::new(sn, title, &format!("Author {}", i), Vec::new()).unwrap()).unwrap();
        }
        let details = NewBorrower {
            name: "Alice".to_string(),
            phone: "1234".to_string(),
            email: "alice@example.com".to_string(),
        };
        let id = model.next_borrower_id().unwrap();
        model.register_borrower(Borrower::new(id, &details).unwrap()).unwrap();
        model
    }

    fn new_loan(model: &Model, sn: &str) -> Loan {
        Loan::new(
            model.next_loan_id().unwrap(),
            SerialNumber::new(sn).unwrap(),
            BorrowerId::new("A0001").unwrap(),
            date(2024, 5, 1),
            date(2024, 5, 15),
        )
        .unwrap()
    }

    #[test]
    fn test_record_and_close_loan() {
        let mut model = model();
        let loan = new_loan(&model, "B0001");
        model.record_loan(loan.clone()).unwrap();

        let book = model.book(&loan.serial_number).unwrap();
        assert_eq!(book.loan.as_ref(), Some(&loan.id));
        assert_eq!(model.borrower(&loan.borrower_id).unwrap().current_loans, vec![loan.id.clone()]);
        assert_eq!(model.overdue_books().len(), 1);

        let returned = loan.returned(model.today(), Decimal::new(170, 2)).unwrap();
        let previous = model.close_loan(returned).unwrap();
        assert_eq!(previous, loan);
        assert!(!model.book(&loan.serial_number).unwrap().is_on_loan());
        let borrower = model.borrower(&loan.borrower_id).unwrap();
        assert!(borrower.current_loans.is_empty());
        assert_eq!(borrower.outstanding_fees, Decimal::new(170, 2));
        assert!(model.overdue_books().is_empty());
    }

    #[test]
    fn test_record_loan_failure_leaves_model_untouched() {
        let mut model = model();
        let loan = new_loan(&model, "B0001");
        model.record_loan(loan).unwrap();
        let before = model.snapshot();

        let mut second = new_loan(&model, "B0001");
        second.id = LoanId::new("L000002").unwrap();
        assert!(matches!(model.record_loan(second), Err(AppError::InvalidState(_))));
        assert_eq!(model.snapshot(), before);
    }

    #[test]
    fn test_revoke_frees_loan_id() {
        let mut model = model();
        let loan = new_loan(&model, "B0002");
        model.record_loan(loan.clone()).unwrap();
        model.revoke_loan(&loan.id).unwrap();
        assert!(model.loans().is_empty());
        assert_eq!(model.next_loan_id().unwrap(), loan.id);
    }

    #[test]
    fn test_serve_mode_transitions() {
        let mut model = model();
        assert!(!model.is_serve_mode());
        assert!(matches!(model.require_serving(), Err(AppError::InvalidState(_))));
        assert!(model.start_serving(&BorrowerId::new("A0009").unwrap()).is_err());

        model.start_serving(&BorrowerId::new("A0001").unwrap()).unwrap();
        assert!(model.is_serve_mode());
        assert_eq!(model.serving_borrower().name, "Alice");
        assert!(model.serving_borrower_books().is_empty());

        model.stop_serving();
        model.stop_serving();
        assert!(!model.is_serve_mode());
    }

    #[test]
    #[should_panic(expected = "Not in serve mode")]
    fn test_serving_borrower_outside_serve_mode_panics() {
        model().serving_borrower_books();
    }

    #[test]
    fn test_exclude_book_being_replaced() {
        let model = model();
        let book = model.book(&SerialNumber::new("B0001").unwrap()).unwrap().clone();
        let scoped = model.exclude_book_being_replaced(&book);
        assert!(!scoped.has_book(&book));
        assert!(model.has_book(&book));
        assert_eq!(scoped.catalog().len(), 1);
    }

    #[test]
    fn test_displayed_book_uses_filter() {
        let mut model = model();
        assert_eq!(model.displayed_book(2).unwrap().title, "Animal the Farm");
        model.update_filter(BookFilter { title_keywords: vec!["farm".to_string()], ..Default::default() });
        assert_eq!(model.displayed_book(1).unwrap().title, "Animal the Farm");
        assert!(model.displayed_book(2).is_err());
        assert!(model.displayed_book(0).is_err());
        model.reset_filter();
        assert_eq!(model.filtered_books().len(), 2);
    }

    #[test]
    fn test_reset_to_snapshot_leaves_serve_mode_for_removed_borrower() {
        let mut model = model();
        let saved = model.snapshot();
        let empty = Model::default().snapshot();

        model.start_serving(&BorrowerId::new("A0001").unwrap()).unwrap();
        model.set_borrowers(&saved.borrowers);
        assert!(model.is_serve_mode());

        model.set_borrowers(&empty.borrowers);
        model.set_catalog(&empty.catalog);
        model.set_loans(&empty.loans);
        assert!(!model.is_serve_mode());
        assert!(model.borrowers().is_empty());
        assert!(model.filtered_books().is_empty());

        model.set_catalog(&saved.catalog);
        model.set_loans(&saved.loans);
        model.set_borrowers(&saved.borrowers);
        model.set_prefs(&saved.prefs).unwrap();
        assert_eq!(model.snapshot(), saved);
        assert!(!model.is_serve_mode());
    }

    #[test]
    fn test_reset_prefs_are_validated() {
        let mut model = model();
        let mut prefs = model.prefs().clone();
        prefs.user_settings.max_renews = 4;
        model.set_prefs(&prefs).unwrap();
        assert_eq!(model.user_settings().max_renews, 4);

        prefs.user_settings.loan_period_days = 4_000_000_000;
        assert!(matches!(model.set_prefs(&prefs), Err(AppError::Validation(_))));
        assert_eq!(model.user_settings().loan_period_days, 14);
    }
}
