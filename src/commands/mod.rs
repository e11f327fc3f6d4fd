//! Commands: one variant per operator intent, plus the replay variants that
//! are produced as undo/redo actions.
//!
//! Every command runs in the same order: resolve its targets, validate every
//! precondition, mutate the [`Model`] through its methods, then hand back the
//! pair of actions that undo and redo it. A command that fails leaves the
//! model untouched.

mod books;
mod borrowers;
mod loans;

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{
        Book, BookFilter, Borrower, BorrowerId, EditBook, EditBorrower, Loan, LoanId, NewBook,
        NewBorrower, SerialNumber, SettingsUpdate, UserSettings,
    },
    services::model::Model,
};

/// How a command designates a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookTarget {
    /// 1-based position in the displayed list (the served borrower's books
    /// for return and renew)
    Index(usize),
    SerialNumber(SerialNumber),
}

impl std::fmt::Display for BookTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookTarget::Index(index) => write!(f, "#{}", index),
            BookTarget::SerialNumber(sn) => write!(f, "{}", sn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddBook(NewBook),
    DeleteBook(BookTarget),
    EditBook { target: BookTarget, changes: EditBook },
    Find(BookFilter),
    List,
    RegisterBorrower(NewBorrower),
    EditBorrower(EditBorrower),
    Serve(BorrowerId),
    Done,
    LoanBook(BookTarget),
    ReturnBook(BookTarget),
    RenewBook(BookTarget),
    PayFine(Decimal),
    SetSettings(SettingsUpdate),
    Undo,
    Redo,
    Exit,

    // Replay variants: restore exact values when undoing or redoing
    RestoreBook(Book),
    SetBook(Book),
    /// Undo of deleting a book that was on loan
    Undelete { book: Book, loan: Loan, borrower: Borrower },
    RestoreLoan(Loan),
    RevokeLoan(LoanId),
    CloseLoan(Loan),
    Unreturn { loan: Loan, borrower: Borrower },
    SetLoan(Loan),
    RestoreBorrower(Borrower),
    RemoveBorrower(BorrowerId),
    SetBorrower(Borrower),
    ReplaceSettings(UserSettings),
}

/// Feedback shown to the operator after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub feedback: String,
}

impl CommandResult {
    pub fn new(feedback: impl Into<String>) -> Self {
        Self { feedback: feedback.into() }
    }
}

impl std::fmt::Display for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.feedback)
    }
}

/// Actions that reverse and replay an executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reversal {
    pub undo: Command,
    pub redo: Command,
}

impl Reversal {
    pub fn new(undo: Command, redo: Command) -> Self {
        Self { undo, redo }
    }
}

/// Outcome of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executed {
    pub result: CommandResult,
    /// `None` for commands that only change the view
    pub reversal: Option<Reversal>,
}

impl Executed {
    fn recorded(feedback: impl Into<String>, undo: Command, redo: Command) -> Self {
        Self { result: CommandResult::new(feedback), reversal: Some(Reversal::new(undo, redo)) }
    }

    fn view_only(feedback: impl Into<String>) -> Self {
        Self { result: CommandResult::new(feedback), reversal: None }
    }
}

impl Command {
    /// Run this command against the model
    pub fn execute(&self, model: &mut Model) -> AppResult<Executed> {
        tracing::debug!("Executing {}", self.name());
        match self {
            Command::AddBook(new_book) => books::add(model, new_book),
            Command::DeleteBook(target) => books::delete(model, target),
            Command::EditBook { target, changes } => books::edit(model, target, changes),
            Command::Find(filter) => {
                model.update_filter(filter.clone());
                Ok(Executed::view_only(format!("{} books listed!", model.filtered_books().len())))
            }
            Command::List => {
                model.reset_filter();
                Ok(Executed::view_only("Listed all books"))
            }
            Command::RegisterBorrower(details) => borrowers::register(model, details),
            Command::EditBorrower(changes) => borrowers::edit(model, changes),
            Command::Serve(borrower_id) => borrowers::serve(model, borrower_id),
            Command::Done => borrowers::done(model),
            Command::LoanBook(target) => loans::lend(model, target),
            Command::ReturnBook(target) => loans::return_book(model, target),
            Command::RenewBook(target) => loans::renew(model, target),
            Command::PayFine(amount) => borrowers::pay_fine(model, *amount),
            Command::SetSettings(update) => set_settings(model, update),
            Command::Undo | Command::Redo => Err(AppError::InvalidState(
                "Undo and redo can only run through the command history".to_string(),
            )),
            Command::Exit => Ok(Executed::view_only("Exiting Shelfkeeper as requested ...")),

            Command::RestoreBook(book) => books::restore(model, book),
            Command::SetBook(book) => books::set(model, book),
            Command::Undelete { book, loan, borrower } => books::undelete(model, book, loan, borrower),
            Command::RestoreLoan(loan) => loans::restore(model, loan),
            Command::RevokeLoan(loan_id) => loans::revoke(model, loan_id),
            Command::CloseLoan(returned) => loans::close(model, returned),
            Command::Unreturn { loan, borrower } => loans::unreturn(model, loan, borrower),
            Command::SetLoan(loan) => loans::set(model, loan),
            Command::RestoreBorrower(borrower) => borrowers::restore(model, borrower),
            Command::RemoveBorrower(borrower_id) => borrowers::remove(model, borrower_id),
            Command::SetBorrower(borrower) => borrowers::set(model, borrower),
            Command::ReplaceSettings(settings) => replace_settings(model, settings),
        }
    }

    /// Whether running this command can change persisted state. Serve mode
    /// and the displayed-list filter live in memory only.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Command::Find(_) | Command::List | Command::Serve(_) | Command::Done | Command::Exit
        )
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddBook(_) => "add",
            Command::DeleteBook(_) => "delete",
            Command::EditBook { .. } => "edit",
            Command::Find(_) => "find",
            Command::List => "list",
            Command::RegisterBorrower(_) => "register",
            Command::EditBorrower(_) => "editborrower",
            Command::Serve(_) => "serve",
            Command::Done => "done",
            Command::LoanBook(_) => "loan",
            Command::ReturnBook(_) => "return",
            Command::RenewBook(_) => "renew",
            Command::PayFine(_) => "pay",
            Command::SetSettings(_) => "set",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Exit => "exit",
            Command::RestoreBook(_) => "restore-book",
            Command::SetBook(_) => "set-book",
            Command::Undelete { .. } => "undelete",
            Command::RestoreLoan(_) => "restore-loan",
            Command::RevokeLoan(_) => "revoke-loan",
            Command::CloseLoan(_) => "close-loan",
            Command::Unreturn { .. } => "unreturn",
            Command::SetLoan(_) => "set-loan",
            Command::RestoreBorrower(_) => "restore-borrower",
            Command::RemoveBorrower(_) => "remove-borrower",
            Command::SetBorrower(_) => "set-borrower",
            Command::ReplaceSettings(_) => "replace-settings",
        }
    }
}

/// Resolve a target against the displayed book list
fn resolve_displayed(model: &Model, target: &BookTarget) -> AppResult<Book> {
    match target {
        BookTarget::Index(index) => model.displayed_book(*index).cloned(),
        BookTarget::SerialNumber(sn) => model.book(sn).cloned(),
    }
}

fn set_settings(model: &mut Model, update: &SettingsUpdate) -> AppResult<Executed> {
    if update.is_empty() {
        return Err(AppError::BadRequest("At least one setting must be provided".to_string()));
    }
    let previous = model.user_settings().clone();
    let settings = previous.updated(update)?;
    model.set_user_settings(settings.clone())?;
    Ok(Executed::recorded(
        format!("Settings updated: {}", settings),
        Command::ReplaceSettings(previous),
        Command::ReplaceSettings(settings),
    ))
}

fn replace_settings(model: &mut Model, settings: &UserSettings) -> AppResult<Executed> {
    let previous = model.user_settings().clone();
    model.set_user_settings(settings.clone())?;
    Ok(Executed::recorded(
        format!("Settings restored: {}", settings),
        Command::ReplaceSettings(previous),
        Command::ReplaceSettings(settings.clone()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_settings_reversal() {
        let mut model = Model::default();
        let update = SettingsUpdate { loan_period_days: Some(21), ..Default::default() };
        let executed = Command::SetSettings(update).execute(&mut model).unwrap();
        assert_eq!(model.user_settings().loan_period_days, 21);

        let reversal = executed.reversal.unwrap();
        reversal.undo.execute(&mut model).unwrap();
        assert_eq!(model.user_settings(), &UserSettings::default());
        reversal.redo.execute(&mut model).unwrap();
        assert_eq!(model.user_settings().loan_period_days, 21);
    }

    #[test]
    fn test_empty_settings_update_is_rejected() {
        let mut model = Model::default();
        let result = Command::SetSettings(SettingsUpdate::default()).execute(&mut model);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_undo_outside_history_is_rejected() {
        let mut model = Model::default();
        assert!(matches!(Command::Undo.execute(&mut model), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn test_find_and_list_are_not_recorded() {
        let mut model = Model::default();
        let executed = Command::Find(BookFilter { on_loan: Some(true), ..Default::default() })
            .execute(&mut model)
            .unwrap();
        assert!(executed.reversal.is_none());
        assert_eq!(executed.result.feedback, "0 books listed!");
        assert!(Command::List.execute(&mut model).unwrap().reversal.is_none());
        assert!(model.filter().is_all());
    }

    #[test]
    fn test_only_persisted_changes_mutate() {
        assert!(!Command::Serve(BorrowerId::new("A0001").unwrap()).mutates());
        assert!(!Command::Done.mutates());
        assert!(!Command::List.mutates());
        assert!(Command::Undo.mutates());
        assert!(Command::SetSettings(SettingsUpdate { max_renews: Some(2), ..Default::default() }).mutates());
    }

    #[test]
    fn test_settings_out_of_range_leave_model_unchanged() {
        let mut model = Model::default();
        for update in [
            SettingsUpdate { loan_period_days: Some(4_000_000_000), ..Default::default() },
            SettingsUpdate { renew_period_days: Some(4_000_000_000), ..Default::default() },
            SettingsUpdate { fine_increment: Some(Decimal::MAX), ..Default::default() },
        ] {
            let result = Command::SetSettings(update).execute(&mut model);
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert_eq!(model.user_settings(), &UserSettings::default());
    }
}
