//! Library service: runs commands against the model through the history and
//! persists the collections after every change.

pub mod history;
pub mod model;

use crate::{
    clock::Clock,
    commands::{Command, CommandResult},
    error::AppResult,
    models::UserPrefs,
    parser,
    storage::{self, LibraryStorage},
};

use history::CommandHistory;
use model::Model;

pub const MESSAGE_NOT_SAVED: &str = "Warning: the change was applied but could not be saved";

pub struct LibraryService {
    model: Model,
    history: CommandHistory,
    storage: Box<dyn LibraryStorage>,
}

impl LibraryService {
    pub fn new(model: Model, storage: Box<dyn LibraryStorage>) -> Self {
        Self { model, history: CommandHistory::new(), storage }
    }

    /// Load every collection from storage
    pub fn open(storage: Box<dyn LibraryStorage>, default_prefs: UserPrefs) -> AppResult<Self> {
        let snapshot = storage::load_snapshot(storage.as_ref(), default_prefs)?;
        tracing::info!(
            "Loaded {} books, {} loans, {} borrowers",
            snapshot.catalog.len(),
            snapshot.loans.len(),
            snapshot.borrowers.len()
        );
        Ok(Self::new(Model::from_snapshot(snapshot), storage))
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.model.set_clock(clock);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Run a command, saving the library if it may have changed anything.
    /// A failed save does not undo the command: the change stays in memory
    /// and in the history, and the feedback carries a warning.
    pub fn execute(&mut self, command: &Command) -> AppResult<CommandResult> {
        let mut result = self.history.execute(command, &mut self.model).map_err(|e| {
            tracing::debug!("Command {} failed: {}", command.name(), e);
            e
        })?;
        if command.mutates() {
            if let Err(e) = self.save() {
                result.feedback.push_str(&format!("\n{}: {}", MESSAGE_NOT_SAVED, e.user_message()));
            }
        }
        Ok(result)
    }

    /// Parse and run one line of operator input
    pub fn execute_line(&mut self, line: &str) -> AppResult<(Command, CommandResult)> {
        let command = parser::parse(line)?;
        let result = self.execute(&command)?;
        Ok((command, result))
    }

    pub fn save(&self) -> AppResult<()> {
        self.storage.save_snapshot(&self.model.snapshot()).map_err(|e| {
            tracing::error!("Failed to save library: {}", e);
            e
        })
    }
}
