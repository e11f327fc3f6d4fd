//! Undo/redo sequencing over executed commands

use crate::{
    commands::{Command, CommandResult, Reversal},
    error::{AppError, AppResult},
    services::model::Model,
};

pub const MESSAGE_NOTHING_TO_UNDO: &str = "No command to undo";
pub const MESSAGE_NOTHING_TO_REDO: &str = "No command to redo";

#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryRecord {
    undo: Command,
    redo: Command,
    description: String,
}

impl HistoryRecord {
    fn new(reversal: Reversal, description: String) -> Self {
        Self { undo: reversal.undo, redo: reversal.redo, description }
    }
}

/// Past and future stacks of reversible commands. Every recorded command
/// enters through [`CommandHistory::execute`].
#[derive(Debug, Default)]
pub struct CommandHistory {
    past: Vec<HistoryRecord>,
    future: Vec<HistoryRecord>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a command; `Undo` and `Redo` are routed to the stacks
    pub fn execute(&mut self, command: &Command, model: &mut Model) -> AppResult<CommandResult> {
        match command {
            Command::Undo => return self.undo(model),
            Command::Redo => return self.redo(model),
            _ => {}
        }

        let executed = command.execute(model)?;
        if let Some(reversal) = executed.reversal {
            self.past.push(HistoryRecord::new(reversal, executed.result.feedback.clone()));
            self.future.clear();
        }
        Ok(executed.result)
    }

    pub fn undo(&mut self, model: &mut Model) -> AppResult<CommandResult> {
        let record = self
            .past
            .pop()
            .ok_or_else(|| AppError::InvalidState(MESSAGE_NOTHING_TO_UNDO.to_string()))?;

        if let Err(e) = record.undo.execute(model) {
            tracing::warn!("Undo of '{}' failed: {}", record.description, e);
            self.past.push(record);
            return Err(e);
        }
        tracing::debug!("Undid '{}'", record.description);
        let result = CommandResult::new(format!("Undone: {}", record.description));
        self.future.push(record);
        Ok(result)
    }

    pub fn redo(&mut self, model: &mut Model) -> AppResult<CommandResult> {
        let record = self
            .future
            .pop()
            .ok_or_else(|| AppError::InvalidState(MESSAGE_NOTHING_TO_REDO.to_string()))?;

        let executed = match record.redo.execute(model) {
            Ok(executed) => executed,
            Err(e) => {
                tracing::warn!("Redo of '{}' failed: {}", record.description, e);
                self.future.push(record);
                return Err(e);
            }
        };
        tracing::debug!("Redid '{}'", record.description);
        let result = CommandResult::new(format!("Redone: {}", record.description));
        let replayed = match executed.reversal {
            Some(reversal) => HistoryRecord::new(reversal, record.description),
            None => record,
        };
        self.past.push(replayed);
        Ok(result)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}
