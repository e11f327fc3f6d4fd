//! Undo/redo properties over a full desk session

use rust_decimal::Decimal;

use shelfkeeper::{
    commands::{BookTarget, Command},
    error::AppError,
    models::{EditBook, EditBorrower, NewBook, NewBorrower, SettingsUpdate},
    services::{history::CommandHistory, model::Model},
};

use crate::common::{borrower_id, sn, typical_model};

fn session() -> Vec<Command> {
    vec![
        Command::AddBook(NewBook {
            title: "The Heavenly Sword and the Dragon Saber".to_string(),
            author: "Jin Yong".to_string(),
            genres: vec!["Fiction".to_string(), "Action".to_string()],
        }),
        Command::EditBook {
            target: BookTarget::SerialNumber(sn("B0003")),
            changes: EditBook { genres: Some(vec!["Satire".to_string()]), ..Default::default() },
        },
        Command::RegisterBorrower(NewBorrower {
            name: "Charlotte Oliveiro".to_string(),
            phone: "93210283".to_string(),
            email: "charlotte@example.com".to_string(),
        }),
        Command::SetSettings(SettingsUpdate { fine_increment: Some(Decimal::new(25, 2)), ..Default::default() }),
        Command::Serve(borrower_id("A0001")),
        Command::LoanBook(BookTarget::SerialNumber(sn("B0005"))),
        Command::LoanBook(BookTarget::SerialNumber(sn("B0002"))),
        Command::RenewBook(BookTarget::Index(2)),
        Command::ReturnBook(BookTarget::Index(1)),
        Command::EditBorrower(EditBorrower { phone: Some("81234567".to_string()), ..Default::default() }),
        Command::Done,
        Command::DeleteBook(BookTarget::SerialNumber(sn("B0002"))),
        Command::DeleteBook(BookTarget::SerialNumber(sn("B0001"))),
    ]
}

fn run_session(model: &mut Model, history: &mut CommandHistory) -> usize {
    let commands = session();
    for command in &commands {
        history.execute(command, model).unwrap();
    }
    commands.len()
}

#[test]
fn undoing_everything_restores_initial_state() {
    let mut model = typical_model();
    let mut history = CommandHistory::new();
    let initial = model.snapshot();

    let count = run_session(&mut model, &mut history);
    for _ in 0..count {
        history.execute(&Command::Undo, &mut model).unwrap();
    }
    assert_eq!(model.snapshot(), initial);
    assert!(!model.is_serve_mode());

    let result = history.execute(&Command::Undo, &mut model);
    assert!(matches!(result, Err(AppError::InvalidState(_))));
    assert_eq!(model.snapshot(), initial);
}

#[test]
fn redoing_everything_restores_final_state() {
    let mut model = typical_model();
    let mut history = CommandHistory::new();

    let count = run_session(&mut model, &mut history);
    let last = model.snapshot();
    for _ in 0..count {
        history.execute(&Command::Undo, &mut model).unwrap();
    }
    for _ in 0..count {
        history.execute(&Command::Redo, &mut model).unwrap();
    }
    assert_eq!(model.snapshot(), last);
    assert!(!history.can_redo());
}

#[test]
fn undo_redo_pairs_are_idempotent() {
    let mut model = typical_model();
    let mut history = CommandHistory::new();

    for command in session() {
        history.execute(&command, &mut model).unwrap();
        let after = model.snapshot();
        history.execute(&Command::Undo, &mut model).unwrap();
        history.execute(&Command::Redo, &mut model).unwrap();
        assert_eq!(model.snapshot(), after, "undo/redo of {} changed the model", command.name());
    }
}

#[test]
fn new_command_discards_redo_stack() {
    let mut model = typical_model();
    let mut history = CommandHistory::new();
    run_session(&mut model, &mut history);

    history.execute(&Command::Undo, &mut model).unwrap();
    history.execute(&Command::Undo, &mut model).unwrap();
    assert!(history.can_redo());

    history.execute(&Command::List, &mut model).unwrap();
    assert!(history.can_redo());

    history.execute(&Command::Serve(borrower_id("A0002")), &mut model).unwrap();
    assert!(!history.can_redo());
    let before = model.snapshot();
    let result = history.execute(&Command::Redo, &mut model);
    assert!(matches!(result, Err(AppError::InvalidState(_))));
    assert_eq!(model.snapshot(), before);
}
