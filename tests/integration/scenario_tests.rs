//! End-to-end desk scenarios run through the command history

use chrono::Duration;
use rust_decimal::Decimal;

use shelfkeeper::{
    commands::{BookTarget, Command},
    error::AppError,
    models::{BookFilter, Loan, LoanId},
    services::{history::CommandHistory, model::Model},
};

use crate::common::{borrower_id, sn, today, typical_model};

fn run(history: &mut CommandHistory, model: &mut Model, command: Command) -> String {
    history.execute(&command, model).unwrap().feedback
}

fn loan_id(value: &str) -> LoanId {
    LoanId::new(value).unwrap()
}

/// Lend `serial` to A0001 from 15 days ago, due yesterday
fn overdue_loan(model: &mut Model, id: &str, serial: &str) -> Loan {
    let loan = Loan::new(
        loan_id(id),
        sn(serial),
        borrower_id("A0001"),
        today() - Duration::days(15),
        today() - Duration::days(1),
    )
    .unwrap();
    model.record_loan(loan.clone()).unwrap();
    loan
}

#[test]
fn delete_then_undo_restores_catalog_order() {
    let mut model = typical_model();
    let mut history = CommandHistory::new();
    let before = model.snapshot();

    run(&mut history, &mut model, Command::DeleteBook(BookTarget::SerialNumber(sn("B0001"))));
    assert!(!model.has_serial_number(&sn("B0001")));
    assert_eq!(model.catalog().len(), 3);

    run(&mut history, &mut model, Command::Undo);
    assert_eq!(model.snapshot(), before);
    assert_eq!(model.displayed_book(1).unwrap().serial_number, sn("B0001"));
}

#[test]
fn delete_loaned_book_then_undo_restores_loan_and_borrower() {
    let mut model = typical_model();
    let loan = overdue_loan(&mut model, "L000001", "B0002");
    let mut history = CommandHistory::new();
    let before = model.snapshot();

    run(&mut history, &mut model, Command::DeleteBook(BookTarget::SerialNumber(sn("B0002"))));
    assert!(!model.has_serial_number(&sn("B0002")));
    let closed = model.loan(&loan.id).unwrap();
    assert_eq!(closed.return_date, Some(today()));
    assert_eq!(closed.fine_amount, Decimal::ZERO);
    let borrower = model.borrower(&borrower_id("A0001")).unwrap();
    assert!(borrower.current_loans.is_empty());
    assert_eq!(borrower.outstanding_fees, Decimal::ZERO);

    run(&mut history, &mut model, Command::Undo);
    assert_eq!(model.snapshot(), before);
    let restored = model.loan(&loan.id).unwrap();
    assert!(restored.is_active());
    assert_eq!(restored.due_date, today() - Duration::days(1));
    assert_eq!(model.book(&sn("B0002")).unwrap().loan, Some(loan.id.clone()));
    assert_eq!(model.overdue_books().len(), 1);

    run(&mut history, &mut model, Command::Redo);
    assert!(!model.has_serial_number(&sn("B0002")));
}

#[test]
fn new_loan_fills_gap_in_loan_ids() {
    let mut model = typical_model();
    overdue_loan(&mut model, "L000001", "B0001");
    overdue_loan(&mut model, "L000002", "B0002");
    overdue_loan(&mut model, "L000004", "B0004");
    let mut history = CommandHistory::new();

    run(&mut history, &mut model, Command::Serve(borrower_id("A0001")));
    run(&mut history, &mut model, Command::LoanBook(BookTarget::SerialNumber(sn("B0003"))));
    assert_eq!(model.book(&sn("B0003")).unwrap().loan, Some(loan_id("L000003")));
    assert_eq!(
        model.serving_borrower().current_loans,
        vec![loan_id("L000001"), loan_id("L000002"), loan_id("L000004"), loan_id("L000003")]
    );
}

#[test]
fn delete_by_index_uses_filtered_list() {
    let mut model = typical_model();
    let mut history = CommandHistory::new();

    let filter = BookFilter { title_keywords: vec!["botter".to_string()], ..Default::default() };
    run(&mut history, &mut model, Command::Find(filter));
    assert_eq!(model.filtered_books().len(), 2);

    run(&mut history, &mut model, Command::DeleteBook(BookTarget::Index(2)));
    assert!(!model.has_serial_number(&sn("B0004")));

    let result = history.execute(&Command::DeleteBook(BookTarget::Index(2)), &mut model);
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(model.catalog().len(), 3);
}

#[test]
fn circulation_at_the_desk() {
    let mut model = typical_model();
    let mut history = CommandHistory::new();

    run(&mut history, &mut model, Command::Serve(borrower_id("A0002")));
    let feedback = run(&mut history, &mut model, Command::LoanBook(BookTarget::Index(3)));
    assert!(feedback.contains("Animal the Farm"));
    run(&mut history, &mut model, Command::RenewBook(BookTarget::Index(1)));

    let loan = model.loan(&loan_id("L000001")).unwrap().clone();
    assert_eq!(loan.due_date, today() + Duration::days(28));

    // Returned five days late
    model.set_clock(shelfkeeper::clock::Clock::Fixed(loan.due_date + Duration::days(5)));
    run(&mut history, &mut model, Command::ReturnBook(BookTarget::Index(1)));
    assert_eq!(model.serving_borrower().outstanding_fees, Decimal::new(50, 2));
    assert!(model.serving_borrower_books().is_empty());

    let overpay = history.execute(&Command::PayFine(Decimal::ONE), &mut model);
    assert!(matches!(overpay, Err(AppError::InvalidState(_))));
    run(&mut history, &mut model, Command::PayFine(Decimal::new(50, 2)));
    assert!(model.serving_borrower().outstanding_fees.is_zero());

    run(&mut history, &mut model, Command::Done);
    let result = history.execute(&Command::LoanBook(BookTarget::Index(1)), &mut model);
    assert!(matches!(result, Err(AppError::InvalidState(_))));
}
