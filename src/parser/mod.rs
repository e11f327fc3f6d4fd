//! Line parser: turns operator input into a [`Command`]
//!
//! A line is a command word followed by a preamble (an index or an amount)
//! and prefixed arguments, e.g. `edit 2 t/New Title g/Fiction`.

pub mod tokenizer;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{
    commands::{BookTarget, Command},
    error::{AppError, AppResult},
    models::{BookFilter, BorrowerId, EditBook, EditBorrower, NewBook, NewBorrower, SerialNumber, SettingsUpdate},
};
use tokenizer::*;

pub const MESSAGE_UNKNOWN_COMMAND: &str = "Unknown command";
pub const MESSAGE_EMPTY_INPUT: &str = "Please enter a command";

/// Parse one line of input
pub fn parse(line: &str) -> AppResult<Command> {
    let line = line.trim();
    if line.is_empty() {
        return Err(AppError::BadRequest(MESSAGE_EMPTY_INPUT.to_string()));
    }
    let (word, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match word {
        "add" => parse_add(args),
        "delete" => Ok(Command::DeleteBook(parse_target(args, "delete INDEX | delete sn/SERIAL_NUMBER")?)),
        "edit" => parse_edit(args),
        "find" => parse_find(args),
        "list" => no_args(args, Command::List),
        "register" => parse_register(args),
        "editborrower" => parse_edit_borrower(args),
        "serve" => parse_serve(args),
        "done" => no_args(args, Command::Done),
        "loan" => Ok(Command::LoanBook(parse_target(args, "loan INDEX | loan sn/SERIAL_NUMBER")?)),
        "return" => Ok(Command::ReturnBook(parse_target(args, "return INDEX | return sn/SERIAL_NUMBER")?)),
        "renew" => Ok(Command::RenewBook(parse_target(args, "renew INDEX | renew sn/SERIAL_NUMBER")?)),
        "pay" => parse_pay(args),
        "set" => parse_set(args),
        "undo" => no_args(args, Command::Undo),
        "redo" => no_args(args, Command::Redo),
        "exit" => no_args(args, Command::Exit),
        _ => Err(AppError::BadRequest(format!("{}: {}", MESSAGE_UNKNOWN_COMMAND, word))),
    }
}

fn invalid_format(usage: &str) -> AppError {
    AppError::BadRequest(format!("Invalid command format! Usage: {}", usage))
}

fn no_args(args: &str, command: Command) -> AppResult<Command> {
    if args.trim().is_empty() {
        Ok(command)
    } else {
        Err(invalid_format(command.name()))
    }
}

fn parse_index(value: &str) -> AppResult<usize> {
    match value.trim().parse::<usize>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(AppError::BadRequest("Index is not a non-zero unsigned integer".to_string())),
    }
}

fn parse_serial_number(value: &str) -> AppResult<SerialNumber> {
    SerialNumber::new(value).map_err(|_| AppError::BadRequest(SerialNumber::MESSAGE_CONSTRAINTS.to_string()))
}

/// Either a bare index or `sn/SERIAL_NUMBER`, never both
fn target_from(map: &ArgumentMap, usage: &str) -> AppResult<BookTarget> {
    map.verify_no_duplicates(&[PREFIX_SERIAL_NUMBER])?;
    match (map.preamble().is_empty(), map.value(PREFIX_SERIAL_NUMBER)) {
        (false, None) => Ok(BookTarget::Index(parse_index(map.preamble())?)),
        (true, Some(sn)) => Ok(BookTarget::SerialNumber(parse_serial_number(sn)?)),
        _ => Err(invalid_format(usage)),
    }
}

fn parse_target(args: &str, usage: &str) -> AppResult<BookTarget> {
    target_from(&ArgumentMap::tokenize(args, &[PREFIX_SERIAL_NUMBER]), usage)
}

/// Genre values with blanks dropped, so `g/` alone clears the genres
fn genres(map: &ArgumentMap) -> Vec<String> {
    map.all_values(PREFIX_GENRE).iter().filter(|g| !g.is_empty()).cloned().collect()
}

fn parse_add(args: &str) -> AppResult<Command> {
    const USAGE: &str = "add t/TITLE a/AUTHOR [g/GENRE]...";
    let map = ArgumentMap::tokenize(args, &[PREFIX_TITLE, PREFIX_AUTHOR, PREFIX_GENRE]);
    let (Some(title), Some(author)) = (map.value(PREFIX_TITLE), map.value(PREFIX_AUTHOR)) else {
        return Err(invalid_format(USAGE));
    };
    if !map.preamble().is_empty() {
        return Err(invalid_format(USAGE));
    }
    map.verify_no_duplicates(&[PREFIX_TITLE, PREFIX_AUTHOR])?;
    Ok(Command::AddBook(NewBook {
        title: title.to_string(),
        author: author.to_string(),
        genres: genres(&map),
    }))
}

fn parse_edit(args: &str) -> AppResult<Command> {
    const USAGE: &str = "edit INDEX|sn/SERIAL_NUMBER [t/TITLE] [a/AUTHOR] [g/GENRE]...";
    let map = ArgumentMap::tokenize(args, &[PREFIX_SERIAL_NUMBER, PREFIX_TITLE, PREFIX_AUTHOR, PREFIX_GENRE]);
    let target = target_from(&map, USAGE)?;
    map.verify_no_duplicates(&[PREFIX_TITLE, PREFIX_AUTHOR])?;
    let changes = EditBook {
        title: map.value(PREFIX_TITLE).map(str::to_string),
        author: map.value(PREFIX_AUTHOR).map(str::to_string),
        genres: map.has(PREFIX_GENRE).then(|| genres(&map)),
    };
    if changes.is_empty() {
        return Err(AppError::BadRequest("At least one field to edit must be provided".to_string()));
    }
    Ok(Command::EditBook { target, changes })
}

fn keywords(value: Option<&str>) -> Vec<String> {
    value.map(|v| v.split_whitespace().map(str::to_string).collect()).unwrap_or_default()
}

fn parse_find(args: &str) -> AppResult<Command> {
    const USAGE: &str = "find [t/KEYWORDS] [a/KEYWORDS] [g/GENRE]... [l/yes|no]";
    let map = ArgumentMap::tokenize(args, &[PREFIX_TITLE, PREFIX_AUTHOR, PREFIX_GENRE, PREFIX_LOAN_STATUS]);
    if !map.preamble().is_empty() {
        return Err(invalid_format(USAGE));
    }
    map.verify_no_duplicates(&[PREFIX_TITLE, PREFIX_AUTHOR, PREFIX_LOAN_STATUS])?;
    let on_loan = match map.value(PREFIX_LOAN_STATUS).map(str::to_lowercase).as_deref() {
        None => None,
        Some("yes") | Some("true") => Some(true),
        Some("no") | Some("false") => Some(false),
        Some(_) => return Err(invalid_format(USAGE)),
    };
    let filter = BookFilter {
        title_keywords: keywords(map.value(PREFIX_TITLE)),
        author_keywords: keywords(map.value(PREFIX_AUTHOR)),
        genres: genres(&map),
        on_loan,
    };
    if filter.is_all() {
        return Err(invalid_format(USAGE));
    }
    Ok(Command::Find(filter))
}

fn parse_register(args: &str) -> AppResult<Command> {
    const USAGE: &str = "register n/NAME p/PHONE e/EMAIL";
    let map = ArgumentMap::tokenize(args, &[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL]);
    let (Some(name), Some(phone), Some(email)) =
        (map.value(PREFIX_NAME), map.value(PREFIX_PHONE), map.value(PREFIX_EMAIL))
    else {
        return Err(invalid_format(USAGE));
    };
    if !map.preamble().is_empty() {
        return Err(invalid_format(USAGE));
    }
    map.verify_no_duplicates(&[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL])?;
    Ok(Command::RegisterBorrower(NewBorrower {
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
    }))
}

fn parse_edit_borrower(args: &str) -> AppResult<Command> {
    const USAGE: &str = "editborrower [n/NAME] [p/PHONE] [e/EMAIL]";
    let map = ArgumentMap::tokenize(args, &[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL]);
    if !map.preamble().is_empty() {
        return Err(invalid_format(USAGE));
    }
    map.verify_no_duplicates(&[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL])?;
    let changes = EditBorrower {
        name: map.value(PREFIX_NAME).map(str::to_string),
        phone: map.value(PREFIX_PHONE).map(str::to_string),
        email: map.value(PREFIX_EMAIL).map(str::to_string),
    };
    if changes.is_empty() {
        return Err(AppError::BadRequest("At least one field to edit must be provided".to_string()));
    }
    Ok(Command::EditBorrower(changes))
}

fn parse_serve(args: &str) -> AppResult<Command> {
    const USAGE: &str = "serve id/BORROWER_ID";
    let map = ArgumentMap::tokenize(args, &[PREFIX_BORROWER_ID]);
    match (map.preamble().is_empty(), map.value(PREFIX_BORROWER_ID)) {
        (true, Some(id)) => {
            map.verify_no_duplicates(&[PREFIX_BORROWER_ID])?;
            let id = BorrowerId::new(id)
                .map_err(|_| AppError::BadRequest(BorrowerId::MESSAGE_CONSTRAINTS.to_string()))?;
            Ok(Command::Serve(id))
        }
        _ => Err(invalid_format(USAGE)),
    }
}

fn parse_pay(args: &str) -> AppResult<Command> {
    let amount = Decimal::from_str(args.trim().trim_start_matches('$'))
        .map_err(|_| invalid_format("pay AMOUNT"))?;
    Ok(Command::PayFine(amount))
}

fn parse_number<T: FromStr>(map: &ArgumentMap, prefix: &str, field: &str) -> AppResult<Option<T>> {
    map.value(prefix)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| AppError::BadRequest(format!("{} must be a number: {}", field, value)))
        })
        .transpose()
}

fn parse_set(args: &str) -> AppResult<Command> {
    const USAGE: &str = "set [lp/LOAN_PERIOD] [rp/RENEW_PERIOD] [fi/FINE_INCREMENT] [mr/MAX_RENEWS]";
    let prefixes = [PREFIX_LOAN_PERIOD, PREFIX_RENEW_PERIOD, PREFIX_FINE_INCREMENT, PREFIX_MAX_RENEWS];
    let map = ArgumentMap::tokenize(args, &prefixes);
    if !map.preamble().is_empty() {
        return Err(invalid_format(USAGE));
    }
    map.verify_no_duplicates(&prefixes)?;
    let update = SettingsUpdate {
        loan_period_days: parse_number(&map, PREFIX_LOAN_PERIOD, "Loan period")?,
        renew_period_days: parse_number(&map, PREFIX_RENEW_PERIOD, "Renew period")?,
        fine_increment: parse_number(&map, PREFIX_FINE_INCREMENT, "Fine increment")?,
        max_renews: parse_number(&map, PREFIX_MAX_RENEWS, "Max renews")?,
    };
    if update.is_empty() {
        return Err(invalid_format(USAGE));
    }
    Ok(Command::SetSettings(update))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_request(line: &str) -> bool {
        matches!(parse(line), Err(AppError::BadRequest(_)))
    }

    #[test]
    fn test_parse_add() {
        let command = parse("add t/Harry Botter a/J K Rowling g/Fiction g/Magic").unwrap();
        assert_eq!(
            command,
            Command::AddBook(NewBook {
                title: "Harry Botter".to_string(),
                author: "J K Rowling".to_string(),
                genres: vec!["Fiction".to_string(), "Magic".to_string()],
            })
        );
        assert!(bad_request("add t/Harry Botter"));
        assert!(bad_request("add 1 t/Harry Botter a/J K Rowling"));
        assert!(bad_request("add t/One t/Two a/J K Rowling"));
    }

    #[test]
    fn test_parse_delete_targets() {
        assert_eq!(parse("delete 1").unwrap(), Command::DeleteBook(BookTarget::Index(1)));
        assert_eq!(
            parse("delete sn/B0001").unwrap(),
            Command::DeleteBook(BookTarget::SerialNumber(SerialNumber::new("B0001").unwrap()))
        );
        assert!(bad_request("delete 0"));
        assert!(bad_request("delete -3"));
        assert!(bad_request("delete"));
        assert!(bad_request("delete 1 sn/B0001"));
        assert!(bad_request("delete sn/B01"));
    }

    #[test]
    fn test_parse_edit() {
        let command = parse("edit 2 g/").unwrap();
        assert_eq!(
            command,
            Command::EditBook {
                target: BookTarget::Index(2),
                changes: EditBook { genres: Some(Vec::new()), ..Default::default() },
            }
        );
        assert!(bad_request("edit 2"));
    }

    #[test]
    fn test_parse_find() {
        let command = parse("find t/harry condor l/no").unwrap();
        assert_eq!(
            command,
            Command::Find(BookFilter {
                title_keywords: vec!["harry".to_string(), "condor".to_string()],
                on_loan: Some(false),
                ..Default::default()
            })
        );
        assert!(bad_request("find"));
        assert!(bad_request("find l/maybe"));
    }

    #[test]
    fn test_parse_borrower_commands() {
        assert_eq!(
            parse("register n/Alex Yeoh p/87438807 e/alexyeoh@example.com").unwrap(),
            Command::RegisterBorrower(NewBorrower {
                name: "Alex Yeoh".to_string(),
                phone: "87438807".to_string(),
                email: "alexyeoh@example.com".to_string(),
            })
        );
        assert_eq!(parse("serve id/A0001").unwrap(), Command::Serve(BorrowerId::new("A0001").unwrap()));
        assert!(bad_request("serve A0001"));
        assert!(bad_request("serve id/B0001"));
        assert!(bad_request("editborrower"));
        assert_eq!(parse("pay $1.50").unwrap(), Command::PayFine(Decimal::new(150, 2)));
        assert!(bad_request("pay lots"));
    }

    #[test]
    fn test_parse_set() {
        assert_eq!(
            parse("set lp/21 fi/0.25").unwrap(),
            Command::SetSettings(SettingsUpdate {
                loan_period_days: Some(21),
                fine_increment: Some(Decimal::new(25, 2)),
                ..Default::default()
            })
        );
        assert!(bad_request("set"));
        assert!(bad_request("set lp/soon"));
    }

    #[test]
    fn test_parse_simple_words() {
        assert_eq!(parse("list").unwrap(), Command::List);
        assert_eq!(parse("  undo ").unwrap(), Command::Undo);
        assert_eq!(parse("redo").unwrap(), Command::Redo);
        assert_eq!(parse("done").unwrap(), Command::Done);
        assert_eq!(parse("exit").unwrap(), Command::Exit);
        assert!(bad_request("undo 2"));
        assert!(bad_request(""));
        assert!(bad_request("borrow 1"));
    }
}
