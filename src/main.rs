//! Shelfkeeper - interactive library desk
//!
//! Reads one command per line from stdin and prints the feedback and the
//! refreshed book lists to stdout. Logs go to stderr or a rolling file.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use shelfkeeper::{
    commands::Command,
    config::{AppConfig, LoggingConfig},
    services::{model::Model, LibraryService},
    storage::JsonStorage,
};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let _guard = init_tracing(&config.logging);

    tracing::info!("Starting Shelfkeeper v{}", env!("CARGO_PKG_VERSION"));

    let storage = JsonStorage::new(&config.storage);
    let mut service = LibraryService::open(Box::new(storage), config.default_prefs())
        .with_context(|| format!("Failed to load library data from {}", config.storage.data_dir))?;

    let overdue = service.model().overdue_books().len();
    if overdue > 0 {
        println!("{} book(s) are overdue", overdue);
    }
    print_books(service.model());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("{}> ", prompt(service.model()));
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match service.execute_line(&line) {
            Ok((command, result)) => {
                println!("{}", result);
                if command == Command::Exit {
                    break;
                }
                print_view(&command, service.model());
            }
            Err(e) => println!("{}", e.user_message()),
        }
    }

    tracing::info!("Shelfkeeper stopped");
    Ok(())
}

/// Install the global subscriber. The returned guard flushes the log file on drop.
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("shelfkeeper={}", config.level).into());

    let (writer, guard) = match &config.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = path.file_name().map(|f| f.to_os_string()).unwrap_or_else(|| "shelfkeeper.log".into());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(io::stderr), None),
    };

    let fmt_layer = fmt::layer().with_writer(writer).with_ansi(config.file.is_none());
    let fmt_layer = if config.format == "json" {
        fmt_layer.json().boxed()
    } else {
        fmt_layer.boxed()
    };

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    guard
}

fn prompt(model: &Model) -> String {
    match model.serving_borrower_id() {
        Some(id) => format!("shelfkeeper [{}]", id),
        None => "shelfkeeper".to_string(),
    }
}

/// Refresh whichever list the command may have changed
fn print_view(command: &Command, model: &Model) {
    match command {
        Command::Find(_) | Command::List | Command::AddBook(_) | Command::DeleteBook(_) | Command::EditBook { .. } => {
            print_books(model)
        }
        Command::Undo | Command::Redo => {
            print_books(model);
            print_borrower_books(model);
        }
        Command::Serve(_)
        | Command::LoanBook(_)
        | Command::ReturnBook(_)
        | Command::RenewBook(_)
        | Command::PayFine(_)
        | Command::EditBorrower(_) => print_borrower_books(model),
        _ => {}
    }
}

fn print_books(model: &Model) {
    for (i, book) in model.filtered_books().iter().enumerate() {
        println!("{:>4}. {}", i + 1, book);
    }
}

fn print_borrower_books(model: &Model) {
    if !model.is_serve_mode() {
        return;
    }
    let borrower = model.serving_borrower();
    println!("Serving {}", borrower);
    for (i, book) in model.serving_borrower_books().iter().enumerate() {
        let due = book
            .loan
            .as_ref()
            .and_then(|loan_id| model.loan(loan_id).ok())
            .map(|loan| format!(" (due {})", loan.due_date))
            .unwrap_or_default();
        println!("{:>4}. {}{}", i + 1, book, due);
    }
}
