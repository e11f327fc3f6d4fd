//! Shelfkeeper
//!
//! Single-desk library management: a catalog of books, a ledger of loans and
//! a registry of borrowers, driven by line commands with full undo/redo.

pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod repository;
pub mod services;
pub mod storage;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use services::LibraryService;
