//! Library integration tests

mod common;
mod history_tests;
mod persistence_tests;
mod scenario_tests;
