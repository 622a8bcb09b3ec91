//! Perceive library
//!
//! Search orchestration, answer streaming and the session state machine are
//! exported for testing and for driving without the terminal UI.

pub mod answer;
pub mod cli;
pub mod config;
pub mod event;
pub mod logging;
pub mod search;
pub mod session;
pub mod summary;
pub mod tui;
