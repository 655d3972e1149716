//! CLI command handlers.

pub mod handler;
pub mod history;
pub mod turn;
