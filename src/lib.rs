pub mod cli;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod handler;
pub mod init;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod repository;
pub mod session;
pub mod utils;

pub use error::StoryError;
