#![allow(dead_code)]

pub mod fakes;
pub mod harness;

// Re-export commonly used test utilities
pub use fakes::{FailingMemories, InMemoryMemories, InMemoryMessages};
pub use harness::{fake_services, TestHarness};
