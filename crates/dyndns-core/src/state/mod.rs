// # State Store Implementations
//
// This module provides implementations of the StateStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::{FileStateStore, TIMESTAMP_FILE_NAME};
pub use memory::MemoryStateStore;
