//! skill-sync: keep generated skill documents in sync with shared boilerplate.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod sync;
pub mod test_utils;
pub mod utils;

pub use error::{Result, SyncError};
