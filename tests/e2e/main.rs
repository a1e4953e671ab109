//! E2E test suite entry point.

mod bootstrap_workflow;
mod sync_workflow;
