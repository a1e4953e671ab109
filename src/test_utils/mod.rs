//! Shared test utilities for skill-sync.

pub mod fixtures;
