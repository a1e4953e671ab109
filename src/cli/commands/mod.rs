//! CLI command implementations.

pub mod sync;

use crate::app::AppContext;
use crate::error::Result;
use crate::sync::SyncMode;

/// Run the selected mode. Returns whether the run succeeded.
pub fn run(ctx: &AppContext, mode: SyncMode) -> Result<bool> {
    sync::run(ctx, mode)
}
