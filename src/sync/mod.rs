//! Skill boilerplate synchronization.
//!
//! Shared blocks live in a canonical document and a set of profile
//! documents. Every skill source carries a marker that is replaced with the
//! blocks its mapped profile resolves to, producing the generated skill.

pub mod blocks;
pub mod bootstrap;
pub mod canonical;
pub mod engine;
pub mod mapping;
pub mod normalize;
pub mod profiles;
pub mod render;
pub mod report;
pub mod workspace;

use serde::Serialize;

pub use bootstrap::{Bootstrapper, DocumentState};
pub use canonical::CanonicalBlocks;
pub use engine::SyncEngine;
pub use mapping::SkillProfileMap;
pub use normalize::{FrontmatterError, MARKER, Mode, Normalized, normalize};
pub use profiles::{ProfileCache, ProfileStore, Resolution, ResolvedProfile, merge_delta};
pub use render::{BlockSet, render};
pub use report::{Drift, DriftKind, ProfileSummary, SkillIssue, SyncReport};
pub use workspace::{SkillDir, Workspace};

/// What a run is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Report drift and exit non-zero; never write.
    Check,
    /// Rewrite every out-of-sync document.
    Fix,
}
