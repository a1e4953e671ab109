//! Error types for skill-sync.

use std::path::PathBuf;

use thiserror::Error;

use crate::sync::normalize::FrontmatterError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration:\n{}", bullet_list(.0))]
    Configuration(Vec<String>),

    #[error("missing canonical block <{tag}> in {}", .source_path.display())]
    MissingBlock { tag: String, source_path: PathBuf },

    #[error("duplicate block <{tag}> in {}", .source_path.display())]
    DuplicateBlock { tag: String, source_path: PathBuf },

    #[error("malformed block <{tag}> at line {line}: {reason}")]
    MalformedBlock {
        tag: String,
        line: usize,
        reason: &'static str,
    },

    #[error("missing profile file: {}", .0.display())]
    MissingProfile(PathBuf),

    #[error("profile must define at least one explicit or delta block: {0}")]
    EmptyProfile(String),

    #[error("profile '{profile}' defines both <{tag}> and <{delta_tag}>")]
    ConflictingProfileBlock {
        profile: String,
        tag: String,
        delta_tag: String,
    },

    #[error("missing marker {marker} in skill source")]
    MissingMarker { marker: &'static str },

    #[error("skill source contains {count} markers; exactly one is allowed")]
    DuplicateMarker { count: usize },

    #[error("rendered output still contains marker {marker}")]
    MarkerInOutput { marker: &'static str },

    #[error("malformed frontmatter: {} ({reason})", .path.display())]
    MalformedFrontmatter {
        path: PathBuf,
        reason: FrontmatterError,
    },

    #[error("missing both {} and {}", .source_path.display(), .generated_path.display())]
    MissingDocuments {
        source_path: PathBuf,
        generated_path: PathBuf,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SyncError {
    /// Whether this error is structural and must abort a run before any skill is touched.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Configuration(_)
                | Self::MissingBlock { .. }
                | Self::DuplicateBlock { .. }
                | Self::MissingProfile(_)
                | Self::EmptyProfile(_)
                | Self::ConflictingProfileBlock { .. }
        )
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, SyncError>;
