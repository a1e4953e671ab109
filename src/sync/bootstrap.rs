//! Recover a missing skill source from its generated document.

use std::path::Path;

use tracing::debug;

use super::blocks;
use super::normalize::{FrontmatterError, MARKER, Mode, normalize};
use crate::error::{Result, SyncError};

/// Which of a skill's two documents exist on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Source and generated document both present.
    Complete,
    /// Only the source exists; rendering creates the generated document.
    SourceOnly,
    /// Only the generated document exists; the source must be bootstrapped.
    GeneratedOnly,
    /// Neither exists. Nothing can be recovered.
    Missing,
}

impl DocumentState {
    #[must_use]
    pub fn detect(source: &Path, generated: &Path) -> Self {
        match (source.is_file(), generated.is_file()) {
            (true, true) => Self::Complete,
            (true, false) => Self::SourceOnly,
            (false, true) => Self::GeneratedOnly,
            (false, false) => Self::Missing,
        }
    }

    #[must_use]
    pub const fn has_generated(self) -> bool {
        matches!(self, Self::Complete | Self::GeneratedOnly)
    }
}

/// Settings the bootstrapper needs.
#[derive(Debug, Clone, Copy)]
pub struct Bootstrapper<'a> {
    /// Every tag whose block may appear in a generated document.
    pub tags: &'a [String],
    /// Closing delimiters to place the marker after, in preference order.
    pub anchors: &'a [String],
    pub require_frontmatter: bool,
}

impl Bootstrapper<'_> {
    /// Derive a source document from `generated_text`.
    ///
    /// The first block of every known tag is removed. If no marker remains,
    /// one is inserted after the first anchor closing delimiter found, or at
    /// the end of the text.
    pub fn source_from_generated(&self, generated_text: &str, generated_path: &Path) -> Result<String> {
        let generated = normalize(generated_text, Mode::Fix);
        self.ensure_frontmatter(generated.frontmatter_error, generated_path)?;

        let mut stripped = generated.text;
        for tag in self.tags {
            if let Some(span) = blocks::scan(&stripped, tag)?.first() {
                stripped.replace_range(span.start..span.end, "");
            }
        }
        let mut stripped = stripped.trim_end_matches('\n').to_string();

        if !stripped.contains(MARKER) {
            let idx = self.insertion_index(&stripped);
            debug!(offset = idx, "inserting marker into bootstrapped source");
            stripped.insert_str(idx, &format!("\n\n{MARKER}"));
        }

        let source = normalize(&stripped, Mode::Fix);
        self.ensure_frontmatter(source.frontmatter_error, generated_path)?;
        Ok(source.text)
    }

    fn insertion_index(&self, text: &str) -> usize {
        self.anchors
            .iter()
            .find_map(|anchor| blocks::closing_line_end(text, anchor))
            .unwrap_or(text.len())
    }

    fn ensure_frontmatter(&self, error: Option<FrontmatterError>, path: &Path) -> Result<()> {
        match error {
            Some(FrontmatterError::MissingOpening) if !self.require_frontmatter => Ok(()),
            Some(reason) => Err(SyncError::MalformedFrontmatter {
                path: path.to_path_buf(),
                reason,
            }),
            None => Ok(()),
        }
    }
}
