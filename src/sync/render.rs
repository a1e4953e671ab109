//! Marker substitution.

use super::canonical::CanonicalBlocks;
use super::normalize::{MARKER, normalize_text};
use super::profiles::ResolvedProfile;
use crate::error::{Result, SyncError};

/// The effective blocks for one skill, in render order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSet {
    blocks: Vec<(String, String)>,
}

impl BlockSet {
    /// Combine global and profile blocks following `order`.
    pub fn assemble(
        order: &[String],
        canonical: &CanonicalBlocks,
        profile: &ResolvedProfile,
    ) -> Result<Self> {
        let mut blocks = Vec::with_capacity(order.len());
        for tag in order {
            let text = profile
                .get(tag)
                .or_else(|| canonical.get(tag))
                .ok_or_else(|| SyncError::MissingBlock {
                    tag: tag.clone(),
                    source_path: canonical.source.clone(),
                })?;
            blocks.push((tag.clone(), text.to_string()));
        }
        Ok(Self { blocks })
    }

    #[must_use]
    pub const fn from_blocks(blocks: Vec<(String, String)>) -> Self {
        Self { blocks }
    }

    /// Blocks joined by exactly one blank line.
    #[must_use]
    pub fn payload(&self) -> String {
        self.blocks
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Replace the single marker in `source` with `blocks` and normalize the result.
pub fn render(source: &str, blocks: &BlockSet) -> Result<String> {
    match source.matches(MARKER).count() {
        0 => return Err(SyncError::MissingMarker { marker: MARKER }),
        1 => {}
        count => return Err(SyncError::DuplicateMarker { count }),
    }

    let rendered = normalize_text(&source.replacen(MARKER, &blocks.payload(), 1));
    if rendered.contains(MARKER) {
        return Err(SyncError::MarkerInOutput { marker: MARKER });
    }
    Ok(rendered)
}
