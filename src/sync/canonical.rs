//! Global blocks shared verbatim by every skill.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::blocks;
use super::normalize::unify;
use crate::error::{Result, SyncError};

/// Tag → block text for every global tag.
#[derive(Debug, Clone)]
pub struct CanonicalBlocks {
    pub source: PathBuf,
    pub blocks: BTreeMap<String, String>,
}

impl CanonicalBlocks {
    /// Extract exactly one block per tag from `text`.
    pub fn parse(text: &str, tags: &[String], source: &Path) -> Result<Self> {
        let text = unify(text);
        let mut blocks = BTreeMap::new();
        for tag in tags {
            let block = blocks::require(&text, tag, source)?;
            blocks.insert(tag.clone(), block.to_string());
        }
        Ok(Self {
            source: source.to_path_buf(),
            blocks,
        })
    }

    pub fn load(path: &Path, tags: &[String]) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            SyncError::Config(format!("read canonical blocks {}: {err}", path.display()))
        })?;
        let store = Self::parse(&text, tags, path)?;
        debug!(path = %path.display(), tags = store.blocks.len(), "loaded canonical blocks");
        Ok(store)
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.blocks.get(tag).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_parse_every_tag() {
        let text = "# Shared\n\n<delivery_rule>\nShip small.\n</delivery_rule>\n\n<context_policy>\nRead first.\n</context_policy>\n";
        let store =
            CanonicalBlocks::parse(text, &tags(&["delivery_rule", "context_policy"]), Path::new("BASE.md"))
                .unwrap();
        assert_eq!(
            store.get("delivery_rule"),
            Some("<delivery_rule>\nShip small.\n</delivery_rule>")
        );
        assert_eq!(store.get("context_policy"), Some("<context_policy>\nRead first.\n</context_policy>"));
    }

    #[test]
    fn test_crlf_document() {
        let text = "<delivery_rule>\r\nShip small.\r\n</delivery_rule>\r\n";
        let store = CanonicalBlocks::parse(text, &tags(&["delivery_rule"]), Path::new("BASE.md")).unwrap();
        assert_eq!(
            store.get("delivery_rule"),
            Some("<delivery_rule>\nShip small.\n</delivery_rule>")
        );
    }

    #[test]
    fn test_missing_tag_fails() {
        let err = CanonicalBlocks::parse("", &tags(&["delivery_rule"]), Path::new("BASE.md")).unwrap_err();
        assert!(matches!(err, SyncError::MissingBlock { ref tag, .. } if tag == "delivery_rule"));
    }

    #[test]
    fn test_duplicate_tag_fails() {
        let text = "<delivery_rule>\na\n</delivery_rule>\n<delivery_rule>\nb\n</delivery_rule>\n";
        let err = CanonicalBlocks::parse(text, &tags(&["delivery_rule"]), Path::new("BASE.md")).unwrap_err();
        assert!(matches!(err, SyncError::DuplicateBlock { .. }));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CanonicalBlocks::load(&dir.path().join("BASE.md"), &tags(&["a"])).unwrap_err();
        assert!(err.is_configuration());
    }
}
