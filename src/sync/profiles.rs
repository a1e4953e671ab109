//! Profile blocks: a profile-base document plus named profile documents.
//!
//! For each profile tag a named profile either supplies an explicit block,
//! supplies a delta body that is spliced into the base block, or inherits
//! the base block unchanged.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::blocks;
use super::normalize::unify;
use crate::error::{Result, SyncError};
use crate::utils::fs::read_optional;

/// How one profile tag was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Explicit,
    Delta,
    Inherited,
}

/// Blocks for every profile tag of one named profile.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedProfile {
    pub name: String,
    pub blocks: BTreeMap<String, String>,
    pub resolutions: BTreeMap<String, Resolution>,
}

impl ResolvedProfile {
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.blocks.get(tag).map(String::as_str)
    }
}

/// Resolved profiles for one run, keyed by profile name.
///
/// Populated lazily and never invalidated; the documents it was built from
/// are read once per run.
#[derive(Debug, Default)]
pub struct ProfileCache {
    entries: BTreeMap<String, ResolvedProfile>,
}

impl ProfileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedProfile> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The profile-base blocks and the directory holding named profiles.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
    base_name: String,
    tags: Vec<String>,
    delta_suffix: String,
    base: BTreeMap<String, String>,
}

impl ProfileStore {
    /// Parse the profile-base document, which must define every profile tag.
    pub fn new(
        dir: &Path,
        base_name: &str,
        base_text: &str,
        tags: &[String],
        delta_suffix: &str,
    ) -> Result<Self> {
        let base_path = dir.join(format!("{base_name}.md"));
        let text = unify(base_text);
        let mut base = BTreeMap::new();
        for tag in tags {
            let block = blocks::require(&text, tag, &base_path)?;
            base.insert(tag.clone(), block.to_string());
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            base_name: base_name.to_string(),
            tags: tags.to_vec(),
            delta_suffix: delta_suffix.to_string(),
            base,
        })
    }

    pub fn load(dir: &Path, base_name: &str, tags: &[String], delta_suffix: &str) -> Result<Self> {
        let base_path = dir.join(format!("{base_name}.md"));
        let text = read_optional(&base_path)
            .map_err(|err| {
                SyncError::Config(format!("read profile base {}: {err}", base_path.display()))
            })?
            .ok_or_else(|| {
                SyncError::Config(format!(
                    "missing profile base blocks file: {}",
                    base_path.display()
                ))
            })?;
        Self::new(dir, base_name, &text, tags, delta_suffix)
    }

    #[must_use]
    pub fn base_block(&self, tag: &str) -> Option<&str> {
        self.base.get(tag).map(String::as_str)
    }

    #[must_use]
    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.md"))
    }

    /// Names of every profile document except the base.
    pub fn available(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        if !self.dir.is_dir() {
            return Ok(names);
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if stem != self.base_name {
                names.insert(stem.to_string());
            }
        }
        Ok(names)
    }

    /// Resolve `name`, reading its document only on the first request.
    pub fn resolve<'c>(&self, name: &str, cache: &'c mut ProfileCache) -> Result<&'c ResolvedProfile> {
        match cache.entries.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.profile_path(name);
                if !path.is_file() {
                    return Err(SyncError::MissingProfile(path));
                }
                let text = std::fs::read_to_string(&path)?;
                let resolved = self.resolve_text(name, &text)?;
                Ok(entry.insert(resolved))
            }
        }
    }

    /// Resolve a profile from its document text.
    pub fn resolve_text(&self, name: &str, text: &str) -> Result<ResolvedProfile> {
        let text = unify(text);
        let path = self.profile_path(name);
        let mut blocks = BTreeMap::new();
        let mut resolutions = BTreeMap::new();

        for tag in &self.tags {
            let base_block = self
                .base
                .get(tag)
                .ok_or_else(|| SyncError::MissingBlock {
                    tag: tag.clone(),
                    source_path: self.profile_path(&self.base_name),
                })?;
            let delta_tag = format!("{tag}{}", self.delta_suffix);
            let explicit = blocks::find_unique(&text, tag, &path)?;
            let delta = blocks::find_unique(&text, &delta_tag, &path)?;

            let (block, resolution) = match (explicit, delta) {
                (Some(_), Some(_)) => {
                    return Err(SyncError::ConflictingProfileBlock {
                        profile: name.to_string(),
                        tag: tag.clone(),
                        delta_tag,
                    });
                }
                (Some(span), None) => (span.text(&text).to_string(), Resolution::Explicit),
                (None, Some(span)) => (
                    merge_delta(base_block, tag, span.body(&text))?,
                    Resolution::Delta,
                ),
                (None, None) => (base_block.clone(), Resolution::Inherited),
            };
            debug!(profile = name, tag = %tag, ?resolution, "resolved profile tag");
            blocks.insert(tag.clone(), block);
            resolutions.insert(tag.clone(), resolution);
        }

        if resolutions.values().all(|r| *r == Resolution::Inherited) {
            return Err(SyncError::EmptyProfile(name.to_string()));
        }

        Ok(ResolvedProfile {
            name: name.to_string(),
            blocks,
            resolutions,
        })
    }
}

/// Splice `delta_body` into `base_block` on its own line just before the last `</tag>`.
///
/// A body with nothing but blank lines leaves the base block untouched.
pub fn merge_delta(base_block: &str, tag: &str, delta_body: &str) -> Result<String> {
    let close = blocks::closing(tag);
    let Some(closing_idx) = base_block.rfind(&close) else {
        return Err(SyncError::MalformedBlock {
            tag: tag.to_string(),
            line: 1,
            reason: "base block has no closing delimiter",
        });
    };

    let cleaned = trim_blank_lines(delta_body);
    if cleaned.is_empty() {
        return Ok(base_block.to_string());
    }
    let head = base_block[..closing_idx].trim_end_matches('\n');
    Ok(format!("{head}\n{cleaned}\n{close}"))
}

fn trim_blank_lines(body: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}
