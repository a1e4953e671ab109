//! Paths of the shared documents and the per-skill document pairs.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LayoutConfig;
use crate::error::{Result, SyncError};

const IGNORED_DIRS: &[&str] = &["__MACOSX"];

/// One skill directory and its document pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDir {
    pub name: String,
    /// Author-edited document containing the marker.
    pub source: PathBuf,
    /// Rendered document, owned entirely by the sync engine.
    pub generated: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    layout: LayoutConfig,
}

impl Workspace {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, layout: &LayoutConfig) -> Self {
        Self {
            root: root.into(),
            layout: layout.clone(),
        }
    }

    #[must_use]
    pub fn skills_root(&self) -> PathBuf {
        self.root.join(&self.layout.skills_root)
    }

    #[must_use]
    pub fn shared_dir(&self) -> PathBuf {
        self.skills_root().join(&self.layout.shared_dir)
    }

    #[must_use]
    pub fn canonical_path(&self) -> PathBuf {
        self.shared_dir().join(&self.layout.canonical_file)
    }

    #[must_use]
    pub fn profiles_dir(&self) -> PathBuf {
        self.shared_dir().join(&self.layout.profiles_dir)
    }

    #[must_use]
    pub fn profile_base_name(&self) -> &str {
        &self.layout.profile_base
    }

    #[must_use]
    pub fn mapping_path(&self) -> PathBuf {
        self.shared_dir().join(&self.layout.mapping_file)
    }

    #[must_use]
    pub fn skill(&self, name: &str) -> SkillDir {
        let dir = self.skills_root().join(name);
        SkillDir {
            name: name.to_string(),
            source: dir.join(&self.layout.source_file),
            generated: dir.join(&self.layout.target_file),
        }
    }

    /// Immediate subdirectories of the skills root, sorted by name.
    ///
    /// Hidden directories, the shared directory and archive debris are skipped.
    pub fn skill_dirs(&self) -> Result<Vec<SkillDir>> {
        let root = self.skills_root();
        if !root.is_dir() {
            return Err(SyncError::Config(format!(
                "skills root not found: {}",
                root.display()
            )));
        }

        let mut skills = Vec::new();
        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| {
                SyncError::Config(format!("scan skills root {}: {err}", root.display()))
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if name.starts_with('.') || name == self.layout.shared_dir || IGNORED_DIRS.contains(&name) {
                continue;
            }
            skills.push(self.skill(name));
        }
        Ok(skills)
    }
}
