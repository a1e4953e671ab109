use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::{Config, PROJECT_CONFIG_FILE};

/// Project config written by [`SkillWorkspace::standard`].
pub const STANDARD_CONFIG: &str = r#"[tags]
global = ["context_policy"]
profile = ["delivery_rule", "output_format"]
render_order = ["context_policy", "delivery_rule", "output_format"]
"#;

pub const STANDARD_CANONICAL: &str = "# Shared blocks\n\n<context_policy>\nRead before writing.\n</context_policy>\n";

pub const STANDARD_PROFILE_BASE: &str = "<delivery_rule>\nShip small.\n</delivery_rule>\n\n<output_format>\nMarkdown.\n</output_format>\n";

pub const CONCISE_PROFILE: &str = "<delivery_rule_delta>\nKeep under 50 words.\n</delivery_rule_delta>\n";

/// A throwaway project root with a skills tree.
pub struct SkillWorkspace {
    pub temp_dir: TempDir,
    root: PathBuf,
}

impl Default for SkillWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillWorkspace {
    /// An empty project root.
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// Shared documents for a three-tag layout, a `concise` profile with a
    /// `delivery_rule` delta, and an empty mapping.
    #[must_use]
    pub fn standard() -> Self {
        let ws = Self::new();
        ws.create_file(PROJECT_CONFIG_FILE, STANDARD_CONFIG);
        ws.create_file("skills/_shared/BASE.md", STANDARD_CANONICAL);
        ws.create_file("skills/_shared/profiles/base.md", STANDARD_PROFILE_BASE);
        ws.write_profile("concise", CONCISE_PROFILE);
        ws.create_file("skills/_shared/skill-profiles.json", "{}\n");
        ws
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The config a run against this root would load.
    #[must_use]
    pub fn config(&self) -> Config {
        Config::load(None, &self.root).expect("Failed to load fixture config")
    }

    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    #[must_use]
    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).expect("Failed to read file")
    }

    #[must_use]
    pub fn canonical_path(&self) -> PathBuf {
        self.root.join("skills/_shared/BASE.md")
    }

    pub fn write_profile(&self, name: &str, content: &str) -> PathBuf {
        self.create_file(&format!("skills/_shared/profiles/{name}.md"), content)
    }

    /// Add or replace one entry in the mapping file.
    pub fn map_skill(&self, skill: &str, profile: &str) {
        let path = self.root.join("skills/_shared/skill-profiles.json");
        let mut mapping: BTreeMap<String, String> = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        mapping.insert(skill.to_string(), profile.to_string());
        let raw = serde_json::to_string_pretty(&mapping).expect("Failed to encode mapping");
        self.create_file("skills/_shared/skill-profiles.json", &raw);
    }

    pub fn create_skill_dir(&self, name: &str) -> PathBuf {
        let dir = self.root.join("skills").join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create skill dir");
        dir
    }

    pub fn write_skill_source(&self, name: &str, content: &str) -> PathBuf {
        self.create_file(&format!("skills/{name}/SKILL.src.md"), content)
    }

    pub fn write_skill_generated(&self, name: &str, content: &str) -> PathBuf {
        self.create_file(&format!("skills/{name}/SKILL.md"), content)
    }

    #[must_use]
    pub fn skill_source(&self, name: &str) -> PathBuf {
        self.root.join("skills").join(name).join("SKILL.src.md")
    }

    #[must_use]
    pub fn skill_generated(&self, name: &str) -> PathBuf {
        self.root.join("skills").join(name).join("SKILL.md")
    }
}
