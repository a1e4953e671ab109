use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::utils::fs::read_optional;

/// Name of the optional project config file at the workspace root.
pub const PROJECT_CONFIG_FILE: &str = "skill-sync.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub tags: TagsConfig,
    #[serde(default)]
    pub checks: ChecksConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SKILL_SYNC_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                SyncError::Config(format!("config file not found: {}", path.display()))
            })?;
            config.merge_patch(patch);
        } else if let Some(project) = Self::load_patch(&root.join(PROJECT_CONFIG_FILE))? {
            config.merge_patch(project);
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        let Some(raw) = read_optional(path)
            .map_err(|err| SyncError::Config(format!("read config {}: {err}", path.display())))?
        else {
            return Ok(None);
        };
        let patch = toml::from_str(&raw)
            .map_err(|err| SyncError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.layout {
            self.layout.merge(patch);
        }
        if let Some(patch) = patch.tags {
            self.tags.merge(patch);
        }
        if let Some(patch) = patch.checks {
            self.checks.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("SKILL_SYNC_SKILLS_ROOT") {
            self.layout.skills_root = PathBuf::from(value);
        }
        if let Some(value) = env_string("SKILL_SYNC_SOURCE_FILE") {
            self.layout.source_file = value;
        }
        if let Some(value) = env_string("SKILL_SYNC_TARGET_FILE") {
            self.layout.target_file = value;
        }
        if let Some(value) = env_bool("SKILL_SYNC_REQUIRE_FRONTMATTER") {
            self.checks.require_frontmatter = value;
        }
        if let Some(value) = env_usize("SKILL_SYNC_SOURCE_LINE_CAP")? {
            self.checks.source_line_cap = Some(value);
        }
        Ok(())
    }

    /// Reject tag configurations the renderer cannot honor.
    pub fn validate(&self) -> Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Configuration(errors))
        }
    }

    /// Every problem `validate` would report, in discovery order.
    #[must_use]
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let tags = &self.tags;

        if tags.global.is_empty() && tags.profile.is_empty() {
            errors.push("no tags configured".to_string());
        }
        if tags.delta_suffix.is_empty() {
            errors.push("delta suffix must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for tag in tags.global.iter().chain(&tags.profile) {
            if !is_tag_name(tag) {
                errors.push(format!("invalid tag name: '{tag}'"));
            }
            if !seen.insert(tag.as_str()) {
                errors.push(format!("tag listed more than once: {tag}"));
            }
            if !tags.delta_suffix.is_empty() && tag.ends_with(&tags.delta_suffix) {
                errors.push(format!(
                    "tag '{tag}' must not end with the delta suffix '{}'",
                    tags.delta_suffix
                ));
            }
        }

        let mut rendered = HashSet::new();
        for tag in &tags.render_order {
            if !rendered.insert(tag.as_str()) {
                errors.push(format!("render order lists {tag} more than once"));
            }
            if !seen.contains(tag.as_str()) {
                errors.push(format!("render order names unknown tag: {tag}"));
            }
        }
        for tag in &seen {
            if !rendered.contains(tag) {
                errors.push(format!("render order is missing tag: {tag}"));
            }
        }

        for anchor in &tags.anchors {
            if !is_tag_name(anchor) {
                errors.push(format!("invalid anchor name: '{anchor}'"));
            }
        }

        if self.layout.source_file == self.layout.target_file {
            errors.push(format!(
                "source and target file names must differ (both are {})",
                self.layout.source_file
            ));
        }

        errors
    }
}

/// Where the shared documents and skills live, relative to the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub skills_root: PathBuf,
    pub shared_dir: String,
    pub canonical_file: String,
    pub profiles_dir: String,
    pub profile_base: String,
    pub mapping_file: String,
    pub source_file: String,
    pub target_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            skills_root: PathBuf::from("skills"),
            shared_dir: "_shared".to_string(),
            canonical_file: "BASE.md".to_string(),
            profiles_dir: "profiles".to_string(),
            profile_base: "base".to_string(),
            mapping_file: "skill-profiles.json".to_string(),
            source_file: "SKILL.src.md".to_string(),
            target_file: "SKILL.md".to_string(),
        }
    }
}

impl LayoutConfig {
    fn merge(&mut self, patch: LayoutPatch) {
        if let Some(value) = patch.skills_root {
            self.skills_root = value;
        }
        if let Some(value) = patch.shared_dir {
            self.shared_dir = value;
        }
        if let Some(value) = patch.canonical_file {
            self.canonical_file = value;
        }
        if let Some(value) = patch.profiles_dir {
            self.profiles_dir = value;
        }
        if let Some(value) = patch.profile_base {
            self.profile_base = value;
        }
        if let Some(value) = patch.mapping_file {
            self.mapping_file = value;
        }
        if let Some(value) = patch.source_file {
            self.source_file = value;
        }
        if let Some(value) = patch.target_file {
            self.target_file = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Tags resolved identically for every skill from the canonical document.
    pub global: Vec<String>,
    /// Tags that vary by profile.
    pub profile: Vec<String>,
    /// Total order in which blocks are substituted for the marker.
    pub render_order: Vec<String>,
    pub delta_suffix: String,
    /// Closing delimiters the bootstrapper inserts the marker after, in preference order.
    pub anchors: Vec<String>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            global: strings(&[
                "context_policy",
                "template_convention",
                "questioning_loop",
                "precision_contract",
                "anti_enterprise",
                "delivery_rule",
            ]),
            profile: strings(&["intent_lock", "output_format", "action_policy"]),
            render_order: strings(&[
                "context_policy",
                "template_convention",
                "intent_lock",
                "questioning_loop",
                "precision_contract",
                "anti_enterprise",
                "delivery_rule",
                "output_format",
                "action_policy",
            ]),
            delta_suffix: "_delta".to_string(),
            anchors: strings(&["clarification_rule", "source_of_truth"]),
        }
    }
}

impl TagsConfig {
    fn merge(&mut self, patch: TagsPatch) {
        if let Some(values) = patch.global {
            self.global = values;
        }
        if let Some(values) = patch.profile {
            self.profile = values;
        }
        if let Some(values) = patch.render_order {
            self.render_order = values;
        }
        if let Some(value) = patch.delta_suffix {
            self.delta_suffix = value;
        }
        if let Some(values) = patch.anchors {
            self.anchors = values;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    pub require_frontmatter: bool,
    /// Maximum number of lines allowed in a skill source document.
    pub source_line_cap: Option<usize>,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            require_frontmatter: true,
            source_line_cap: None,
        }
    }
}

impl ChecksConfig {
    fn merge(&mut self, patch: ChecksPatch) {
        if let Some(value) = patch.require_frontmatter {
            self.require_frontmatter = value;
        }
        if let Some(value) = patch.source_line_cap {
            self.source_line_cap = Some(value);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    layout: Option<LayoutPatch>,
    tags: Option<TagsPatch>,
    checks: Option<ChecksPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutPatch {
    skills_root: Option<PathBuf>,
    shared_dir: Option<String>,
    canonical_file: Option<String>,
    profiles_dir: Option<String>,
    profile_base: Option<String>,
    mapping_file: Option<String>,
    source_file: Option<String>,
    target_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TagsPatch {
    global: Option<Vec<String>>,
    profile: Option<Vec<String>>,
    render_order: Option<Vec<String>>,
    delta_suffix: Option<String>,
    anchors: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChecksPatch {
    require_frontmatter: Option<bool>,
    source_line_cap: Option<usize>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn is_tag_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<usize>().map(Some).map_err(|err| {
            SyncError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tags.render_order.len(), 9);
        assert!(config.checks.require_frontmatter);
    }

    #[test]
    fn test_project_patch_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            r#"
                [layout]
                source_file = "SOURCE.md"

                [checks]
                source_line_cap = 80
            "#,
        )
        .unwrap();

        let patch = Config::load_patch(&dir.path().join(PROJECT_CONFIG_FILE))
            .unwrap()
            .unwrap();
        let mut config = Config::default();
        config.merge_patch(patch);

        assert_eq!(config.layout.source_file, "SOURCE.md");
        assert_eq!(config.layout.target_file, "SKILL.md");
        assert_eq!(config.checks.source_line_cap, Some(80));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[layout]\nbogus = 1\n").unwrap();
        let err = Config::load_patch(&path).unwrap_err();
        assert!(err.to_string().contains("parse config"));
    }

    #[test]
    fn test_render_order_must_cover_every_tag() {
        let mut config = Config::default();
        config.tags.render_order.pop();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render order is missing tag: action_policy"));
    }

    #[test]
    fn test_load_leaves_validation_to_the_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "[tags]\nrender_order = []\n",
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();
        let errors = config.validation_errors();
        assert_eq!(errors.len(), 9);
        assert!(errors.iter().all(|error| error.starts_with("render order is missing tag")));
    }

    #[test]
    fn test_overlapping_tags_rejected() {
        let mut config = Config::default();
        config.tags.profile.push("delivery_rule".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_tag_with_delta_suffix_rejected() {
        let mut config = Config::default();
        config.tags.global.push("rule_delta".to_string());
        config.tags.render_order.push("rule_delta".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("delta suffix"));
    }
}
