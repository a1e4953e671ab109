//! Skill → profile mapping file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, SyncError};

/// Validated table from skill directory name to profile name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillProfileMap {
    entries: BTreeMap<String, String>,
}

impl SkillProfileMap {
    /// Parse a flat JSON object of string → string pairs.
    pub fn parse(raw: &str, source: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|err| {
            SyncError::Config(format!("invalid JSON in {}: {err}", source.display()))
        })?;
        let Value::Object(object) = value else {
            return Err(SyncError::Config(format!(
                "skill profile mapping must be an object: {}",
                source.display()
            )));
        };

        let mut entries = BTreeMap::new();
        for (skill, profile) in object {
            let Value::String(profile) = profile else {
                return Err(SyncError::Config(format!(
                    "skill profile mapping must be string:string pairs: {} (skill '{skill}')",
                    source.display()
                )));
            };
            entries.insert(skill, profile);
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SyncError::Config(format!(
                "missing skill profile mapping file: {} ({err})",
                path.display()
            ))
        })?;
        Self::parse(&raw, path)
    }

    #[must_use]
    pub fn profile_for(&self, skill: &str) -> Option<&str> {
        self.entries.get(skill).map(String::as_str)
    }

    /// Distinct profile names referenced by the mapping.
    #[must_use]
    pub fn profiles(&self) -> BTreeSet<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the mapping in both directions against the skill directories
    /// and the available profiles. Every problem is returned, not just the first.
    #[must_use]
    pub fn validate(&self, skills: &[String], available: &BTreeSet<String>) -> Vec<String> {
        let mut errors = Vec::new();
        let known: BTreeSet<&str> = skills.iter().map(String::as_str).collect();

        if available.is_empty() {
            errors.push("no profile documents found".to_string());
        }

        for skill in &known {
            match self.entries.get(*skill) {
                None => errors.push(format!("missing profile mapping for skill: {skill}")),
                Some(profile) if !available.contains(profile) => errors.push(format!(
                    "unknown profile '{profile}' for skill '{skill}'. Available profiles: {}",
                    available.iter().cloned().collect::<Vec<_>>().join(", ")
                )),
                Some(_) => {}
            }
        }

        for skill in self.entries.keys() {
            if !known.contains(skill.as_str()) {
                errors.push(format!(
                    "profile mapping references unknown skill directory: {skill}"
                ));
            }
        }

        errors
    }
}
