//! Outcome of one sync run.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::profiles::{ResolvedProfile, Resolution};
use super::SyncMode;

/// Why a file is reported as drifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    /// No source yet; fix would bootstrap it from the generated document.
    MissingSource,
    /// The source is not in canonical form.
    SourceNeedsNormalization,
    /// No generated document yet.
    MissingGenerated,
    /// The generated document differs from the render.
    OutOfSync,
    /// The generated document matches the render only after normalization.
    GeneratedNeedsNormalization,
}

impl fmt::Display for DriftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSource => write!(f, "missing source"),
            Self::SourceNeedsNormalization => write!(f, "source needs normalization"),
            Self::MissingGenerated => write!(f, "missing generated skill"),
            Self::OutOfSync => write!(f, "out of sync"),
            Self::GeneratedNeedsNormalization => write!(f, "generated skill needs normalization"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub skill: String,
    pub path: PathBuf,
    pub kind: DriftKind,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.path.display())
    }
}

/// A per-skill failure. Other skills are still processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillIssue {
    pub skill: String,
    pub message: String,
}

impl fmt::Display for SkillIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.skill, self.message)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub explicit: Vec<String>,
    pub delta: Vec<String>,
    pub inherited: Vec<String>,
}

impl From<&ResolvedProfile> for ProfileSummary {
    fn from(profile: &ResolvedProfile) -> Self {
        let pick = |wanted: Resolution| {
            profile
                .resolutions
                .iter()
                .filter(|(_, resolution)| **resolution == wanted)
                .map(|(tag, _)| tag.clone())
                .collect()
        };
        Self {
            name: profile.name.clone(),
            explicit: pick(Resolution::Explicit),
            delta: pick(Resolution::Delta),
            inherited: pick(Resolution::Inherited),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub skills: usize,
    pub out_of_sync: Vec<Drift>,
    pub bootstrapped: Vec<PathBuf>,
    pub changed: Vec<PathBuf>,
    pub errors: Vec<SkillIssue>,
    pub profiles: Vec<ProfileSummary>,
}

impl SyncReport {
    #[must_use]
    pub const fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            skills: 0,
            out_of_sync: Vec::new(),
            bootstrapped: Vec::new(),
            changed: Vec::new(),
            errors: Vec::new(),
            profiles: Vec::new(),
        }
    }

    pub fn issue(&mut self, skill: &str, message: impl Into<String>) {
        self.errors.push(SkillIssue {
            skill: skill.to_string(),
            message: message.into(),
        });
    }

    /// No drift and no per-skill errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.out_of_sync.is_empty() && self.errors.is_empty()
    }

    #[must_use]
    pub fn wrote_nothing(&self) -> bool {
        self.changed.is_empty() && self.bootstrapped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_display() {
        let drift = Drift {
            skill: "alpha".into(),
            path: PathBuf::from("skills/alpha/SKILL.md"),
            kind: DriftKind::OutOfSync,
        };
        assert_eq!(drift.to_string(), "out of sync: skills/alpha/SKILL.md");
    }

    #[test]
    fn test_report_cleanliness() {
        let mut report = SyncReport::new(SyncMode::Check);
        assert!(report.is_clean());
        assert!(report.wrote_nothing());
        report.issue("alpha", "missing marker");
        assert!(!report.is_clean());
        assert_eq!(report.errors[0].to_string(), "alpha: missing marker");
    }
}
