//! Drives a full check or fix run over every skill.

use std::path::Path;

use tracing::{debug, info, warn};

use super::bootstrap::{Bootstrapper, DocumentState};
use super::canonical::CanonicalBlocks;
use super::mapping::SkillProfileMap;
use super::normalize::{FrontmatterError, Mode, Normalized, normalize};
use super::profiles::{ProfileCache, ProfileStore};
use super::render::{BlockSet, render};
use super::report::{Drift, DriftKind, ProfileSummary, SyncReport};
use super::workspace::{SkillDir, Workspace};
use super::SyncMode;
use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::utils::fs::{read_text, write_atomic};

/// Everything loaded and validated before any skill is processed.
#[derive(Debug)]
pub struct Prepared {
    pub canonical: CanonicalBlocks,
    pub profiles: ProfileStore,
    pub mapping: SkillProfileMap,
    pub skills: Vec<SkillDir>,
    pub cache: ProfileCache,
}

pub struct SyncEngine<'a> {
    config: &'a Config,
    workspace: Workspace,
}

impl<'a> SyncEngine<'a> {
    #[must_use]
    pub fn new(root: &Path, config: &'a Config) -> Self {
        Self {
            config,
            workspace: Workspace::new(root, &config.layout),
        }
    }

    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Validate the config, load shared documents and validate the mapping.
    ///
    /// Every configuration problem found is reported together.
    pub fn prepare(&self) -> Result<Prepared> {
        let tags = &self.config.tags;
        let mut errors = self.config.validation_errors();

        let canonical = CanonicalBlocks::load(&self.workspace.canonical_path(), &tags.global)
            .map_err(|err| errors.push(err.to_string()))
            .ok();
        let profiles = ProfileStore::load(
            &self.workspace.profiles_dir(),
            self.workspace.profile_base_name(),
            &tags.profile,
            &tags.delta_suffix,
        )
        .map_err(|err| errors.push(err.to_string()))
        .ok();
        let skills = self
            .workspace
            .skill_dirs()
            .map_err(|err| errors.push(err.to_string()))
            .ok();
        let mapping = SkillProfileMap::load(&self.workspace.mapping_path())
            .map_err(|err| errors.push(err.to_string()))
            .ok();

        let mut cache = ProfileCache::new();
        if let (Some(profiles), Some(skills), Some(mapping)) = (&profiles, &skills, &mapping) {
            match profiles.available() {
                Ok(available) => {
                    let names: Vec<String> = skills.iter().map(|skill| skill.name.clone()).collect();
                    errors.extend(mapping.validate(&names, &available));
                    for name in mapping.profiles() {
                        if !available.contains(name) {
                            continue;
                        }
                        if let Err(err) = profiles.resolve(name, &mut cache) {
                            errors.push(err.to_string());
                        }
                    }
                }
                Err(err) => errors.push(err.to_string()),
            }
        }

        match (canonical, profiles, skills, mapping) {
            (Some(canonical), Some(profiles), Some(skills), Some(mapping)) if errors.is_empty() => {
                debug!(
                    skills = skills.len(),
                    profiles = cache.len(),
                    "sync configuration loaded"
                );
                Ok(Prepared {
                    canonical,
                    profiles,
                    mapping,
                    skills,
                    cache,
                })
            }
            _ => Err(SyncError::Configuration(errors)),
        }
    }

    /// Run in `mode` over every skill.
    ///
    /// Configuration errors abort before any skill is touched. Per-skill
    /// failures are collected into the report.
    pub fn run(&self, mode: SyncMode) -> Result<SyncReport> {
        let mut prepared = self.prepare()?;
        let mut report = SyncReport::new(mode);
        report.skills = prepared.skills.len();

        for skill in &prepared.skills {
            let blocks = match self.blocks_for(
                skill,
                &prepared.canonical,
                &prepared.profiles,
                &prepared.mapping,
                &mut prepared.cache,
            ) {
                Ok(blocks) => blocks,
                Err(err) => {
                    report.issue(&skill.name, err.to_string());
                    continue;
                }
            };

            let outcome = match mode {
                SyncMode::Check => self.check_skill(skill, &blocks, &mut report),
                SyncMode::Fix => self.fix_skill(skill, &blocks, &mut report),
            };
            if let Err(err) = outcome {
                warn!(skill = %skill.name, error = %err, "skill failed");
                report.issue(&skill.name, err.to_string());
            }
        }

        report.profiles = prepared
            .mapping
            .profiles()
            .into_iter()
            .filter_map(|name| prepared.cache.get(name).map(ProfileSummary::from))
            .collect();

        info!(
            mode = ?mode,
            skills = report.skills,
            out_of_sync = report.out_of_sync.len(),
            changed = report.changed.len(),
            bootstrapped = report.bootstrapped.len(),
            errors = report.errors.len(),
            "sync finished"
        );
        Ok(report)
    }

    fn blocks_for(
        &self,
        skill: &SkillDir,
        canonical: &CanonicalBlocks,
        profiles: &ProfileStore,
        mapping: &SkillProfileMap,
        cache: &mut ProfileCache,
    ) -> Result<BlockSet> {
        let name = mapping.profile_for(&skill.name).ok_or_else(|| {
            SyncError::Config(format!("missing profile mapping for skill: {}", skill.name))
        })?;
        let profile = profiles.resolve(name, cache)?;
        BlockSet::assemble(&self.config.tags.render_order, canonical, profile)
    }

    fn bootstrapper(&self) -> Bootstrapper<'_> {
        Bootstrapper {
            tags: &self.config.tags.render_order,
            anchors: &self.config.tags.anchors,
            require_frontmatter: self.config.checks.require_frontmatter,
        }
    }

    /// Treat a frontmatter error as fatal for `path` unless frontmatter is optional and simply absent.
    fn frontmatter(&self, normalized: &Normalized, path: &Path) -> Result<()> {
        match normalized.frontmatter_error {
            None => Ok(()),
            Some(FrontmatterError::MissingOpening) if !self.config.checks.require_frontmatter => Ok(()),
            Some(reason) => Err(SyncError::MalformedFrontmatter {
                path: path.to_path_buf(),
                reason,
            }),
        }
    }

    fn check_line_cap(&self, skill: &SkillDir, source: &str, report: &mut SyncReport) {
        if let Some(cap) = self.config.checks.source_line_cap {
            let lines = source.lines().count();
            if lines > cap {
                report.issue(
                    &skill.name,
                    format!(
                        "{} has {lines} lines, over the cap of {cap}",
                        skill.source.display()
                    ),
                );
            }
        }
    }

    fn drift(skill: &SkillDir, path: &Path, kind: DriftKind) -> Drift {
        Drift {
            skill: skill.name.clone(),
            path: path.to_path_buf(),
            kind,
        }
    }

    /// Compare on-disk documents against the render. Never writes.
    fn check_skill(&self, skill: &SkillDir, blocks: &BlockSet, report: &mut SyncReport) -> Result<()> {
        let state = DocumentState::detect(&skill.source, &skill.generated);
        debug!(skill = %skill.name, ?state, "checking skill");

        let source = match state {
            DocumentState::Missing => {
                return Err(SyncError::MissingDocuments {
                    source_path: skill.source.clone(),
                    generated_path: skill.generated.clone(),
                });
            }
            DocumentState::GeneratedOnly => {
                let generated = read_text(&skill.generated)?;
                let source = self
                    .bootstrapper()
                    .source_from_generated(&generated, &skill.generated)?;
                report
                    .out_of_sync
                    .push(Self::drift(skill, &skill.source, DriftKind::MissingSource));
                source
            }
            DocumentState::Complete | DocumentState::SourceOnly => {
                let raw = read_text(&skill.source)?;
                self.frontmatter(&normalize(&raw, Mode::Check), &skill.source)?;
                let repaired = normalize(&raw, Mode::Fix);
                if repaired.text != raw {
                    report.out_of_sync.push(Self::drift(
                        skill,
                        &skill.source,
                        DriftKind::SourceNeedsNormalization,
                    ));
                }
                repaired.text
            }
        };
        self.check_line_cap(skill, &source, report);

        let rendered = normalize(&render(&source, blocks)?, Mode::Check);
        self.frontmatter(&rendered, &skill.generated)?;

        if !state.has_generated() {
            report
                .out_of_sync
                .push(Self::drift(skill, &skill.generated, DriftKind::MissingGenerated));
            return Ok(());
        }

        let raw = read_text(&skill.generated)?;
        let current = normalize(&raw, Mode::Check);
        self.frontmatter(&current, &skill.generated)?;
        if current.text != rendered.text {
            report
                .out_of_sync
                .push(Self::drift(skill, &skill.generated, DriftKind::OutOfSync));
        } else if raw != rendered.text {
            report.out_of_sync.push(Self::drift(
                skill,
                &skill.generated,
                DriftKind::GeneratedNeedsNormalization,
            ));
        }
        Ok(())
    }

    /// Bring the source into canonical form and rewrite the generated document when it differs.
    fn fix_skill(&self, skill: &SkillDir, blocks: &BlockSet, report: &mut SyncReport) -> Result<()> {
        let state = DocumentState::detect(&skill.source, &skill.generated);
        debug!(skill = %skill.name, ?state, "fixing skill");

        let raw = match state {
            DocumentState::Missing => {
                return Err(SyncError::MissingDocuments {
                    source_path: skill.source.clone(),
                    generated_path: skill.generated.clone(),
                });
            }
            DocumentState::GeneratedOnly => {
                let generated = read_text(&skill.generated)?;
                let source = self
                    .bootstrapper()
                    .source_from_generated(&generated, &skill.generated)?;
                write_atomic(&skill.source, &source)?;
                info!(skill = %skill.name, path = %skill.source.display(), "bootstrapped source");
                report.bootstrapped.push(skill.source.clone());
                source
            }
            DocumentState::Complete | DocumentState::SourceOnly => read_text(&skill.source)?,
        };

        let source = normalize(&raw, Mode::Fix);
        self.frontmatter(&source, &skill.source)?;
        if source.text != raw {
            write_atomic(&skill.source, &source.text)?;
            report.changed.push(skill.source.clone());
        }
        self.check_line_cap(skill, &source.text, report);

        let rendered = normalize(&render(&source.text, blocks)?, Mode::Fix);
        self.frontmatter(&rendered, &skill.generated)?;

        let current = if state.has_generated() {
            Some(read_text(&skill.generated)?)
        } else {
            None
        };
        if current.as_deref() != Some(rendered.text.as_str()) {
            write_atomic(&skill.generated, &rendered.text)?;
            debug!(skill = %skill.name, path = %skill.generated.display(), "wrote generated skill");
            report.changed.push(skill.generated.clone());
        }
        Ok(())
    }
}
