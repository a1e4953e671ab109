//! skill-sync --check / --fix

use std::path::Path;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok, robot_partial};
use crate::error::Result;
use crate::sync::{SyncEngine, SyncMode, SyncReport};

pub fn run(ctx: &AppContext, mode: SyncMode) -> Result<bool> {
    let report = SyncEngine::new(&ctx.root, &ctx.config).run(mode)?;
    let success = match mode {
        SyncMode::Check => report.is_clean(),
        SyncMode::Fix => report.errors.is_empty(),
    };

    match ctx.output_format {
        OutputFormat::Robot => emit_robot_report(&report)?,
        OutputFormat::Human => emit_human(human_report(&report, &ctx.root, ctx.verbosity)),
    }
    Ok(success)
}

fn emit_robot_report(report: &SyncReport) -> Result<()> {
    if report.errors.is_empty() {
        return emit_json(&robot_ok(report));
    }
    let failed = report.errors.len();
    let warnings = report.errors.iter().map(ToString::to_string).collect();
    emit_json(&robot_partial(
        report,
        report.skills.saturating_sub(failed),
        failed,
        warnings,
    ))
}

/// `path` relative to the project root when it lives under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

#[must_use]
pub fn human_report(report: &SyncReport, root: &Path, verbosity: u8) -> HumanLayout {
    let mut layout = HumanLayout::new();

    match report.mode {
        SyncMode::Check => {
            if report.out_of_sync.is_empty() {
                if report.errors.is_empty() {
                    layout.push_line("All skill files are in sync.");
                }
            } else {
                layout.heading("Out-of-sync skill files:");
                for drift in &report.out_of_sync {
                    layout.bullet(&format!("{}: {}", drift.kind, display_path(&drift.path, root)));
                }
            }
        }
        SyncMode::Fix => {
            if !report.bootstrapped.is_empty() {
                layout.heading("Bootstrapped skill source files:");
                for path in &report.bootstrapped {
                    layout.bullet(&display_path(path, root));
                }
            }
            if !report.changed.is_empty() {
                layout.heading("Updated skill files:");
                for path in &report.changed {
                    layout.bullet(&display_path(path, root));
                }
            }
            if report.wrote_nothing() {
                layout.push_line("No changes needed.");
            }
        }
    }

    if !report.errors.is_empty() {
        if !layout.is_empty() {
            layout.blank();
        }
        layout.heading("Skill errors:");
        for issue in &report.errors {
            layout.bullet(&issue.to_string());
        }
    }

    if verbosity > 0 && !report.profiles.is_empty() {
        layout.blank().heading("Profiles:");
        for profile in &report.profiles {
            layout.push_line(format!("  {}", profile.name));
            layout.kv("explicit", &joined(&profile.explicit));
            layout.kv("delta", &joined(&profile.delta));
            layout.kv("inherited", &joined(&profile.inherited));
        }
    }

    layout
}

fn joined(tags: &[String]) -> String {
    if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::sync::{Drift, DriftKind};

    #[test]
    fn test_clean_check_summary() {
        let report = SyncReport::new(SyncMode::Check);
        let text = human_report(&report, Path::new("/repo"), 0).build();
        assert_eq!(text, "All skill files are in sync.");
    }

    #[test]
    fn test_drift_listed_relative_to_root() {
        console::set_colors_enabled(false);
        let mut report = SyncReport::new(SyncMode::Check);
        report.out_of_sync.push(Drift {
            skill: "alpha".into(),
            path: PathBuf::from("/repo/skills/alpha/SKILL.md"),
            kind: DriftKind::OutOfSync,
        });
        let text = human_report(&report, Path::new("/repo"), 0).build();
        assert_eq!(
            text,
            "Out-of-sync skill files:\n- out of sync: skills/alpha/SKILL.md"
        );
    }

    #[test]
    fn test_fix_without_writes() {
        let report = SyncReport::new(SyncMode::Fix);
        let text = human_report(&report, Path::new("/repo"), 0).build();
        assert_eq!(text, "No changes needed.");
    }
}
