//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

use crate::sync::SyncMode;

#[derive(Parser, Debug)]
#[command(
    name = "skill-sync",
    version,
    about = "Keep generated SKILL.md files in sync with shared boilerplate blocks"
)]
#[command(group(ArgGroup::new("mode").required(true).args(["check", "fix"])))]
pub struct Cli {
    /// Report out-of-sync skill files without writing anything
    #[arg(long)]
    pub check: bool,

    /// Rewrite out-of-sync skill files and bootstrap missing sources
    #[arg(long)]
    pub fix: bool,

    /// Project root containing the skills directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Path to a skill-sync.toml config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit a machine-readable JSON report on stdout
    #[arg(long)]
    pub robot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Robot,
}

impl Cli {
    #[must_use]
    pub const fn mode(&self) -> SyncMode {
        if self.fix {
            SyncMode::Fix
        } else {
            SyncMode::Check
        }
    }

    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        if self.robot {
            OutputFormat::Robot
        } else {
            OutputFormat::Human
        }
    }
}
