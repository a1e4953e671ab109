use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = Self::find_root(cli.root.as_deref())?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        debug!(root = %root.display(), "resolved workspace root");

        Ok(Self {
            root,
            config,
            output_format: cli.output_format(),
            verbosity: cli.verbose,
        })
    }

    /// `--root`, then `SKILL_SYNC_ROOT`, then the nearest ancestor holding the
    /// skills directory, then the current directory.
    fn find_root(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(root) = explicit {
            return Ok(root.to_path_buf());
        }
        if let Ok(root) = std::env::var("SKILL_SYNC_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        let skills_root = discovery_dir(std::env::var("SKILL_SYNC_SKILLS_ROOT").ok());
        Ok(find_upwards(&cwd, &skills_root).unwrap_or(cwd))
    }
}

/// The directory whose presence marks a project root.
///
/// The project config lives at the root, so only the env override can move it.
fn discovery_dir(skills_root_override: Option<String>) -> PathBuf {
    skills_root_override
        .filter(|value| !value.is_empty())
        .map_or_else(|| Config::default().layout.skills_root, PathBuf::from)
}

fn find_upwards(start: &Path, name: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(name).is_dir() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}
