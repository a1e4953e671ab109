//! skill-sync - keep generated skill documents in sync with shared boilerplate.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use skill_sync::app::AppContext;
use skill_sync::cli::Cli;
use skill_sync::cli::output::{emit_json, robot_error};
use skill_sync::{Result, SyncError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if cli.robot {
                // Robot mode: error envelope on stdout
                let code = if e.is_configuration() {
                    "invalid_configuration"
                } else {
                    "error"
                };
                if let Err(err) = emit_json(&robot_error(code, e.to_string())) {
                    eprintln!("Error: {err}");
                }
            } else if let SyncError::Configuration(errors) = &e {
                eprintln!("Invalid configuration:");
                for error in errors {
                    eprintln!("- {error}");
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let ctx = AppContext::from_cli(cli)?;
    skill_sync::cli::commands::run(&ctx, cli.mode())
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,skill_sync=info",
        1 => "info,skill_sync=debug",
        2 => "debug,skill_sync=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
