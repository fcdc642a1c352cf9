//! Photofind CLI - find images by size, color mode and format.
//!
//! Photofind walks a directory (optionally recursively), decodes every file
//! that looks like an image and reports the ones that meet the requirements.
//! The `copy` command also copies matches into a destination tree that
//! mirrors the source layout.
//!
//! # Usage
//!
//! ```bash
//! # Find RGB photos of at least 1920x1080 (either orientation)
//! photofind -d ~/Pictures -r -m RGB -s 1920:1080 -a search
//!
//! # Copy matching JPEGs and PNGs, listing every file afterwards
//! photofind -d ./camera -r -f jpeg,png -e copy ./selected
//!
//! # View configuration
//! photofind config show
//! ```

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod cli;
mod logging;

/// Photofind - find images by size, color mode and format, and copy them.
#[derive(Parser, Debug)]
#[command(name = "photofind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    find: cli::find::FindArgs,

    /// Show info logs
    #[arg(short = 'l', long, global = true)]
    with_logs: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Find photos that meet the requirements
    Search,

    /// Find photos that meet the requirements and copy them into COPY_DIR
    Copy {
        /// Destination directory; must already exist
        copy_dir: String,
    },

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match photofind_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `photofind config path`."
            );
            photofind_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.with_logs, cli.verbose, cli.json_logs);

    tracing::debug!("Photofind v{}", photofind_core::VERSION);

    let report = match cli.command {
        Commands::Search => cli::find::execute(&cli.find, None, &config).await?,
        Commands::Copy { copy_dir } => {
            cli::find::execute(&cli.find, Some(copy_dir), &config).await?
        }
        Commands::Config(args) => {
            cli::config::execute(args).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_before_and_after_command() {
        let cli = Cli::try_parse_from([
            "photofind", "-d", "/tmp", "-r", "-m", "rgb,L", "search", "-s", "10:20", "-e",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Search));
        assert!(cli.find.recursive);
        assert!(cli.find.extended_result);
        assert_eq!(cli.find.modes.as_ref().map(Vec::len), Some(2));
        assert!(cli.find.min_sizes.is_some());
    }

    #[test]
    fn test_copy_requires_destination() {
        assert!(Cli::try_parse_from(["photofind", "copy"]).is_err());
        let cli = Cli::try_parse_from(["photofind", "copy", "./out"]).unwrap();
        assert!(matches!(cli.command, Commands::Copy { ref copy_dir } if copy_dir == "./out"));
    }

    #[test]
    fn test_invalid_requirement_is_rejected_at_parse_time() {
        let err = Cli::try_parse_from(["photofind", "-f", "heic", "search"]).unwrap_err();
        assert!(err.to_string().contains("Supported ones are"));

        let err = Cli::try_parse_from(["photofind", "-s", "10x20", "search"]).unwrap_err();
        assert!(err.to_string().contains("Incorrect sizes pattern"));
    }
}
