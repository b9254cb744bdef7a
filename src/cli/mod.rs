//! CLI interface for momentum-alpha
//!
//! Provides subcommands for:
//! - `run`: Start the announcement pipeline
//! - `classify`: Classify and analyze a single announcement offline
//! - `config`: Show the effective configuration

mod classify;
mod run;

pub use classify::ClassifyArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "momentum-alpha")]
#[command(about = "Announcement-driven trading pipeline for BSE corporate disclosures")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the polling pipeline
    Run(RunArgs),
    /// Classify one announcement and print the decision as JSON
    Classify(ClassifyArgs),
    /// Show configuration with secrets masked
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperatingMode;

    #[test]
    fn test_parse_run_with_mode() {
        let cli = Cli::try_parse_from(["momentum-alpha", "run", "--mode", "live"]).unwrap();
        match cli.command {
            Commands::Run(args) => assert_eq!(args.mode, Some(OperatingMode::Live)),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_parse_classify() {
        let cli = Cli::try_parse_from([
            "momentum-alpha",
            "-c",
            "custom.toml",
            "classify",
            "--title",
            "Receives Order",
            "--company",
            "XYZ Ltd",
        ])
        .unwrap();
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Classify(_)));
    }

    #[test]
    fn test_classify_requires_title() {
        assert!(Cli::try_parse_from(["momentum-alpha", "classify", "--company", "XYZ"]).is_err());
    }
}
