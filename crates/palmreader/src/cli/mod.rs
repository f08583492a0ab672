//! Command-line interface for palmreader.
//!
//! This module provides the CLI structure for the `palmread` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{AnalyzeCommand, ConfigCommand, OutputFormat, ServeCommand};

/// palmread - Palm photo readings backed by a hosted line detector
///
/// Serves the palm analysis API for the web client, or reads a single photo
/// from disk.
#[derive(Debug, Parser)]
#[command(name = "palmread")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Read a palm photo from disk
    Analyze(AnalyzeCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Config(ConfigCommand::Path),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "palmread");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["palmread", "serve"]).unwrap();
        let Command::Serve(cmd) = cli.command else {
            panic!("expected serve");
        };
        assert!(cmd.host.is_none());
        assert!(cmd.port.is_none());
        assert!(!cmd.demo);
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli =
            Cli::try_parse_from(["palmread", "serve", "--port", "8080", "--host", "127.0.0.1", "--demo"])
                .unwrap();
        let Command::Serve(cmd) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(cmd.port, Some(8080));
        assert_eq!(cmd.host.as_deref(), Some("127.0.0.1"));
        assert!(cmd.demo);
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "palmread", "analyze", "palm.jpg", "--format", "json", "--svg", "out.svg",
        ])
        .unwrap();
        let Command::Analyze(cmd) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(cmd.image, PathBuf::from("palm.jpg"));
        assert_eq!(cmd.format, OutputFormat::Json);
        assert_eq!(cmd.svg, Some(PathBuf::from("out.svg")));
    }

    #[test]
    fn test_parse_analyze_requires_image() {
        assert!(Cli::try_parse_from(["palmread", "analyze"]).is_err());
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["palmread", "config", "show", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }

    #[test]
    fn test_parse_with_config_and_verbose() {
        let cli =
            Cli::try_parse_from(["palmread", "-c", "/custom/config.toml", "-vv", "serve"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["palmread", "-q", "config", "path"]).unwrap();
        assert!(cli.quiet);
    }
}
