//! # CLI Structure and Argument Parsing
//!
//! The CLI is built with `clap` derive macros and follows a command-subcommand
//! pattern:
//!
//! ```bash
//! # Fetch a fragment (action name or literal path) and print it
//! embed request page ".title"
//! embed request /news "h2.headline" https://intranet.example.com
//!
//! # Cache maintenance
//! embed forget page ".title"
//! embed flush --tag site:intranet.example.com
//! embed flush
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI structure for the `embed` command
#[derive(Parser, Clone, Debug)]
#[command(name = "embed")]
#[command(version)]
#[command(about = "embed - fetch, extract and cache fragments of remote HTML", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true, env = "EMBED_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress warnings (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for `request`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Framed human-readable output
    #[default]
    Text,
    /// Single JSON object
    Json,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Fetch content matching a selector and print it
    Request {
        /// Action name or literal path (starting with '/')
        path: String,

        /// CSS selector
        selector: String,

        /// Base URL overriding the configured one
        #[arg(default_value = "")]
        base_url: String,

        /// Extra query parameter (repeatable)
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Forget the cached content for one request
    Forget {
        /// Action name or literal path (starting with '/')
        path: String,

        /// CSS selector
        selector: String,

        /// Base URL overriding the configured one
        #[arg(default_value = "")]
        base_url: String,
    },

    /// Evict cached content
    Flush {
        /// Only evict entries carrying this tag (e.g. site:example.com)
        #[arg(long)]
        tag: Option<String>,
    },
}

/// Parse `key=value` into a pair.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        },
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("lang=de").unwrap(),
            ("lang".to_string(), "de".to_string())
        );
        assert_eq!(
            parse_param("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_request_defaults() {
        let cli = Cli::try_parse_from(["embed", "request", "page", ".title"]).unwrap();
        match cli.command {
            Commands::Request {
                path,
                selector,
                base_url,
                params,
                format,
            } => {
                assert_eq!(path, "page");
                assert_eq!(selector, ".title");
                assert_eq!(base_url, "");
                assert!(params.is_empty());
                assert_eq!(format, OutputFormat::Text);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_request_with_base_url_and_params() {
        let cli = Cli::try_parse_from([
            "embed",
            "request",
            "/news",
            "h2",
            "https://x.test",
            "--param",
            "lang=de",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Request {
                base_url,
                params,
                format,
                ..
            } => {
                assert_eq!(base_url, "https://x.test");
                assert_eq!(params, vec![("lang".to_string(), "de".to_string())]);
                assert_eq!(format, OutputFormat::Json);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["embed", "-v", "-q", "flush"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
