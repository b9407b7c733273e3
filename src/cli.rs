//! CLI argument parsing for racebar

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for rolling-sum tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable bar chart frames (default)
    Text,
    /// JSON frame bundle for the animation renderer
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "racebar")]
#[command(version)]
#[command(about = "Rolling popularity tables for racing bar charts", long_about = None)]
pub struct Cli {
    /// Deck export CSV file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Pipeline configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Rolling window to render (default: last configured window)
    #[arg(short = 'w', long = "window", value_name = "NAME")]
    pub window: Option<String>,

    /// Filter entities (e.g., -e only=Roland\ Banks,Agnes\ Baker or -e regex=^Z)
    #[arg(short = 'e', long = "entities", value_name = "EXPR")]
    pub entities: Option<String>,

    /// Number of bars per frame
    #[arg(short = 'n', long = "bars", value_name = "N")]
    pub bars: Option<usize>,

    /// Print pipeline summary to stderr
    #[arg(long = "summary")]
    pub summary: bool,

    /// Skip malformed rows instead of failing
    #[arg(long = "skip-malformed")]
    pub skip_malformed: bool,

    /// Text output: render only the final period
    #[arg(long = "final-only")]
    pub final_only: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_input() {
        let cli = Cli::parse_from(["racebar", "decks.csv"]);
        assert_eq!(cli.input, PathBuf::from("decks.csv"));
        assert!(cli.config.is_none());
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["racebar"]).is_err());
    }

    #[test]
    fn test_cli_format_default_text() {
        let cli = Cli::parse_from(["racebar", "decks.csv"]);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_format_json() {
        let cli = Cli::parse_from(["racebar", "--format", "json", "decks.csv"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_format_csv() {
        let cli = Cli::parse_from(["racebar", "--format", "csv", "decks.csv"]);
        assert_eq!(cli.format, OutputFormat::Csv);
    }

    #[test]
    fn test_cli_format_invalid() {
        assert!(Cli::try_parse_from(["racebar", "--format", "html", "decks.csv"]).is_err());
    }

    #[test]
    fn test_cli_window_flag() {
        let cli = Cli::parse_from(["racebar", "-w", "30d", "decks.csv"]);
        assert_eq!(cli.window.as_deref(), Some("30d"));
    }

    #[test]
    fn test_cli_entities_flag() {
        let cli = Cli::parse_from(["racebar", "-e", "regex=^Z", "decks.csv"]);
        assert_eq!(cli.entities.as_deref(), Some("regex=^Z"));
    }

    #[test]
    fn test_cli_bars_flag() {
        let cli = Cli::parse_from(["racebar", "--bars", "5", "decks.csv"]);
        assert_eq!(cli.bars, Some(5));
    }

    #[test]
    fn test_cli_bars_rejects_non_number() {
        assert!(Cli::try_parse_from(["racebar", "--bars", "many", "decks.csv"]).is_err());
    }

    #[test]
    fn test_cli_config_and_output() {
        let cli = Cli::parse_from([
            "racebar",
            "-c",
            "racebar.toml",
            "-o",
            "out.json",
            "decks.csv",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("racebar.toml")));
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_cli_flags_default_false() {
        let cli = Cli::parse_from(["racebar", "decks.csv"]);
        assert!(!cli.summary);
        assert!(!cli.skip_malformed);
        assert!(!cli.final_only);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_boolean_flags() {
        let cli = Cli::parse_from([
            "racebar",
            "--summary",
            "--skip-malformed",
            "--final-only",
            "--debug",
            "decks.csv",
        ]);
        assert!(cli.summary);
        assert!(cli.skip_malformed);
        assert!(cli.final_only);
        assert!(cli.debug);
    }
}
