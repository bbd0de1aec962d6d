//! CLI argument definitions for `ukb-extract`.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ukb-extract",
    version,
    about = "Extract and merge dictionary fields into one participant-indexed table",
    long_about = "Resolve field identifiers or names against the data dictionary, pull the\n\
                  matching columns from every table that holds them, and merge the extracts\n\
                  into a single table keyed by participant.eid."
)]
#[command(group(ArgGroup::new("request").required(true).args(["input", "file"])))]
pub struct Cli {
    /// Comma-separated field identifiers or names (e.g. "21,31,Height").
    #[arg(short = 'i', long = "input", value_name = "LIST")]
    pub input: Option<String>,

    /// File with one field identifier or name per line.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Directory that dictionary table paths are relative to.
    #[arg(long = "data-root", value_name = "DIR")]
    pub data_root: Option<PathBuf>,

    /// Data dictionary file (default: <DATA_ROOT>/Data_Dictionary_Showcase.csv).
    #[arg(long = "dictionary", value_name = "PATH")]
    pub dictionary: Option<PathBuf>,

    /// TOML file with extraction options.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output directory, created if missing.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = "extracted_data"
    )]
    pub output_dir: PathBuf,

    /// Merged table file name inside the output directory.
    #[arg(
        long = "output-file",
        value_name = "NAME",
        default_value = "ukb_extracted_data.csv"
    )]
    pub output_file: PathBuf,

    /// Field mapping file name inside the output directory.
    #[arg(
        short = 'm',
        long = "mapping",
        value_name = "NAME",
        default_value = "ukb_field_mapping.csv"
    )]
    pub mapping_file: PathBuf,

    /// Unmatched field list file name inside the output directory.
    #[arg(
        long = "unmatched-file",
        value_name = "NAME",
        default_value = "ukb_unmatched_fields.csv"
    )]
    pub unmatched_file: PathBuf,

    /// Run report file name inside the output directory.
    #[arg(
        long = "report-file",
        value_name = "NAME",
        default_value = "ukb_run_report.json"
    )]
    pub report_file: PathBuf,

    /// Stop after planning and writing the field mapping.
    #[arg(long = "plan-only")]
    pub plan_only: bool,

    /// Exit with status 2 when any planned table is skipped.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Hide the table progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
