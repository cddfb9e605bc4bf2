//! CLI argument definitions for the policy codec.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "wsp",
    version,
    about = "Read, normalize and inspect WS-Policy documents",
    long_about = "Read, normalize and inspect WS-Policy documents.\n\n\
                  Unrecognized assertions are kept as placeholders unless --strict is given.\n\
                  Read and write options may also be set in a TOML file passed with --config."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -vvv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Codec options file (TOML with [read] and [write] tables).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read a policy and print its assertion outline.
    Read(ReadArgs),

    /// Read a policy and write it back in canonical form.
    Normalize(NormalizeArgs),

    /// List the assertion and property vocabulary the registry understands.
    Kinds,
}

#[derive(Args)]
pub struct ReadOptionsArgs {
    /// Fail on the first unrecognized element or property.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Remove disabled assertions after reading.
    #[arg(long = "omit-disabled")]
    pub omit_disabled: bool,
}

#[derive(Parser)]
pub struct ReadArgs {
    /// Policy document to read ("-" for stdin).
    #[arg(value_name = "POLICY")]
    pub input: PathBuf,

    #[command(flatten)]
    pub read: ReadOptionsArgs,

    /// Print the outline as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Policy document to read ("-" for stdin).
    #[arg(value_name = "POLICY")]
    pub input: PathBuf,

    #[command(flatten)]
    pub read: ReadOptionsArgs,

    /// Write the legacy wire shapes older consumers expect.
    #[arg(long = "legacy")]
    pub legacy: bool,

    /// Only use vocabulary available in this product version.
    #[arg(long = "target-version", value_name = "VERSION")]
    pub target_version: Option<String>,

    /// Output file (default: stdout).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
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
