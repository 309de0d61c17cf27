use clap::{Args, Parser, Subcommand, ValueEnum};
use cosmoio::core::io::args::IoMode;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "cosmo",
    author = "cosmoio developers",
    version,
    about = "cosmo - read, write and convert cosmology parameter files.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a TOML configuration file with default read/write settings
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a cosmology in one format and write it in another.
    Convert(ConvertArgs),
    /// Read a cosmology and print its parameters and derived densities.
    Show(ShowArgs),
    /// List the registered formats, or print the documentation of one format.
    Formats(FormatsArgs),
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path to the input cosmology file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output cosmology file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Input format name (e.g. 'json'). Identified from the file name when omitted.
    #[arg(long, value_name = "FORMAT")]
    pub input_format: Option<String>,

    /// Output format name (e.g. 'ascii.latex'). Identified from the file name when omitted.
    #[arg(long, value_name = "FORMAT")]
    pub output_format: Option<String>,

    /// Row to read when the input table holds several cosmologies (0-based).
    #[arg(long, value_name = "INT")]
    pub index: Option<usize>,

    /// Replace the output file if it already exists.
    #[arg(long)]
    pub overwrite: bool,

    /// Write JSON on a single line.
    #[arg(long)]
    pub compact: bool,

    /// Use plain parameter names in LaTeX tables.
    #[arg(long)]
    pub plain_names: bool,
}

/// Arguments for the `show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the cosmology file to display.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Input format name. Identified from the file name when omitted.
    #[arg(long, value_name = "FORMAT")]
    pub input_format: Option<String>,

    /// Row to read when the input table holds several cosmologies (0-based).
    #[arg(long, value_name = "INT")]
    pub index: Option<usize>,
}

/// Arguments for the `formats` subcommand.
#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// Restrict the listing to readers or writers.
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Print the documentation of a single format.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Read,
    Write,
}

impl From<ModeArg> for IoMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Read => IoMode::Read,
            ModeArg::Write => IoMode::Write,
        }
    }
}
