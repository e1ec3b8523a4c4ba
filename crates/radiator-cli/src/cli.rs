//! CLI argument definitions using clap.

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

/// Output format for `--get`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Three labelled lines
    #[default]
    Text,
    /// `current set offset` on one line, for scripts
    Terse,
    /// The decoded record as JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "radiator")]
#[command(author, version, about = "Control BLE radiator thermostats", long_about = None)]
#[command(subcommand_negates_reqs = true, args_conflicts_with_subcommands = true)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .multiple(true)
        .args(["get", "set", "offset"]),
))]
pub struct Cli {
    /// Device address (MAC address, or UUID on macOS)
    #[arg(short, long, env = "RADIATOR_DEVICE")]
    pub device: Option<String>,

    /// Login PIN of the device
    #[arg(short, long, env = "RADIATOR_PIN", hide_env_values = true)]
    pub pin: Option<u32>,

    /// Print the current values
    #[arg(short, long, conflicts_with_all = ["set", "offset"])]
    pub get: bool,

    /// Set the temperature in °C
    #[arg(short, long, value_name = "TEMP")]
    pub set: Option<f64>,

    /// Set the temperature offset in °C
    #[arg(short, long, value_name = "OFFSET", allow_negative_numbers = true)]
    pub offset: Option<f64>,

    /// Print parseable output (same as --format terse)
    #[arg(short, long, conflicts_with = "format")]
    pub terse: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Connection timeout in seconds
    #[arg(short = 'T', long)]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Whether log output should be limited to warnings.
    pub fn is_quiet(&self) -> bool {
        self.quiet || self.terse || self.format == Some(OutputFormat::Terse)
    }

    /// The output format selected on the command line, if any.
    pub fn requested_format(&self) -> Option<OutputFormat> {
        if self.terse {
            Some(OutputFormat::Terse)
        } else {
            self.format
        }
    }
}
