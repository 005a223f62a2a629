use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use mol_readout::Format;

#[derive(Parser)]
#[command(
    name = "mreadout",
    about = "Validate training data and readout configurations for molecular GNNs",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate and summarize a data configuration
    #[command(visible_alias = "d")]
    Data(DataArgs),

    /// Validate a model configuration and build its readout heads
    #[command(visible_alias = "m")]
    Model(ModelArgs),
}

/// I/O options shared by all commands.
#[derive(Args)]
pub struct IoOptions {
    /// Input file (stdin if omitted, requires --infmt)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Input format (inferred from extension if not specified)
    #[arg(long = "infmt", value_name = "FORMAT")]
    pub input_format: Option<ConfigFormat>,

    /// Write the normalized configuration here, repeatable (format from extension)
    #[arg(short, long, value_name = "FILE", action = clap::ArgAction::Append)]
    pub output: Vec<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct DataArgs {
    #[command(flatten)]
    pub io: IoOptions,

    /// Model configuration whose readout names every target must use
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,
}

#[derive(Args)]
pub struct ModelArgs {
    #[command(flatten)]
    pub io: IoOptions,

    #[command(flatten)]
    pub build: BuildOptions,
}

/// Readout construction options.
#[derive(Args)]
#[command(next_help_heading = "Build Options")]
pub struct BuildOptions {
    /// Number of atom features produced by the graph convolution
    #[arg(long = "in-feats", value_name = "N", default_value = "64")]
    pub in_feats: usize,

    /// Seed for parameter initialization
    #[arg(long, value_name = "SEED", default_value = "0")]
    pub seed: u64,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConfigFormat {
    Json,
    Toml,
    #[value(alias = "yml")]
    Yaml,
}

impl From<ConfigFormat> for Format {
    fn from(f: ConfigFormat) -> Self {
        match f {
            ConfigFormat::Json => Format::Json,
            ConfigFormat::Toml => Format::Toml,
            ConfigFormat::Yaml => Format::Yaml,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
