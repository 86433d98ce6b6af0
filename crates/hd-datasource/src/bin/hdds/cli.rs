//! hdds cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; hdds ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print flattened prims
    ///
    /// Loads *.scene.yaml / *.scene.json files from the work directory unless any other source is provided
    /// (via --input-*)
    Flatten(FlattenCommand),

    /// Print the leaves of prims as written in the scene, one `locator = value` line each
    Dump(DumpCommand),
}

#[derive(Parser, Debug)]
pub struct FlattenCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Shutter offset to evaluate at
    #[arg(short = 't', long = "time", default_value_t = 0.0)]
    pub time: f32,

    /// Prims to print, all prims if none are given
    pub prims: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct DumpCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Dump flattened prims instead
    #[arg(long = "flattened")]
    pub flattened: bool,

    /// Shutter offset to evaluate at
    #[arg(short = 't', long = "time", default_value_t = 0.0)]
    pub time: f32,

    /// Prims to print, all prims if none are given
    pub prims: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load a file
    #[clap(short = 'f', long = "input-file")]
    pub files: Vec<PathBuf>,

    /// Load files from given directory
    #[clap(short = 'd', long = "input-dir")]
    pub directories: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}
