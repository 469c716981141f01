// cli.rs - Command-line interface configuration
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "asset-loader")]
#[command(about = "Browse standin proxies and switch their asset variant/version", long_about = None)]
pub struct Cli {
    /// Scene document to operate on
    #[arg(short, long)]
    pub scene: PathBuf,

    /// JSON file overriding the naming convention
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use every standin in the scene instead of the selection
    #[arg(long, default_value = "false")]
    pub all: bool,

    /// Print JSON instead of tables
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Save the modified scene back to its file
    #[arg(short, long, default_value = "false")]
    pub write: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show object, asset, variant and version of each standin
    List,
    /// Show every variant and version available for one object
    Versions { object: String },
    /// Point one object at a variant and version
    Set {
        object: String,
        variant: String,
        version: String,
    },
    /// Move objects to the latest version of their variant (all when none given)
    Update { objects: Vec<String> },
    /// Switch objects to the SD variant at the same version
    ToSd { objects: Vec<String> },
    /// Switch objects to the HD variant at the same version
    ToHd { objects: Vec<String> },
    /// Replace standins with references to their native scene files
    Convert { objects: Vec<String> },
    /// List and select objects that are not on their latest version
    OutOfDate,
}
