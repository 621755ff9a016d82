//! CLI parse: clap types for snaptree. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Snaptree CLI - content-addressed snapshot trees
#[derive(Parser)]
#[command(name = "snaptree")]
#[command(about = "Build, query, merge and store content-addressed snapshot trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an empty snapshot file
    Init {
        /// Snapshot file to create
        file: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Add block references to a file, creating it and its parents if needed
    PutFile {
        file: PathBuf,
        /// Tree path of the file
        path: String,
        /// Block references: `<block>:<lower>-<upper>` or `<block>:<len>`
        #[arg(required = true)]
        refs: Vec<String>,
    },
    /// Create a directory and its parents
    PutDir { file: PathBuf, path: String },
    /// Delete a file or directory subtree
    Rm { file: PathBuf, path: String },
    /// Show one node
    Get {
        file: PathBuf,
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// List a directory's children
    Ls {
        file: PathBuf,
        #[arg(default_value = "/")]
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Find paths matching a glob pattern (`*`, `**`, `?`, `[...]`)
    Glob {
        file: PathBuf,
        pattern: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Show root hash, size and node counts
    Info {
        file: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Merge snapshots, in order, into a new snapshot
    Merge {
        /// Snapshot file to write
        output: PathBuf,
        /// Snapshot files to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Store a snapshot and point a head at it
    Commit {
        file: PathBuf,
        /// Head name
        #[arg(long)]
        name: String,
    },
    /// Write the snapshot a head points at to a file
    Checkout { name: String, file: PathBuf },
    /// Show the effective configuration as TOML
    Config,
    /// List heads in the snapshot store
    Heads {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}
