//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// xdispatch-recipe - resolve the build configuration of the xdispatch package
#[derive(Parser)]
#[command(name = "xdispatch-recipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Inputs shared by every resolving command.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Read configuration from this file instead of the global/project files
    #[arg(long, global = true, env = "XDISPATCH_RECIPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Set an option, e.g. `-o backend_primary=false`
    #[arg(short = 'o', long = "option", global = true, value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Set a platform setting, e.g. `-s os=iOS`
    #[arg(short = 's', long = "setting", global = true, value_name = "FIELD=VALUE")]
    pub settings: Vec<String>,

    /// Package version passed to the build
    #[arg(long = "version-string", global = true, value_name = "VERSION")]
    pub package_version: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the external requirements
    Requirements(RequirementsArgs),

    /// Print the CMake variables passed to the build
    Variables,

    /// Show the exported components in link order
    Components,

    /// Print the complete resolution as JSON
    Resolve,

    /// List the recognized options
    Options,
}

#[derive(Args)]
pub struct RequirementsArgs {
    /// Also list build-only tool requirements
    #[arg(long)]
    pub tools: bool,
}
