//! xdispatch-recipe CLI - build-configuration resolver for xdispatch

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use xdispatch_recipe::util::config::ConfigFileError;
use xdispatch_recipe::util::diagnostic;
use xdispatch_recipe::RecipeError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        if let Some(err) = e.downcast_ref::<RecipeError>() {
            diagnostic::emit(&err.to_diagnostic(), color);
        } else if let Some(err) = e.downcast_ref::<ConfigFileError>() {
            diagnostic::emit(&err.to_diagnostic(), color);
        } else {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("xdispatch_recipe=debug")
    } else {
        EnvFilter::new("xdispatch_recipe=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Requirements(args) => commands::requirements::execute(&cli.inputs, args),
        Commands::Variables => commands::variables::execute(&cli.inputs),
        Commands::Components => commands::components::execute(&cli.inputs),
        Commands::Resolve => commands::resolve::execute(&cli.inputs),
        Commands::Options => commands::options::execute(),
    }
}
