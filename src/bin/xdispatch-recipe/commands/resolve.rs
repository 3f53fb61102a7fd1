//! `xdispatch-recipe resolve` command

use anyhow::{Context, Result};

use crate::cli::InputArgs;
use crate::commands::load_inputs;
use xdispatch_recipe::resolve_package;

pub fn execute(inputs: &InputArgs) -> Result<()> {
    let inputs = load_inputs(inputs)?;

    let resolution = resolve_package(&inputs.options, &inputs.platform, inputs.version.as_deref())?;

    let json = serde_json::to_string_pretty(&resolution)
        .context("failed to serialize resolution")?;
    println!("{}", json);

    Ok(())
}
