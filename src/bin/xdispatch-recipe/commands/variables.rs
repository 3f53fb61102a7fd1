//! `xdispatch-recipe variables` command

use anyhow::Result;

use crate::cli::InputArgs;
use crate::commands::load_inputs;
use xdispatch_recipe::build_variables;

pub fn execute(inputs: &InputArgs) -> Result<()> {
    let inputs = load_inputs(inputs)?;

    for variable in build_variables(&inputs.options, inputs.version.as_deref())? {
        println!("{}", variable.to_cmake_arg());
    }

    Ok(())
}
