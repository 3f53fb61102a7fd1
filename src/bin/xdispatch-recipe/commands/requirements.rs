//! `xdispatch-recipe requirements` command

use anyhow::Result;

use crate::cli::{InputArgs, RequirementsArgs};
use crate::commands::load_inputs;
use xdispatch_recipe::{resolve_requirements, resolve_tool_requirements, Requirement};

pub fn execute(inputs: &InputArgs, args: RequirementsArgs) -> Result<()> {
    let inputs = load_inputs(inputs)?;

    let requirements = resolve_requirements(&inputs.options, &inputs.platform)?;
    let tools = if args.tools {
        resolve_tool_requirements(&inputs.options, &inputs.platform)?
    } else {
        Vec::new()
    };

    if requirements.is_empty() && tools.is_empty() {
        tracing::info!("No requirements for {}", inputs.platform);
        return Ok(());
    }

    for req in &requirements {
        println!("{}", format_requirement(req));
    }
    for req in &tools {
        println!("{} (tool)", format_requirement(req));
    }

    Ok(())
}

fn format_requirement(req: &Requirement) -> String {
    if req.overriding {
        format!("{} (override)", req)
    } else {
        req.to_string()
    }
}
