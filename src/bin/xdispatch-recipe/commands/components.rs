//! `xdispatch-recipe components` command

use anyhow::Result;

use crate::cli::InputArgs;
use crate::commands::load_inputs;
use xdispatch_recipe::ops::{FIND_PACKAGE_ALIAS, PACKAGE_NAME};
use xdispatch_recipe::build_components;

pub fn execute(inputs: &InputArgs) -> Result<()> {
    let inputs = load_inputs(inputs)?;
    let components = build_components(&inputs.options, &inputs.platform)?;

    println!("{} (find_package: {})", PACKAGE_NAME, FIND_PACKAGE_ALIAS);

    for name in components.link_order()? {
        let Some(component) = components.get(name) else {
            continue;
        };

        println!("├── {}", component.name);
        println!("│   libs: {}", join_or_dash(&component.libraries));
        if !component.frameworks.is_empty() {
            println!("│   frameworks: {}", component.frameworks.join(" "));
        }
        let requires: Vec<String> = component.requires.iter().map(|r| r.to_string()).collect();
        println!("│   requires: {}", join_or_dash(&requires));
    }

    Ok(())
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(" ")
    }
}
