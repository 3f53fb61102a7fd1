//! `xdispatch-recipe options` command

use anyhow::Result;

use xdispatch_recipe::core::OPTION_SCHEMA;

pub fn execute() -> Result<()> {
    for decl in OPTION_SCHEMA {
        println!(
            "{:<18} {:<24} default: {:<7} {}",
            decl.name,
            decl.domain.to_string(),
            decl.default.as_str(),
            decl.help
        );
    }

    Ok(())
}
