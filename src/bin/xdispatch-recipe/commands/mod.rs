//! Command implementations

pub mod components;
pub mod options;
pub mod requirements;
pub mod resolve;
pub mod variables;

use anyhow::{Context, Result};

use crate::cli::InputArgs;
use xdispatch_recipe::util::config::{
    global_config_path, load_config, project_config_path, Config,
};
use xdispatch_recipe::{Os, OptionSet, PlatformDescriptor, RecipeResult};

/// Resolved command inputs: config files overlaid with command-line values.
pub struct Inputs {
    pub options: OptionSet,
    pub platform: PlatformDescriptor,
    pub version: Option<String>,
}

/// Load configuration and apply `-o`/`-s` arguments on top.
pub fn load_inputs(args: &InputArgs) -> Result<Inputs> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to determine current directory")?;
            let global = global_config_path().unwrap_or_default();
            load_config(&global, &project_config_path(&cwd))?
        }
    };

    let mut options = OptionSet::with_defaults();
    config.apply_options(&mut options)?;
    for assignment in &args.options {
        options.assign(assignment)?;
    }

    let os_supplied = config.settings.os.is_some()
        || args.settings.iter().any(|s| sets_os(s));
    let mut platform = base_platform(PlatformDescriptor::host(), os_supplied)?;
    config.apply_settings(&mut platform)?;
    for assignment in &args.settings {
        platform.assign(assignment)?;
    }

    let version = args.package_version.clone().or(config.version);

    tracing::debug!(options = %options, platform = %platform, "loaded inputs");

    Ok(Inputs {
        options,
        platform,
        version,
    })
}

fn sets_os(assignment: &str) -> bool {
    assignment
        .split_once('=')
        .is_some_and(|(field, _)| field.trim() == "os")
}

/// Starting descriptor before settings are applied.
///
/// An unrecognized host only matters when nothing names the target os.
fn base_platform(
    host: RecipeResult<PlatformDescriptor>,
    os_supplied: bool,
) -> RecipeResult<PlatformDescriptor> {
    match host {
        Ok(platform) => Ok(platform),
        Err(_) if os_supplied => Ok(PlatformDescriptor::new(Os::Linux)),
        Err(e) => Err(e),
    }
}
