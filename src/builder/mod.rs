//! Build configuration outputs.
//!
//! This module computes what the build tool receives (CMake variables) and
//! what the installed package exports (components, with platform rules
//! applied).

pub mod components;
pub mod platform_rules;
pub mod variables;

pub use components::{build_components, Component, ComponentMap, ComponentRef};
pub use platform_rules::{apply_platform_overrides, PlatformAction, PlatformRule};
pub use variables::{build_variables, BuildVariable, VariableValue};
