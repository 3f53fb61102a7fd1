//! xdispatch-recipe - build-configuration resolver for the xdispatch package
//!
//! Turns a package option set and a target platform into the requirements
//! to fetch, the CMake variables to pass to the build, and the component
//! graph exported to consumers. Every resolver is a pure function of its
//! inputs.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

pub use crate::core::{
    condition::Condition,
    error::{RecipeError, RecipeResult},
    options::{OptionSet, OptionValue},
    platform::{BuildType, Os, PlatformDescriptor},
};

pub use builder::{
    apply_platform_overrides, build_components, build_variables, BuildVariable, Component,
    ComponentMap, ComponentRef,
};
pub use ops::{resolve_package, PackageResolution};
pub use resolver::{resolve_requirements, resolve_tool_requirements, Requirement};
