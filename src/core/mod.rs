//! Core data model.
//!
//! This module contains the inputs every resolver works from:
//! - The option schema and option sets
//! - The platform descriptor
//! - Declarative conditions over both
//! - The shared error type

pub mod condition;
pub mod error;
pub mod options;
pub mod platform;

pub use condition::Condition;
pub use error::{RecipeError, RecipeResult};
pub use options::{OptionSet, OptionValue, OPTION_SCHEMA};
pub use platform::{BuildType, Os, PlatformDescriptor};
