//! High-level operations.
//!
//! This module contains the operations behind the CLI commands.

pub mod resolve;

pub use resolve::{resolve_package, PackageResolution, FIND_PACKAGE_ALIAS, PACKAGE_NAME};
