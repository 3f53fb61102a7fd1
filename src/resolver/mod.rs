//! Requirement resolution.
//!
//! Maps `(options, platform)` to the ordered list of external packages the
//! build needs. The resolver is pure and deterministic - no I/O happens
//! here, and the tables it reads are immutable statics.

pub mod requirements;

pub use requirements::{
    resolve_requirements, resolve_tool_requirements, Requirement, RequirementRow,
    RequirementTable, REQUIREMENTS, TOOL_REQUIREMENTS,
};
