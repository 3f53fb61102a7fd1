//! Package options and their fixed schema.
//!
//! The schema is defined once, at compile time. An `OptionSet` may hold
//! arbitrary entries while it is being assembled (from config files or the
//! command line); it is checked against the schema by [`OptionSet::validate`],
//! which every resolver calls before looking at any value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{RecipeError, RecipeResult};

/// Build the test suite.
pub const BUILD_TESTS: &str = "build_tests";

/// Enable the primary (Qt5) backend.
pub const BACKEND_PRIMARY: &str = "backend_primary";

/// Enable the secondary (libdispatch) backend. Tri-state.
pub const BACKEND_SECONDARY: &str = "backend_secondary";

/// Value of a single option.
///
/// `Absent` is a real value of tri-state options and is never equal to
/// `False`. It is distinct from an option that was not set at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionValue {
    True,
    False,
    Absent,
}

impl OptionValue {
    /// Parse a raw value for the named option.
    pub fn parse(option: &str, raw: &str) -> RecipeResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(OptionValue::True),
            "false" | "off" | "no" | "0" => Ok(OptionValue::False),
            "absent" | "none" => Ok(OptionValue::Absent),
            _ => Err(RecipeError::configuration(
                option,
                format!("`{}` is not a valid option value", raw),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionValue::True => "true",
            OptionValue::False => "false",
            OptionValue::Absent => "absent",
        }
    }

    /// The boolean this value carries, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::True => Some(true),
            OptionValue::False => Some(false),
            OptionValue::Absent => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        if value {
            OptionValue::True
        } else {
            OptionValue::False
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed values of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDomain {
    /// `{true, false}`
    Bool,
    /// `{absent, true, false}`
    TriState,
}

impl OptionDomain {
    /// All values of the domain, in a fixed order.
    pub fn values(&self) -> &'static [OptionValue] {
        match self {
            OptionDomain::Bool => &[OptionValue::True, OptionValue::False],
            OptionDomain::TriState => &[OptionValue::Absent, OptionValue::True, OptionValue::False],
        }
    }

    pub fn admits(&self, value: OptionValue) -> bool {
        self.values().contains(&value)
    }
}

impl fmt::Display for OptionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<_> = self.values().iter().map(|v| v.as_str()).collect();
        write!(f, "{{{}}}", values.join(", "))
    }
}

/// Declaration of a recognized option.
#[derive(Debug, Clone, Copy)]
pub struct OptionDecl {
    pub name: &'static str,
    pub domain: OptionDomain,
    pub default: OptionValue,
    pub help: &'static str,
}

/// The recognized options, in declaration order.
pub static OPTION_SCHEMA: &[OptionDecl] = &[
    OptionDecl {
        name: BUILD_TESTS,
        domain: OptionDomain::Bool,
        default: OptionValue::False,
        help: "Build the unit test suite",
    },
    OptionDecl {
        name: BACKEND_PRIMARY,
        domain: OptionDomain::Bool,
        default: OptionValue::True,
        help: "Build the Qt5 backend (qtdispatch)",
    },
    OptionDecl {
        name: BACKEND_SECONDARY,
        domain: OptionDomain::TriState,
        default: OptionValue::Absent,
        help: "Build the libdispatch backend; absent lets the build detect it",
    },
];

/// Look up the schema declaration of an option.
pub fn option_decl(name: &str) -> Option<&'static OptionDecl> {
    OPTION_SCHEMA.iter().find(|decl| decl.name == name)
}

/// A set of option assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    values: BTreeMap<String, OptionValue>,
}

impl OptionSet {
    /// Create a set with no options assigned.
    pub fn empty() -> Self {
        OptionSet {
            values: BTreeMap::new(),
        }
    }

    /// Create a set holding the schema defaults.
    pub fn with_defaults() -> Self {
        let mut set = OptionSet::empty();
        for decl in OPTION_SCHEMA {
            set.set(decl.name, decl.default);
        }
        set
    }

    /// Assign a value. Not checked against the schema until `validate`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Builder form of [`OptionSet::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Apply a `name=value` assignment as given on the command line.
    pub fn assign(&mut self, assignment: &str) -> RecipeResult<()> {
        let (name, raw) = assignment.split_once('=').ok_or_else(|| {
            RecipeError::configuration(
                assignment.trim(),
                "expected an assignment of the form `name=value`",
            )
        })?;

        let name = name.trim();
        let value = OptionValue::parse(name, raw)?;
        self.set(name, value);
        Ok(())
    }

    /// Overlay another set on top of this one (other takes precedence).
    pub fn merge(&mut self, other: &OptionSet) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), *value);
        }
    }

    pub fn get(&self, name: &str) -> Option<OptionValue> {
        self.values.get(name).copied()
    }

    /// Get an option that must be present.
    pub fn require(&self, name: &str) -> RecipeResult<OptionValue> {
        self.get(name)
            .ok_or_else(|| RecipeError::configuration(name, "option is not set"))
    }

    /// Get a boolean option that must be present and not `absent`.
    pub fn flag(&self, name: &str) -> RecipeResult<bool> {
        self.require(name)?.as_bool().ok_or_else(|| {
            RecipeError::configuration(name, "expected `true` or `false`, found `absent`")
        })
    }

    /// Check every assignment against the schema.
    pub fn validate(&self) -> RecipeResult<()> {
        for (name, value) in &self.values {
            let decl = option_decl(name)
                .ok_or_else(|| RecipeError::configuration(name.as_str(), "unknown option"))?;

            if !decl.domain.admits(*value) {
                return Err(RecipeError::configuration(
                    name.as_str(),
                    format!("value `{}` is outside the domain {}", value, decl.domain),
                ));
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, OptionValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for OptionSet {
    fn default() -> Self {
        OptionSet::with_defaults()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<_> = self
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        write!(f, "{}", pairs.join(" "))
    }
}
