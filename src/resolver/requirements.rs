//! Requirement tables and their evaluation.
//!
//! A table is an ordered list of rows, each a package reference guarded by a
//! [`Condition`]. Row order is significant: it is the emission order and it
//! decides override precedence.

use std::fmt;

use serde::Serialize;

use crate::core::condition::Condition;
use crate::core::error::{RecipeError, RecipeResult};
use crate::core::options::{
    option_decl, OptionSet, OptionValue, BACKEND_PRIMARY, OPTION_SCHEMA,
};
use crate::core::platform::{Os, PlatformDescriptor};

const PRIMARY: Condition = Condition::OptionIs(BACKEND_PRIMARY, OptionValue::True);
const PRIMARY_ON_LINUX: Condition = Condition::All(&[PRIMARY, Condition::OsIs(Os::Linux)]);

/// A row of a requirement table.
#[derive(Debug, Clone, Copy)]
pub struct RequirementRow {
    pub name: &'static str,
    pub version: &'static str,
    /// `user/channel` suffix of the reference, if any
    pub channel: Option<&'static str>,
    /// Takes precedence over any other version of the same package
    pub overriding: bool,
    pub condition: Condition,
}

impl RequirementRow {
    /// A plain requirement.
    pub const fn new(name: &'static str, version: &'static str, condition: Condition) -> Self {
        RequirementRow {
            name,
            version,
            channel: None,
            overriding: false,
            condition,
        }
    }

    /// A requirement forcing its version over any other.
    pub const fn pinned(name: &'static str, version: &'static str, condition: Condition) -> Self {
        RequirementRow {
            overriding: true,
            ..RequirementRow::new(name, version, condition)
        }
    }

    pub const fn channel(mut self, channel: &'static str) -> Self {
        self.channel = Some(channel);
        self
    }

    fn to_requirement(self) -> Requirement {
        Requirement {
            name: self.name.to_string(),
            version: self.version.to_string(),
            channel: self.channel.map(str::to_string),
            overriding: self.overriding,
            condition: self.condition,
        }
    }
}

/// A requirement selected for one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(rename = "override")]
    pub overriding: bool,
    #[serde(skip)]
    pub condition: Condition,
}

impl Requirement {
    /// Full reference, e.g. `qt/5.15.4@emzeat/external`.
    pub fn reference(&self) -> String {
        match &self.channel {
            Some(channel) => format!("{}/{}@{}", self.name, self.version, channel),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference())
    }
}

/// An ordered, read-only table of requirement rows.
#[derive(Debug, Clone, Copy)]
pub struct RequirementTable<'a> {
    rows: &'a [RequirementRow],
}

impl<'a> RequirementTable<'a> {
    pub const fn new(rows: &'a [RequirementRow]) -> Self {
        RequirementTable { rows }
    }

    pub fn rows(&self) -> &'a [RequirementRow] {
        self.rows
    }

    /// Select the rows that apply to the inputs and apply overrides.
    ///
    /// The last applicable override of a package supersedes every other
    /// applicable row of that package, earlier or later. Packages without
    /// an applicable override keep all their rows.
    ///
    /// Only overrides that apply to these inputs are checked against each
    /// other. Conflicts reachable from some other input are reported by
    /// [`RequirementTable::validate`], which the shipped tables pass.
    pub fn resolve(
        &self,
        options: &OptionSet,
        platform: &PlatformDescriptor,
    ) -> RecipeResult<Vec<Requirement>> {
        options.validate()?;

        let mut applicable = Vec::new();
        for row in self.rows {
            if row.condition.evaluate(options, platform)? {
                applicable.push(*row);
            } else {
                tracing::trace!(package = row.name, condition = %row.condition, "requirement skipped");
            }
        }

        check_override_conflicts(&applicable)?;

        let requirements: Vec<Requirement> = applicable
            .iter()
            .enumerate()
            .filter(|(i, row)| {
                last_override_of(&applicable, row.name).map_or(true, |winner| winner == *i)
            })
            .map(|(_, row)| row.to_requirement())
            .collect();

        Ok(requirements)
    }

    /// Check the table against every input combination.
    ///
    /// Every option a condition reads must be declared in the schema, and no
    /// combination of option values and operating system may produce an
    /// override conflict.
    pub fn validate(&self) -> RecipeResult<()> {
        for row in self.rows {
            for name in row.condition.referenced_options() {
                if option_decl(name).is_none() {
                    return Err(RecipeError::configuration(
                        name,
                        format!("referenced by requirement `{}` but not declared", row.name),
                    ));
                }
            }
        }

        for options in all_option_sets() {
            for os in Os::ALL {
                self.resolve(&options, &PlatformDescriptor::new(os))?;
            }
        }
        Ok(())
    }
}

fn last_override_of(rows: &[RequirementRow], name: &str) -> Option<usize> {
    rows.iter()
        .rposition(|row| row.overriding && row.name == name)
}

/// Fail when two applicable overrides force different references.
fn check_override_conflicts(rows: &[RequirementRow]) -> RecipeResult<()> {
    let overrides: Vec<&RequirementRow> = rows.iter().filter(|row| row.overriding).collect();

    for (i, first) in overrides.iter().enumerate() {
        for second in &overrides[i + 1..] {
            if first.name == second.name
                && (first.version != second.version || first.channel != second.channel)
            {
                let (a, b) = (first.to_requirement(), second.to_requirement());
                return Err(RecipeError::configuration(
                    first.name,
                    format!(
                        "conflicting overrides: `{}` (when {}) and `{}` (when {}) both apply",
                        a, first.condition, b, second.condition
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Every assignment of the schema's options to values in their domains.
fn all_option_sets() -> Vec<OptionSet> {
    OPTION_SCHEMA.iter().fold(vec![OptionSet::empty()], |sets, decl| {
        sets.into_iter()
            .flat_map(|set| {
                decl.domain
                    .values()
                    .iter()
                    .map(move |value| set.clone().with(decl.name, *value))
            })
            .collect()
    })
}

static REQUIREMENT_ROWS: [RequirementRow; 8] = [
    RequirementRow::new("qt", "5.15.4", PRIMARY).channel("emzeat/external"),
    RequirementRow::pinned("sqlite3", "3.29.0", PRIMARY),
    RequirementRow::new("xorg", "system", PRIMARY_ON_LINUX).channel("emzeat/external"),
    RequirementRow::pinned("expat", "2.4.8", PRIMARY_ON_LINUX),
    RequirementRow::pinned("libiconv", "1.17", PRIMARY_ON_LINUX),
    RequirementRow::pinned("pcre2", "10.39", PRIMARY_ON_LINUX),
    RequirementRow::pinned("libffi", "3.4.2", PRIMARY_ON_LINUX),
    RequirementRow::pinned("glib", "2.72.0", PRIMARY_ON_LINUX),
];

static TOOL_REQUIREMENT_ROWS: [RequirementRow; 1] = [
    RequirementRow::new("clang-tools-extra", "13.0.1", Condition::Always).channel("emzeat/external"),
];

/// Runtime and pinned transitive requirements.
pub static REQUIREMENTS: RequirementTable<'static> = RequirementTable::new(&REQUIREMENT_ROWS);

/// Build-only tool requirements.
pub static TOOL_REQUIREMENTS: RequirementTable<'static> =
    RequirementTable::new(&TOOL_REQUIREMENT_ROWS);

/// Resolve the package requirements for the given inputs.
pub fn resolve_requirements(
    options: &OptionSet,
    platform: &PlatformDescriptor,
) -> RecipeResult<Vec<Requirement>> {
    REQUIREMENTS.resolve(options, platform)
}

/// Resolve the build-only tool requirements for the given inputs.
pub fn resolve_tool_requirements(
    options: &OptionSet,
    platform: &PlatformDescriptor,
) -> RecipeResult<Vec<Requirement>> {
    TOOL_REQUIREMENTS.resolve(options, platform)
}
