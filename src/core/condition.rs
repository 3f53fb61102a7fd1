//! Declarative predicates over `(OptionSet, PlatformDescriptor)`.
//!
//! Table rows carry a `Condition` instead of code, so every row can be
//! evaluated, printed and checked the same way.

use std::fmt;

use crate::core::error::RecipeResult;
use crate::core::options::{OptionSet, OptionValue};
use crate::core::platform::{Os, PlatformDescriptor};

/// A predicate attached to a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Always holds.
    Always,
    /// Holds when the target operating system matches.
    OsIs(Os),
    /// Holds when the option is set to exactly this value.
    OptionIs(&'static str, OptionValue),
    /// Holds when every child holds.
    All(&'static [Condition]),
    /// Holds when at least one child holds.
    Any(&'static [Condition]),
    Not(&'static Condition),
}

impl Condition {
    /// Evaluate against the given inputs.
    ///
    /// Children are always evaluated in full, so a missing option is
    /// reported even when an earlier child already decided the result.
    pub fn evaluate(&self, options: &OptionSet, platform: &PlatformDescriptor) -> RecipeResult<bool> {
        match self {
            Condition::Always => Ok(true),
            Condition::OsIs(os) => Ok(platform.os == *os),
            Condition::OptionIs(name, expected) => Ok(options.require(name)? == *expected),
            Condition::All(children) => {
                let results = evaluate_all(children, options, platform)?;
                Ok(results.iter().all(|held| *held))
            }
            Condition::Any(children) => {
                let results = evaluate_all(children, options, platform)?;
                Ok(results.iter().any(|held| *held))
            }
            Condition::Not(inner) => Ok(!inner.evaluate(options, platform)?),
        }
    }

    /// Names of all options this condition reads.
    pub fn referenced_options(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        self.collect_options(&mut names);
        names
    }

    fn collect_options(&self, names: &mut Vec<&'static str>) {
        match self {
            Condition::Always | Condition::OsIs(_) => {}
            Condition::OptionIs(name, _) => {
                if !names.contains(name) {
                    names.push(*name);
                }
            }
            Condition::All(children) | Condition::Any(children) => {
                for child in children.iter() {
                    child.collect_options(names);
                }
            }
            Condition::Not(inner) => inner.collect_options(names),
        }
    }
}

fn evaluate_all(
    children: &[Condition],
    options: &OptionSet,
    platform: &PlatformDescriptor,
) -> RecipeResult<Vec<bool>> {
    children
        .iter()
        .map(|child| child.evaluate(options, platform))
        .collect()
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("always"),
            Condition::OsIs(os) => write!(f, "os == {}", os),
            Condition::OptionIs(name, value) => write!(f, "{} == {}", name, value),
            Condition::All(children) => write_joined(f, children, " && "),
            Condition::Any(children) => write_joined(f, children, " || "),
            Condition::Not(inner) => write!(f, "!({})", inner),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Condition], sep: &str) -> fmt::Result {
    let parts: Vec<_> = children.iter().map(|c| c.to_string()).collect();
    write!(f, "({})", parts.join(sep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{BACKEND_PRIMARY, BACKEND_SECONDARY};

    const PRIMARY_ON_LINUX: Condition = Condition::All(&[
        Condition::OptionIs(BACKEND_PRIMARY, OptionValue::True),
        Condition::OsIs(Os::Linux),
    ]);

    #[test]
    fn test_os_condition_ignores_compiler_and_arch() {
        let options = OptionSet::with_defaults();
        let linux = PlatformDescriptor::new(Os::Linux)
            .with_compiler("clang")
            .with_arch("armv8");

        assert!(Condition::OsIs(Os::Linux).evaluate(&options, &linux).unwrap());
        assert!(!Condition::OsIs(Os::Windows).evaluate(&options, &linux).unwrap());
    }

    #[test]
    fn test_all_condition() {
        let options = OptionSet::with_defaults();

        assert!(PRIMARY_ON_LINUX
            .evaluate(&options, &PlatformDescriptor::new(Os::Linux))
            .unwrap());
        assert!(!PRIMARY_ON_LINUX
            .evaluate(&options, &PlatformDescriptor::new(Os::Macos))
            .unwrap());
    }

    #[test]
    fn test_absent_matches_neither_true_nor_false() {
        let options = OptionSet::with_defaults().with(BACKEND_SECONDARY, OptionValue::Absent);
        let platform = PlatformDescriptor::new(Os::Linux);

        let on = Condition::OptionIs(BACKEND_SECONDARY, OptionValue::True);
        let off = Condition::OptionIs(BACKEND_SECONDARY, OptionValue::False);

        assert!(!on.evaluate(&options, &platform).unwrap());
        assert!(!off.evaluate(&options, &platform).unwrap());
    }

    #[test]
    fn test_missing_option_fails_even_after_false_child() {
        let options = OptionSet::empty().with(BACKEND_PRIMARY, true);
        let platform = PlatformDescriptor::new(Os::Windows);

        static CHILDREN: [Condition; 2] = [
            Condition::OsIs(Os::Linux),
            Condition::OptionIs(BACKEND_SECONDARY, OptionValue::True),
        ];
        let err = Condition::All(&CHILDREN)
            .evaluate(&options, &platform)
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains(BACKEND_SECONDARY));
    }

    #[test]
    fn test_display_and_referenced_options() {
        assert_eq!(
            PRIMARY_ON_LINUX.to_string(),
            "(backend_primary == true && os == Linux)"
        );
        assert_eq!(PRIMARY_ON_LINUX.referenced_options(), vec![BACKEND_PRIMARY]);

        static INNER: Condition = Condition::OptionIs(BACKEND_SECONDARY, OptionValue::False);
        assert_eq!(
            Condition::Not(&INNER).to_string(),
            "!(backend_secondary == false)"
        );
    }
}
