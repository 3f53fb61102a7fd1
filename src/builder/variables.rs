//! CMake cache variables passed to the build.

use std::fmt;

use serde::Serialize;

use crate::core::error::RecipeResult;
use crate::core::options::{OptionSet, OptionValue, BACKEND_PRIMARY, BACKEND_SECONDARY, BUILD_TESTS};

/// Version used when the caller supplies none.
pub const DEFAULT_VERSION: &str = "0.0+dev";

/// Lint and formatting passes of the build scripts. Always disabled for
/// package builds.
pub const STATIC_ANALYSIS_TOGGLES: [&str; 3] = ["MZ_DO_CPPLINT", "MZ_DO_CPPLINT_DIFF", "MZ_DO_AUTO_FORMAT"];

/// Value of a build variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    Text(String),
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Bool(true) => f.write_str("ON"),
            VariableValue::Bool(false) => f.write_str("OFF"),
            VariableValue::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildVariable {
    pub key: String,
    pub value: VariableValue,
}

impl BuildVariable {
    pub fn new(key: impl Into<String>, value: VariableValue) -> Self {
        BuildVariable {
            key: key.into(),
            value,
        }
    }

    pub fn flag(key: impl Into<String>, value: bool) -> Self {
        BuildVariable::new(key, VariableValue::Bool(value))
    }

    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        BuildVariable::new(key, VariableValue::Text(value.into()))
    }

    /// Render as a CMake cache argument, e.g. `-DXDISPATCH_QT5=ON`.
    pub fn to_cmake_arg(&self) -> String {
        format!("-D{}={}", self.key, self.value)
    }
}

/// Compute the build variables for the given options.
///
/// An absent secondary backend is passed as `AUTO` so the build detects it.
pub fn build_variables(options: &OptionSet, version: Option<&str>) -> RecipeResult<Vec<BuildVariable>> {
    options.validate()?;

    let secondary = match options.require(BACKEND_SECONDARY)? {
        OptionValue::Absent => VariableValue::Text("AUTO".to_string()),
        value => VariableValue::Bool(value == OptionValue::True),
    };

    let version = version
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_VERSION);

    let mut variables = vec![
        BuildVariable::flag("XDISPATCH_QT5", options.flag(BACKEND_PRIMARY)?),
        BuildVariable::new("XDISPATCH_LIBDISPATCH", secondary),
        BuildVariable::flag("BUILD_XDISPATCH2_TESTS", options.flag(BUILD_TESTS)?),
    ];
    variables.extend(
        STATIC_ANALYSIS_TOGGLES
            .iter()
            .map(|key| BuildVariable::flag(*key, false)),
    );
    variables.push(BuildVariable::text("XDISPATCH_VERSION", version));

    Ok(variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(variables: &[BuildVariable]) -> Vec<String> {
        variables.iter().map(|v| v.to_cmake_arg()).collect()
    }

    #[test]
    fn test_default_variables() {
        let variables = build_variables(&OptionSet::with_defaults(), None).unwrap();

        assert_eq!(
            args(&variables),
            vec![
                "-DXDISPATCH_QT5=ON",
                "-DXDISPATCH_LIBDISPATCH=AUTO",
                "-DBUILD_XDISPATCH2_TESTS=OFF",
                "-DMZ_DO_CPPLINT=OFF",
                "-DMZ_DO_CPPLINT_DIFF=OFF",
                "-DMZ_DO_AUTO_FORMAT=OFF",
                "-DXDISPATCH_VERSION=0.0+dev",
            ]
        );
    }

    #[test]
    fn test_caller_version_and_switches() {
        let options = OptionSet::with_defaults()
            .with(BUILD_TESTS, true)
            .with(BACKEND_PRIMARY, false)
            .with(BACKEND_SECONDARY, false);
        let variables = build_variables(&options, Some("2.1.0")).unwrap();

        assert_eq!(variables[0], BuildVariable::flag("XDISPATCH_QT5", false));
        assert_eq!(variables[1], BuildVariable::flag("XDISPATCH_LIBDISPATCH", false));
        assert_eq!(variables[2], BuildVariable::flag("BUILD_XDISPATCH2_TESTS", true));
        assert_eq!(
            variables.last().unwrap(),
            &BuildVariable::text("XDISPATCH_VERSION", "2.1.0")
        );
    }

    #[test]
    fn test_blank_version_falls_back() {
        let variables = build_variables(&OptionSet::with_defaults(), Some("  ")).unwrap();
        assert_eq!(
            variables.last().unwrap().value,
            VariableValue::Text(DEFAULT_VERSION.to_string())
        );
    }

    #[test]
    fn test_static_analysis_always_off() {
        let options = OptionSet::with_defaults().with(BUILD_TESTS, true);
        let variables = build_variables(&options, None).unwrap();

        for key in STATIC_ANALYSIS_TOGGLES {
            let var = variables.iter().find(|v| v.key == key).unwrap();
            assert_eq!(var.value, VariableValue::Bool(false));
        }
    }

    #[test]
    fn test_invalid_options_fail() {
        let options = OptionSet::with_defaults().with("fPIC", true);
        assert!(build_variables(&options, None).unwrap_err().is_configuration());

        let missing = OptionSet::empty().with(BACKEND_PRIMARY, true);
        assert!(build_variables(&missing, None).is_err());
    }

    #[test]
    fn test_serializes_plain_values() {
        let json = serde_json::to_value(BuildVariable::flag("XDISPATCH_QT5", true)).unwrap();
        assert_eq!(json, serde_json::json!({"key": "XDISPATCH_QT5", "value": true}));
    }
}
