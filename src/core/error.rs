//! Error types shared by the option model and both resolvers.
//!
//! Resolution is pure and deterministic, so nothing here is retryable.
//! Every variant carries the offending option name or platform field.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Result alias used throughout the library.
pub type RecipeResult<T> = Result<T, RecipeError>;

/// Error raised while validating inputs or resolving a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum RecipeError {
    /// Invalid, missing or conflicting option input.
    #[error("configuration error for `{option}`: {message}")]
    #[diagnostic(
        code(xdispatch::configuration),
        help("Run `xdispatch-recipe options` to list recognized options and their values")
    )]
    Configuration { option: String, message: String },

    /// A platform field holds a value outside the recognized enumeration.
    #[error("unsupported platform {field} `{value}`")]
    #[diagnostic(code(xdispatch::unsupported_platform))]
    UnsupportedPlatform { field: String, value: String },
}

impl RecipeError {
    /// Create a configuration error for the given option.
    pub fn configuration(option: impl Into<String>, message: impl Into<String>) -> Self {
        RecipeError::Configuration {
            option: option.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported-platform error for the given descriptor field.
    pub fn unsupported_platform(field: impl Into<String>, value: impl Into<String>) -> Self {
        RecipeError::UnsupportedPlatform {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, RecipeError::Configuration { .. })
    }

    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self, RecipeError::UnsupportedPlatform { .. })
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RecipeError::Configuration { option, message } => {
                Diagnostic::error(format!("invalid configuration for option `{}`", option))
                    .with_context(message.clone())
                    .with_suggestion(suggestions::LIST_OPTIONS)
                    .with_suggestion(format!(
                        "Pass a valid value with `-o {}=<value>`",
                        option
                    ))
            }

            RecipeError::UnsupportedPlatform { field, value } => {
                let mut diag = Diagnostic::error(format!(
                    "unsupported platform {} `{}`",
                    field, value
                ));

                if field == "os" {
                    diag = diag.with_context(format!(
                        "recognized operating systems: {}",
                        crate::core::platform::Os::ALL
                            .iter()
                            .map(|os| os.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ));
                }

                diag.with_suggestion(suggestions::CHECK_SETTINGS)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic as _;

    #[test]
    fn test_configuration_diagnostic_names_option() {
        let err = RecipeError::configuration("backend_qt", "unknown option");
        let output = err.to_diagnostic().format(false);

        assert!(output.contains("backend_qt"));
        assert!(output.contains("unknown option"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_unsupported_os_lists_known_values() {
        let err = RecipeError::unsupported_platform("os", "Plan9");
        let output = err.to_diagnostic().format(false);

        assert!(output.contains("Plan9"));
        assert!(output.contains("iOS"));
        assert!(err.is_unsupported_platform());
    }

    #[test]
    fn test_error_codes() {
        let err = RecipeError::configuration("build_tests", "missing");
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("xdispatch::configuration".to_string())
        );
        assert_eq!(
            err.to_string(),
            "configuration error for `build_tests`: missing"
        );
    }
}
