//! Whole-package resolution.

use serde::Serialize;

use crate::builder::components::{build_components, ComponentMap};
use crate::builder::variables::{build_variables, BuildVariable};
use crate::core::error::RecipeResult;
use crate::core::options::OptionSet;
use crate::core::platform::PlatformDescriptor;
use crate::resolver::{resolve_requirements, resolve_tool_requirements, Requirement};

/// Name the package is published under.
pub const PACKAGE_NAME: &str = "xdispatch";

/// Name used by `find_package` in consuming CMake projects.
pub const FIND_PACKAGE_ALIAS: &str = "XDispatch2";

/// Generators the package expects its consumers to run.
pub const GENERATORS: [&str; 3] = ["cmake_find_package", "cmake_paths", "json"];

/// Everything resolved for one `(options, platform)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageResolution {
    pub package_name: &'static str,
    pub lookup_alias: &'static str,
    pub settings: PlatformDescriptor,
    pub options: OptionSet,
    pub requirements: Vec<Requirement>,
    pub tool_requirements: Vec<Requirement>,
    pub variables: Vec<BuildVariable>,
    pub components: ComponentMap,
    pub link_order: Vec<String>,
    pub generators: Vec<&'static str>,
}

impl PackageResolution {
    /// External packages referenced by components but not required.
    pub fn unsatisfied_references(&self) -> Vec<&str> {
        self.components
            .external_packages()
            .into_iter()
            .filter(|package| !self.requirements.iter().any(|r| r.name == *package))
            .collect()
    }
}

/// Resolve requirements, build variables and components.
///
/// Fails before producing anything if the options or the platform are
/// invalid; no partial result is returned.
pub fn resolve_package(
    options: &OptionSet,
    platform: &PlatformDescriptor,
    version: Option<&str>,
) -> RecipeResult<PackageResolution> {
    tracing::debug!(options = %options, platform = %platform, "resolving {}", PACKAGE_NAME);

    let requirements = resolve_requirements(options, platform)?;
    let tool_requirements = resolve_tool_requirements(options, platform)?;
    let variables = build_variables(options, version)?;
    let components = build_components(options, platform)?;
    let link_order = components
        .link_order()?
        .into_iter()
        .map(str::to_string)
        .collect();

    let resolution = PackageResolution {
        package_name: PACKAGE_NAME,
        lookup_alias: FIND_PACKAGE_ALIAS,
        settings: platform.clone(),
        options: options.clone(),
        requirements,
        tool_requirements,
        variables,
        components,
        link_order,
        generators: GENERATORS.to_vec(),
    };

    for package in resolution.unsatisfied_references() {
        tracing::warn!("component references `{}` which is not a requirement", package);
    }

    tracing::debug!(
        requirements = resolution.requirements.len(),
        components = resolution.components.len(),
        "resolved {}",
        PACKAGE_NAME
    );

    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::components::{BACKEND_COMPONENT, BASE_COMPONENT};
    use crate::builder::platform_rules::IOS_FRAMEWORKS;
    use crate::core::options::{OptionValue, BACKEND_PRIMARY, BACKEND_SECONDARY, BUILD_TESTS};
    use crate::core::platform::Os;

    fn options(tests: bool, primary: bool, secondary: OptionValue) -> OptionSet {
        OptionSet::empty()
            .with(BUILD_TESTS, tests)
            .with(BACKEND_PRIMARY, primary)
            .with(BACKEND_SECONDARY, secondary)
    }

    #[test]
    fn test_linux_scenario() {
        let resolution = resolve_package(
            &options(false, true, OptionValue::Absent),
            &PlatformDescriptor::new(Os::Linux),
            None,
        )
        .unwrap();

        assert_eq!(resolution.package_name, "xdispatch");
        assert_eq!(resolution.lookup_alias, "XDispatch2");
        assert!(resolution.requirements.iter().any(|r| r.name == "qt"));
        for pinned in ["expat", "glib", "libffi"] {
            assert!(resolution
                .requirements
                .iter()
                .any(|r| r.name == pinned && r.overriding));
        }
        assert_eq!(resolution.link_order, vec![BASE_COMPONENT, BACKEND_COMPONENT]);
        assert!(resolution.unsatisfied_references().is_empty());
    }

    #[test]
    fn test_ios_scenario() {
        let resolution = resolve_package(
            &options(false, true, OptionValue::Absent),
            &PlatformDescriptor::new(Os::Ios),
            Some("2.0.0"),
        )
        .unwrap();

        let base = resolution.components.get(BASE_COMPONENT).unwrap();
        assert!(base.libraries.contains(&"qtdispatch".to_string()));
        for framework in IOS_FRAMEWORKS {
            assert!(base.frameworks.iter().any(|f| f == framework));
        }
        assert!(resolution.components.contains(BACKEND_COMPONENT));
    }

    #[test]
    fn test_tests_only_scenario() {
        for os in Os::ALL {
            let resolution = resolve_package(
                &options(true, false, OptionValue::Absent),
                &PlatformDescriptor::new(os),
                None,
            )
            .unwrap();

            assert!(resolution.requirements.is_empty());
            assert_eq!(resolution.components.names(), vec![BASE_COMPONENT]);
            assert!(resolution.components.get(BASE_COMPONENT).unwrap().requires.is_empty());
        }
    }

    #[test]
    fn test_unknown_option_scenario() {
        let set = OptionSet::with_defaults().with("with_docs", true);
        let err = resolve_package(&set, &PlatformDescriptor::new(Os::Linux), None).unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("with_docs"));
    }

    #[test]
    fn test_component_references_are_required_everywhere() {
        for primary in [true, false] {
            for secondary in [OptionValue::Absent, OptionValue::True, OptionValue::False] {
                for os in Os::ALL {
                    let resolution = resolve_package(
                        &options(false, primary, secondary),
                        &PlatformDescriptor::new(os),
                        None,
                    )
                    .unwrap();
                    assert!(resolution.unsatisfied_references().is_empty());
                }
            }
        }
    }

    #[test]
    fn test_resolution_is_deterministic_and_serializable() {
        let set = options(true, true, OptionValue::True);
        let platform = PlatformDescriptor::new(Os::Ios);

        let first = resolve_package(&set, &platform, None).unwrap();
        let second = resolve_package(&set, &platform, None).unwrap();
        assert_eq!(first, second);

        let json = serde_json::to_value(&first).unwrap();
        assert_eq!(json["package_name"], "xdispatch");
        assert_eq!(json["settings"]["os"], "iOS");
        assert_eq!(json["options"]["backend_secondary"], "true");
        assert_eq!(json["requirements"][0]["override"], false);
    }
}
