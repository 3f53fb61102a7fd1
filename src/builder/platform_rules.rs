//! Platform-specific post-processing of the component map.
//!
//! Rules are plain table rows applied in order after the component map has
//! been built. A rule that names a component missing from the map is
//! skipped.

use crate::builder::components::{ComponentMap, BACKEND_COMPONENT, BASE_COMPONENT};
use crate::core::platform::{Os, PlatformDescriptor};

/// Frameworks the Qt5 backend needs on iOS, in link order.
pub const IOS_FRAMEWORKS: [&str; 4] = ["UIKit", "Foundation", "CoreFoundation", "MobileCoreServices"];

/// What a platform rule does to the component map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformAction {
    /// Append frameworks to a component.
    AppendFrameworks {
        component: &'static str,
        frameworks: &'static [&'static str],
    },
    /// Append the libraries, external requires and frameworks of `source`
    /// onto `target`. `source` stays in the map.
    FoldInto {
        source: &'static str,
        target: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct PlatformRule {
    pub os: Os,
    pub action: PlatformAction,
}

/// Rules applied by [`apply_platform_overrides`].
///
/// iOS builds are static, so symbols cannot be resolved at load time and
/// the backend has to be linked into the primary library.
pub static PLATFORM_RULES: &[PlatformRule] = &[
    PlatformRule {
        os: Os::Ios,
        action: PlatformAction::AppendFrameworks {
            component: BACKEND_COMPONENT,
            frameworks: &IOS_FRAMEWORKS,
        },
    },
    PlatformRule {
        os: Os::Ios,
        action: PlatformAction::FoldInto {
            source: BACKEND_COMPONENT,
            target: BASE_COMPONENT,
        },
    },
];

/// Apply the package's platform rules.
pub fn apply_platform_overrides(components: ComponentMap, platform: &PlatformDescriptor) -> ComponentMap {
    apply_rules(PLATFORM_RULES, components, platform)
}

/// Apply the rules matching `platform.os`, in order.
pub fn apply_rules(
    rules: &[PlatformRule],
    mut components: ComponentMap,
    platform: &PlatformDescriptor,
) -> ComponentMap {
    for rule in rules.iter().filter(|rule| rule.os == platform.os) {
        match rule.action {
            PlatformAction::AppendFrameworks {
                component,
                frameworks,
            } => match components.get_mut(component) {
                Some(target) => {
                    for framework in frameworks {
                        target.add_framework(*framework);
                    }
                }
                None => tracing::trace!(component, "framework rule skipped"),
            },

            PlatformAction::FoldInto { source, target } => {
                let Some(folded) = components.get(source).cloned() else {
                    tracing::trace!(source, "fold rule skipped");
                    continue;
                };
                let Some(target) = components.get_mut(target) else {
                    tracing::trace!(source, "fold rule skipped, no target");
                    continue;
                };

                for library in folded.libraries {
                    target.add_library(library);
                }
                for reference in folded.requires.into_iter().filter(|r| r.is_external()) {
                    target.add_require(reference);
                }
                for framework in folded.frameworks {
                    target.add_framework(framework);
                }
                tracing::debug!(source, target = %target.name, "folded component");
            }
        }
    }

    components
}
