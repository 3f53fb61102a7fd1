//! Exported package components.
//!
//! A component is an independently linkable unit of the installed package.
//! Components are declared in a static table; platform rules are applied
//! afterwards by [`crate::builder::platform_rules`].

use std::fmt;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::builder::platform_rules::apply_platform_overrides;
use crate::core::condition::Condition;
use crate::core::error::{RecipeError, RecipeResult};
use crate::core::options::{OptionSet, OptionValue, BACKEND_PRIMARY};
use crate::core::platform::PlatformDescriptor;

/// The primary library.
pub const BASE_COMPONENT: &str = "libxdispatch";

/// The Qt5 backend library.
pub const BACKEND_COMPONENT: &str = "libqtdispatch";

/// A dependency edge of a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentRef {
    /// Another component of this package
    Internal(String),
    /// A component of an external requirement, written `package::component`
    External { package: String, component: String },
}

impl ComponentRef {
    /// Parse `name` or `package::component`.
    pub fn parse(s: &str) -> Self {
        match s.split_once("::") {
            Some((package, component)) => ComponentRef::External {
                package: package.to_string(),
                component: component.to_string(),
            },
            None => ComponentRef::Internal(s.to_string()),
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, ComponentRef::External { .. })
    }

    /// The external package this reference points into.
    pub fn package(&self) -> Option<&str> {
        match self {
            ComponentRef::External { package, .. } => Some(package),
            ComponentRef::Internal(_) => None,
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentRef::Internal(name) => f.write_str(name),
            ComponentRef::External { package, component } => {
                write!(f, "{}::{}", package, component)
            }
        }
    }
}

impl Serialize for ComponentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A linkable unit of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    /// Libraries, in link order
    pub libraries: Vec<String>,
    /// System frameworks, ordered and without duplicates
    pub frameworks: Vec<String>,
    pub requires: Vec<ComponentRef>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Component {
            name: name.into(),
            libraries: Vec::new(),
            frameworks: Vec::new(),
            requires: Vec::new(),
        }
    }

    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.add_library(library);
        self
    }

    pub fn with_require(mut self, reference: ComponentRef) -> Self {
        self.add_require(reference);
        self
    }

    pub fn add_library(&mut self, library: impl Into<String>) {
        self.libraries.push(library.into());
    }

    /// Append a framework unless already present.
    pub fn add_framework(&mut self, framework: impl Into<String>) {
        let framework = framework.into();
        if !self.frameworks.contains(&framework) {
            self.frameworks.push(framework);
        }
    }

    /// Append a dependency edge unless already present.
    pub fn add_require(&mut self, reference: ComponentRef) {
        if !self.requires.contains(&reference) {
            self.requires.push(reference);
        }
    }

    pub fn external_requires(&self) -> impl Iterator<Item = &ComponentRef> {
        self.requires.iter().filter(|r| r.is_external())
    }
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Component", 3)?;
        state.serialize_field("libs", &self.libraries)?;
        state.serialize_field("frameworks", &self.frameworks)?;
        state.serialize_field("requires", &self.requires)?;
        state.end()
    }
}

/// Components keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentMap {
    components: Vec<Component>,
}

impl ComponentMap {
    pub fn new() -> Self {
        ComponentMap::default()
    }

    /// Add a component. Names are unique within a map.
    pub fn insert(&mut self, component: Component) -> RecipeResult<()> {
        if self.contains(&component.name) {
            return Err(RecipeError::configuration(
                component.name,
                "component declared twice",
            ));
        }
        self.components.push(component);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// External packages referenced by any component, first use first.
    pub fn external_packages(&self) -> Vec<&str> {
        let mut packages = Vec::new();
        for component in &self.components {
            for package in component.requires.iter().filter_map(|r| r.package()) {
                if !packages.contains(&package) {
                    packages.push(package);
                }
            }
        }
        packages
    }

    /// Internal components ordered so that dependencies come first.
    ///
    /// Fails if a component requires an undeclared component or if the
    /// internal edges form a cycle.
    pub fn link_order(&self) -> RecipeResult<Vec<&str>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = self
            .components
            .iter()
            .map(|c| graph.add_node(c.name.as_str()))
            .collect();

        for (component, &node) in self.components.iter().zip(&nodes) {
            for reference in &component.requires {
                if let ComponentRef::Internal(dep) = reference {
                    let dep_index = self
                        .components
                        .iter()
                        .position(|c| &c.name == dep)
                        .ok_or_else(|| {
                            RecipeError::configuration(
                                component.name.as_str(),
                                format!("requires undeclared component `{}`", dep),
                            )
                        })?;
                    graph.add_edge(nodes[dep_index], node, ());
                }
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            RecipeError::configuration(
                graph[cycle.node_id()],
                "component dependencies form a cycle",
            )
        })?;

        Ok(order.into_iter().map(|node| graph[node]).collect())
    }
}

impl Serialize for ComponentMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.components.len()))?;
        for component in &self.components {
            map.serialize_entry(&component.name, component)?;
        }
        map.end()
    }
}

/// Declaration of a component.
#[derive(Debug, Clone, Copy)]
pub struct ComponentDecl {
    pub name: &'static str,
    pub library: &'static str,
    /// `name` or `package::component`
    pub requires: &'static [&'static str],
    pub condition: Condition,
}

impl ComponentDecl {
    fn to_component(self) -> Component {
        let mut component = Component::new(self.name).with_library(self.library);
        for reference in self.requires {
            component.add_require(ComponentRef::parse(reference));
        }
        component
    }
}

/// The package's components, in declaration order.
pub static COMPONENTS: &[ComponentDecl] = &[
    ComponentDecl {
        name: BASE_COMPONENT,
        library: "xdispatch",
        requires: &[],
        condition: Condition::Always,
    },
    ComponentDecl {
        name: BACKEND_COMPONENT,
        library: "qtdispatch",
        requires: &[BASE_COMPONENT, "qt::qtCore"],
        condition: Condition::OptionIs(BACKEND_PRIMARY, OptionValue::True),
    },
];

/// Build the component map for the given inputs, platform rules applied.
pub fn build_components(
    options: &OptionSet,
    platform: &PlatformDescriptor,
) -> RecipeResult<ComponentMap> {
    options.validate()?;

    let mut components = ComponentMap::new();
    for decl in COMPONENTS {
        if decl.condition.evaluate(options, platform)? {
            components.insert(decl.to_component())?;
        }
    }

    let components = apply_platform_overrides(components, platform);
    tracing::debug!(components = ?components.names(), os = %platform.os, "built components");

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::platform_rules::IOS_FRAMEWORKS;
    use crate::core::options::{BACKEND_SECONDARY, BUILD_TESTS};
    use crate::core::platform::Os;

    fn options(tests: bool, primary: bool) -> OptionSet {
        OptionSet::empty()
            .with(BUILD_TESTS, tests)
            .with(BACKEND_PRIMARY, primary)
            .with(BACKEND_SECONDARY, OptionValue::Absent)
    }

    #[test]
    fn test_linux_with_primary_backend() {
        let components =
            build_components(&options(false, true), &PlatformDescriptor::new(Os::Linux)).unwrap();

        assert_eq!(components.names(), vec![BASE_COMPONENT, BACKEND_COMPONENT]);

        let base = components.get(BASE_COMPONENT).unwrap();
        assert_eq!(base.libraries, vec!["xdispatch"]);
        assert!(base.requires.is_empty());
        assert!(base.frameworks.is_empty());

        let backend = components.get(BACKEND_COMPONENT).unwrap();
        assert_eq!(backend.libraries, vec!["qtdispatch"]);
        assert_eq!(
            backend.requires,
            vec![
                ComponentRef::Internal(BASE_COMPONENT.to_string()),
                ComponentRef::parse("qt::qtCore"),
            ]
        );
        assert!(backend.frameworks.is_empty());
    }

    #[test]
    fn test_ios_folds_backend_into_base() {
        let components =
            build_components(&options(false, true), &PlatformDescriptor::new(Os::Ios)).unwrap();

        assert_eq!(components.names(), vec![BASE_COMPONENT, BACKEND_COMPONENT]);

        let base = components.get(BASE_COMPONENT).unwrap();
        assert_eq!(base.libraries, vec!["xdispatch", "qtdispatch"]);
        assert_eq!(base.frameworks, IOS_FRAMEWORKS.to_vec());
        assert_eq!(base.requires, vec![ComponentRef::parse("qt::qtCore")]);

        let backend = components.get(BACKEND_COMPONENT).unwrap();
        assert_eq!(backend.frameworks, IOS_FRAMEWORKS.to_vec());
    }

    #[test]
    fn test_without_backend_only_base() {
        for os in Os::ALL {
            let components =
                build_components(&options(true, false), &PlatformDescriptor::new(os)).unwrap();

            assert_eq!(components.names(), vec![BASE_COMPONENT]);
            assert!(components.get(BASE_COMPONENT).unwrap().requires.is_empty());
        }
    }

    #[test]
    fn test_unknown_option_fails() {
        let set = OptionSet::with_defaults().with("static", true);
        let err = build_components(&set, &PlatformDescriptor::new(Os::Ios)).unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn test_secondary_backend_adds_no_component() {
        let linux = PlatformDescriptor::new(Os::Linux);
        let absent = build_components(&options(false, true), &linux).unwrap();

        for secondary in [OptionValue::True, OptionValue::False] {
            let set = options(false, true).with(BACKEND_SECONDARY, secondary);
            assert_eq!(build_components(&set, &linux).unwrap(), absent);
        }
    }

    #[test]
    fn test_link_order_puts_base_first() {
        let components =
            build_components(&options(false, true), &PlatformDescriptor::new(Os::Macos)).unwrap();

        assert_eq!(
            components.link_order().unwrap(),
            vec![BASE_COMPONENT, BACKEND_COMPONENT]
        );
        assert_eq!(components.external_packages(), vec!["qt"]);
    }

    #[test]
    fn test_link_order_rejects_cycles_and_dangling_refs() {
        let mut cyclic = ComponentMap::new();
        cyclic
            .insert(Component::new("a").with_require(ComponentRef::parse("b")))
            .unwrap();
        cyclic
            .insert(Component::new("b").with_require(ComponentRef::parse("a")))
            .unwrap();
        assert!(cyclic.link_order().unwrap_err().to_string().contains("cycle"));

        let mut dangling = ComponentMap::new();
        dangling
            .insert(Component::new("a").with_require(ComponentRef::parse("missing")))
            .unwrap();
        assert!(dangling
            .link_order()
            .unwrap_err()
            .to_string()
            .contains("missing"));
    }

    #[test]
    fn test_duplicate_component_rejected() {
        let mut map = ComponentMap::new();
        map.insert(Component::new("a")).unwrap();
        assert!(map.insert(Component::new("a")).is_err());
    }

    #[test]
    fn test_serializes_in_declaration_order() {
        let components =
            build_components(&options(false, true), &PlatformDescriptor::new(Os::Linux)).unwrap();
        let text = serde_json::to_string(&components).unwrap();
        let base = text.find(&format!("\"{}\":", BASE_COMPONENT)).unwrap();
        let backend = text.find(&format!("\"{}\":", BACKEND_COMPONENT)).unwrap();
        assert!(base < backend);

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert_eq!(
            json[BACKEND_COMPONENT]["requires"],
            serde_json::json!(["libxdispatch", "qt::qtCore"])
        );
        assert_eq!(json[BASE_COMPONENT]["libs"], serde_json::json!(["xdispatch"]));
    }
}
