//! # Route Manifests and Composer Config
//!
//! JSON description of a route tree. Wrappers and page contents are referenced
//! by registered name and looked up in a [`ComponentRegistry`].
//!
//! ```json
//! {
//!   "config": { "announcer": { "regionId": "route-announcer" } },
//!   "routes": [
//!     { "group": { "wrap": ["CustomWrapper", "GlobalLayout"], "children": [
//!       { "page": { "path": "/", "name": "home", "content": "Home" } }
//!     ] } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::announcer::AnnouncerConfig;
use crate::error::ManifestError;
use crate::matcher::PatternMatcher;
use crate::props::Props;
use crate::tree::{
    content, wrapper, GroupNode, PageContent, PageNode, RouteNode, RouteTree, Wrapper,
};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ComposerConfig {
    pub announcer: AnnouncerConfig,
}

impl ComposerConfig {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MANIFEST TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// A single wrapper name or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WrapSpec {
    One(String),
    Many(Vec<String>),
}

impl WrapSpec {
    pub fn names(&self) -> Vec<&str> {
        match self {
            WrapSpec::One(name) => vec![name.as_str()],
            WrapSpec::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeManifest {
    Group(GroupManifest),
    Page(PageManifest),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupManifest {
    #[serde(default)]
    pub wrap: Option<WrapSpec>,
    #[serde(default)]
    pub shared: Props,
    /// Ad-hoc props passed alongside `wrap`.
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub children: Vec<NodeManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageManifest {
    pub path: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouterManifest {
    #[serde(default)]
    pub config: ComposerConfig,
    #[serde(default)]
    pub routes: Vec<NodeManifest>,
}

/// Everything needed to start navigating.
#[derive(Debug)]
pub struct LoadedRouter {
    pub tree: Arc<RouteTree>,
    pub matcher: PatternMatcher,
    pub config: ComposerConfig,
}

impl RouterManifest {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build_tree(&self, registry: &ComponentRegistry) -> Result<RouteTree, ManifestError> {
        let nodes = self
            .routes
            .iter()
            .map(|node| build_node(node, registry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RouteTree::builder().nodes(nodes).build()?)
    }

    /// Builds the tree and compiles every page path.
    pub fn load(&self, registry: &ComponentRegistry) -> Result<LoadedRouter, ManifestError> {
        let tree = self.build_tree(registry)?;
        let matcher = PatternMatcher::from_tree(&tree)?;
        Ok(LoadedRouter {
            tree: Arc::new(tree),
            matcher,
            config: self.config.clone(),
        })
    }

    /// Every wrapper and content name referenced, in document order.
    pub fn referenced_names(&self) -> (Vec<String>, Vec<String>) {
        let mut wrappers = Vec::new();
        let mut contents = Vec::new();
        collect_names(&self.routes, &mut wrappers, &mut contents);
        (wrappers, contents)
    }
}

fn collect_names(nodes: &[NodeManifest], wrappers: &mut Vec<String>, contents: &mut Vec<String>) {
    for node in nodes {
        match node {
            NodeManifest::Group(group) => {
                if let Some(wrap) = &group.wrap {
                    for name in wrap.names() {
                        if !wrappers.iter().any(|w| w == name) {
                            wrappers.push(name.to_string());
                        }
                    }
                }
                collect_names(&group.children, wrappers, contents);
            }
            NodeManifest::Page(page) => {
                if !contents.contains(&page.content) {
                    contents.push(page.content.clone());
                }
            }
        }
    }
}

fn build_node(node: &NodeManifest, registry: &ComponentRegistry) -> Result<RouteNode, ManifestError> {
    match node {
        NodeManifest::Group(group) => {
            let wrappers = match &group.wrap {
                Some(wrap) => wrap
                    .names()
                    .into_iter()
                    .map(|name| {
                        registry
                            .wrapper(name)
                            .ok_or_else(|| ManifestError::UnknownWrapper(name.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };

            let mut built = GroupNode::new(wrappers)
                .shared_props(group.shared.clone())
                .props(group.props.clone());
            for child in &group.children {
                built = built.child(build_node(child, registry)?);
            }
            Ok(built.into())
        }
        NodeManifest::Page(page) => {
            let unit = registry
                .content(&page.content)
                .ok_or_else(|| ManifestError::UnknownContent {
                    page: page.name.clone(),
                    content: page.content.clone(),
                })?;
            let mut built =
                PageNode::new(page.path.clone(), page.name.clone(), unit).local_props(page.props.clone());
            if let Some(title) = &page.title {
                built = built.title(title.clone());
            }
            Ok(built.into())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default, Clone)]
pub struct ComponentRegistry {
    wrappers: HashMap<String, Arc<dyn Wrapper>>,
    contents: HashMap<String, Arc<dyn PageContent>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wrapper(mut self, unit: Arc<dyn Wrapper>) -> Self {
        self.register_wrapper(unit);
        self
    }

    pub fn with_content(mut self, unit: Arc<dyn PageContent>) -> Self {
        self.register_content(unit);
        self
    }

    pub fn register_wrapper(&mut self, unit: Arc<dyn Wrapper>) {
        self.wrappers.insert(unit.name().to_string(), unit);
    }

    pub fn register_content(&mut self, unit: Arc<dyn PageContent>) {
        self.contents.insert(unit.name().to_string(), unit);
    }

    /// Exact name first, then a case-insensitive match.
    pub fn wrapper(&self, name: &str) -> Option<Arc<dyn Wrapper>> {
        lookup(&self.wrappers, name, "wrapper")
    }

    pub fn content(&self, name: &str) -> Option<Arc<dyn PageContent>> {
        lookup(&self.contents, name, "content")
    }

    /// Registry of inert stand-ins for every name the manifest references.
    /// Wrappers render `<Name>children</Name>`, contents render `<Name/>`.
    /// Enough to resolve composition plans without real components.
    pub fn inert_for(manifest: &RouterManifest) -> Self {
        let (wrapper_names, content_names) = manifest.referenced_names();
        let mut registry = Self::new();
        for name in wrapper_names {
            let tag = name.clone();
            registry.register_wrapper(wrapper(name, move |_props: &Props, children: &str| {
                format!("<{tag}>{children}</{tag}>")
            }));
        }
        for name in content_names {
            let tag = name.clone();
            registry.register_content(content(name, move |_props: &Props| format!("<{tag}/>")));
        }
        registry
    }
}

fn lookup<T: ?Sized>(units: &HashMap<String, Arc<T>>, name: &str, kind: &str) -> Option<Arc<T>> {
    if let Some(unit) = units.get(name) {
        return Some(Arc::clone(unit));
    }
    let lower = name.to_lowercase();
    let found = units
        .iter()
        .filter(|(registered, _)| registered.to_lowercase() == lower)
        .min_by(|a, b| a.0.cmp(b.0))?;
    tracing::warn!(
        requested = name,
        registered = %found.0,
        kind,
        "registry lookup fell back to case-insensitive match"
    );
    Some(Arc::clone(found.1))
}
