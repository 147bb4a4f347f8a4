//! # Composition Resolver
//!
//! Walks from the tree root to the active page and emits the nested
//! invocation sequence for that page only. Non-matched branches are inert.
//!
//! ## Key Invariants
//!
//! 1. **All-or-Nothing**: either every ancestor group resolves or the whole
//!    resolution fails. A partial chain is never returned.
//! 2. **Fresh Every Time**: nothing is cached between calls, so no wrapper
//!    state from a previous page survives a navigation.
//! 3. **Prop Layering**: page props are the matched path params overlaid with
//!    the page's local props (local wins).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

use crate::chain::{build_chain, ChainLink};
use crate::error::ResolveError;
use crate::props::Props;
use crate::tree::{GroupNode, PageContent, PageNode, RouteNode, RouteTree};

/// What the path-matching collaborator reports on every navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    pub page_name: String,
    #[serde(default)]
    pub params: Props,
}

impl RouteMatch {
    pub fn named(page_name: impl Into<String>) -> Self {
        Self {
            page_name: page_name.into(),
            params: Props::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key, value);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVED COMPOSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// The concrete wrapper chain for one active page, outermost first, with the
/// page content innermost. Rebuilt on every navigation.
#[derive(Clone)]
pub struct ResolvedComposition {
    chain: Vec<ChainLink>,
    page: PageNode,
    page_props: Props,
}

impl ResolvedComposition {
    pub fn chain(&self) -> &[ChainLink] {
        &self.chain
    }

    pub fn page(&self) -> &PageNode {
        &self.page
    }

    pub fn page_name(&self) -> &str {
        self.page.name()
    }

    pub fn content(&self) -> &Arc<dyn PageContent> {
        self.page.content()
    }

    /// Props injected into the page content.
    pub fn page_props(&self) -> &Props {
        &self.page_props
    }

    /// Wrapper names outermost first, followed by the page name.
    pub fn names(&self) -> Vec<&str> {
        self.chain
            .iter()
            .map(|link| link.name())
            .chain(std::iter::once(self.page.name()))
            .collect()
    }

    pub fn render_page(&self) -> String {
        self.page.content().render(&self.page_props)
    }

    /// Folds the chain around `inner`, innermost wrapper first.
    pub fn wrap(&self, inner: String) -> String {
        self.chain
            .iter()
            .rev()
            .fold(inner, |acc, link| link.wrapper().render(link.props(), &acc))
    }

    pub fn plan(&self) -> CompositionPlan {
        CompositionPlan {
            wrappers: self
                .chain
                .iter()
                .map(|link| PlannedWrapper {
                    name: link.name().to_string(),
                    props: link.props().clone(),
                    depth: link.depth(),
                })
                .collect(),
            page: PlannedPage {
                name: self.page.name().to_string(),
                path: self.page.path().to_string(),
                content: self.page.content().name().to_string(),
                props: self.page_props.clone(),
            },
        }
    }

    /// SHA-256 over the canonical plan. Equal for equal (tree, match) inputs.
    pub fn fingerprint(&self) -> String {
        self.plan().fingerprint()
    }
}

impl fmt::Debug for ResolvedComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedComposition")
            .field("chain", &self.chain)
            .field("page", &self.page.name())
            .field("page_props", &self.page_props)
            .finish()
    }
}

/// Serializable description of a composition, for handing to a substrate that
/// lives outside this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionPlan {
    pub wrappers: Vec<PlannedWrapper>,
    pub page: PlannedPage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedWrapper {
    pub name: String,
    pub props: Props,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedPage {
    pub name: String,
    pub path: String,
    pub content: String,
    pub props: Props,
}

impl CompositionPlan {
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        format!("{:x}", hasher.finalize())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolves the composition for the page named `page_name`.
pub fn resolve(tree: &RouteTree, page_name: &str) -> Result<ResolvedComposition, ResolveError> {
    resolve_match(tree, &RouteMatch::named(page_name))
}

/// Resolves the composition for a router match, injecting its path params
/// beneath the page's local props.
pub fn resolve_match(
    tree: &RouteTree,
    route: &RouteMatch,
) -> Result<ResolvedComposition, ResolveError> {
    let name = route.page_name.as_str();

    let mut trail = Vec::new();
    if !locate(tree.roots(), name, &mut trail) {
        tracing::debug!(page = name, "page not found");
        return Err(ResolveError::PageNotFound(name.to_string()));
    }

    let (ancestors, page) = walk_trail(tree.roots(), &trail, name)?;
    let chain = build_chain(&ancestors);
    let page_props = route.params.overlay(page.props());

    tracing::debug!(
        page = name,
        groups = ancestors.len(),
        wrappers = chain.len(),
        "composition resolved"
    );

    Ok(ResolvedComposition {
        chain,
        page: page.clone(),
        page_props,
    })
}

/// Depth-first search recording the child index taken at each level.
fn locate(nodes: &[RouteNode], name: &str, trail: &mut Vec<usize>) -> bool {
    for (index, node) in nodes.iter().enumerate() {
        trail.push(index);
        let found = match node {
            RouteNode::Page(page) => page.name() == name,
            RouteNode::Group(group) => locate(group.children(), name, trail),
        };
        if found {
            return true;
        }
        trail.pop();
    }
    false
}

/// Follows an index trail from the roots. Every step but the last must land
/// on a group and the last on the named page.
fn walk_trail<'a>(
    roots: &'a [RouteNode],
    trail: &[usize],
    name: &str,
) -> Result<(Vec<&'a GroupNode>, &'a PageNode), ResolveError> {
    let broken = |depth: usize| ResolveError::BrokenAncestry {
        page: name.to_string(),
        depth,
    };

    let (last, steps) = trail.split_last().ok_or_else(|| broken(0))?;
    let mut ancestors = Vec::with_capacity(steps.len());
    let mut level = roots;

    for (depth, &index) in steps.iter().enumerate() {
        match level.get(index) {
            Some(RouteNode::Group(group)) => {
                ancestors.push(group);
                level = group.children();
            }
            _ => return Err(broken(depth)),
        }
    }

    match level.get(*last) {
        Some(RouteNode::Page(page)) if page.name() == name => Ok((ancestors, page)),
        _ => Err(broken(steps.len())),
    }
}
