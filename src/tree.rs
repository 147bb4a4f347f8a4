//! # Route Tree
//!
//! The author-defined, immutable tree of groups ("sets") and pages.
//!
//! ## Key Invariants
//!
//! 1. **Unique Names**: every page name appears exactly once in the tree. This
//!    is checked by [`TreeBuilder::build`], never at resolution time.
//! 2. **Immutability**: once built, a [`RouteTree`] exposes read-only views only.
//! 3. **Single Ancestry**: a page has exactly one chain of ancestor groups.
//! 4. **Document Order**: sibling order decides page order only, never wrapper
//!    nesting.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::TreeError;
use crate::props::Props;

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERING UNITS
// ═══════════════════════════════════════════════════════════════════════════════

/// A transform that renders its own output around nested content.
pub trait Wrapper: Send + Sync {
    fn name(&self) -> &str;
    fn render(&self, props: &Props, children: &str) -> String;
}

/// The content-producing unit of a page.
pub trait PageContent: Send + Sync {
    fn name(&self) -> &str;
    fn render(&self, props: &Props) -> String;
}

/// Closure-backed [`Wrapper`].
pub struct FnWrapper<F> {
    name: String,
    render: F,
}

impl<F> FnWrapper<F>
where
    F: Fn(&Props, &str) -> String + Send + Sync,
{
    pub fn new(name: impl Into<String>, render: F) -> Self {
        Self {
            name: name.into(),
            render,
        }
    }
}

impl<F> Wrapper for FnWrapper<F>
where
    F: Fn(&Props, &str) -> String + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, props: &Props, children: &str) -> String {
        (self.render)(props, children)
    }
}

/// Closure-backed [`PageContent`].
pub struct FnContent<F> {
    name: String,
    render: F,
}

impl<F> FnContent<F>
where
    F: Fn(&Props) -> String + Send + Sync,
{
    pub fn new(name: impl Into<String>, render: F) -> Self {
        Self {
            name: name.into(),
            render,
        }
    }
}

impl<F> PageContent for FnContent<F>
where
    F: Fn(&Props) -> String + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, props: &Props) -> String {
        (self.render)(props)
    }
}

/// Shorthand for a shared closure wrapper.
pub fn wrapper<F>(name: impl Into<String>, render: F) -> Arc<dyn Wrapper>
where
    F: Fn(&Props, &str) -> String + Send + Sync + 'static,
{
    Arc::new(FnWrapper::new(name, render))
}

/// Shorthand for shared closure page content.
pub fn content<F>(name: impl Into<String>, render: F) -> Arc<dyn PageContent>
where
    F: Fn(&Props) -> String + Send + Sync + 'static,
{
    Arc::new(FnContent::new(name, render))
}

/// Wrapper list of a group. Accepts a single wrapper or a sequence.
#[derive(Clone, Default)]
pub struct WrapList(Vec<Arc<dyn Wrapper>>);

impl From<Arc<dyn Wrapper>> for WrapList {
    fn from(w: Arc<dyn Wrapper>) -> Self {
        WrapList(vec![w])
    }
}

impl From<Vec<Arc<dyn Wrapper>>> for WrapList {
    fn from(ws: Vec<Arc<dyn Wrapper>>) -> Self {
        WrapList(ws)
    }
}

impl<const N: usize> From<[Arc<dyn Wrapper>; N]> for WrapList {
    fn from(ws: [Arc<dyn Wrapper>; N]) -> Self {
        WrapList(ws.into_iter().collect())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODES
// ═══════════════════════════════════════════════════════════════════════════════

/// Grouping node: applies its wrappers and props to every page beneath it.
#[derive(Clone)]
pub struct GroupNode {
    wrappers: Vec<Arc<dyn Wrapper>>,
    shared_props: Props,
    props: Props,
    children: Vec<RouteNode>,
}

impl GroupNode {
    pub fn new(wrap: impl Into<WrapList>) -> Self {
        Self {
            wrappers: wrap.into().0,
            shared_props: Props::new(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// A group that contributes no wrappers, only structure and props.
    pub fn bare() -> Self {
        Self::new(WrapList::default())
    }

    /// Adds a shared prop applied to every wrapper of this group.
    pub fn shared_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.shared_props.insert(key, value);
        self
    }

    pub fn shared_props(mut self, props: Props) -> Self {
        self.shared_props = self.shared_props.overlay(&props);
        self
    }

    /// Adds an ad-hoc prop passed alongside the wrapper list. Ad-hoc props
    /// override shared props with the same key.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key, value);
        self
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props = self.props.overlay(&props);
        self
    }

    pub fn child(mut self, node: impl Into<RouteNode>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn wrappers(&self) -> &[Arc<dyn Wrapper>] {
        &self.wrappers
    }

    pub fn shared(&self) -> &Props {
        &self.shared_props
    }

    pub fn adhoc(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[RouteNode] {
        &self.children
    }
}

impl fmt::Debug for GroupNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupNode")
            .field(
                "wrappers",
                &self.wrappers.iter().map(|w| w.name()).collect::<Vec<_>>(),
            )
            .field("shared_props", &self.shared_props)
            .field("props", &self.props)
            .field("children", &self.children)
            .finish()
    }
}

/// Addressable page: the unit of navigation.
#[derive(Clone)]
pub struct PageNode {
    path: String,
    name: String,
    content: Arc<dyn PageContent>,
    local_props: Props,
    title: Option<String>,
}

impl PageNode {
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        content: Arc<dyn PageContent>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            content,
            local_props: Props::new(),
            title: None,
        }
    }

    /// Adds a page-local prop, visible to this page's content only.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.local_props.insert(key, value);
        self
    }

    pub fn local_props(mut self, props: Props) -> Self {
        self.local_props = self.local_props.overlay(&props);
        self
    }

    /// Human-readable title, used when the rendered page has no heading.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Arc<dyn PageContent> {
        &self.content
    }

    pub fn props(&self) -> &Props {
        &self.local_props
    }

    pub fn page_title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl fmt::Debug for PageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageNode")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("content", &self.content.name())
            .field("local_props", &self.local_props)
            .field("title", &self.title)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum RouteNode {
    Group(GroupNode),
    Page(PageNode),
}

impl From<GroupNode> for RouteNode {
    fn from(group: GroupNode) -> Self {
        RouteNode::Group(group)
    }
}

impl From<PageNode> for RouteNode {
    fn from(page: PageNode) -> Self {
        RouteNode::Page(page)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct RouteTree {
    roots: Vec<RouteNode>,
}

impl RouteTree {
    pub fn builder() -> TreeBuilder {
        TreeBuilder::default()
    }

    pub fn roots(&self) -> &[RouteNode] {
        &self.roots
    }

    /// All pages in document order.
    pub fn pages(&self) -> Vec<&PageNode> {
        let mut pages = Vec::new();
        collect_pages(&self.roots, &mut pages);
        pages
    }

    pub fn page(&self, name: &str) -> Option<&PageNode> {
        self.pages().into_iter().find(|p| p.name() == name)
    }

    pub fn contains_page(&self, name: &str) -> bool {
        self.page(name).is_some()
    }
}

fn collect_pages<'a>(nodes: &'a [RouteNode], out: &mut Vec<&'a PageNode>) {
    for node in nodes {
        match node {
            RouteNode::Page(page) => out.push(page),
            RouteNode::Group(group) => collect_pages(&group.children, out),
        }
    }
}

#[derive(Debug, Default)]
pub struct TreeBuilder {
    roots: Vec<RouteNode>,
}

impl TreeBuilder {
    pub fn node(mut self, node: impl Into<RouteNode>) -> Self {
        self.roots.push(node.into());
        self
    }

    pub fn nodes(mut self, nodes: impl IntoIterator<Item = RouteNode>) -> Self {
        self.roots.extend(nodes);
        self
    }

    /// Validates page names and freezes the tree.
    pub fn build(self) -> Result<RouteTree, TreeError> {
        let page_count = validate_names(&self.roots)?;
        tracing::debug!(pages = page_count, "route tree built");
        Ok(RouteTree { roots: self.roots })
    }
}

fn validate_names(roots: &[RouteNode]) -> Result<usize, TreeError> {
    let mut pages = Vec::new();
    collect_pages(roots, &mut pages);

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for page in &pages {
        if page.name.trim().is_empty() {
            return Err(TreeError::EmptyPageName {
                path: page.path.clone(),
            });
        }
        if let Some(first_path) = seen.insert(page.name(), page.path()) {
            return Err(TreeError::DuplicatePageName {
                name: page.name.clone(),
                first_path: first_path.to_string(),
                second_path: page.path.clone(),
            });
        }
    }
    Ok(pages.len())
}
