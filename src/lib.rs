//! # Route Set Composition (Ground Truth)
//!
//! Resolves a declarative tree of groups ("sets") and pages into the concrete
//! chain of wrappers around whichever page is active, and re-resolves it on
//! every navigation.
//!
//! ## Composition Invariants
//!
//! 1. **Outer-to-Inner**: a group wrapping `[W1, W2]` renders `W1(W2(child))`.
//!    Nested groups sit inside their ancestors. The page content is innermost.
//!
//! 2. **Prop Scope**: every wrapper of a group receives that group's shared props
//!    overlaid with the ad-hoc props passed alongside the wrapper list. Nothing
//!    crosses into ancestor or descendant groups.
//!
//! 3. **Page Props**: matched path params overlaid with the page's local props.
//!
//! 4. **Whole or Nothing**: resolution returns a complete chain or a typed error.
//!
//! 5. **Announce Once**: each committed navigation to a different page emits one
//!    announcement on the single live region; re-committing the same page emits
//!    none. A newer navigation supersedes an uncommitted one.
//!
//! ## Example
//!
//! ```
//! use router_native::{content, resolve, wrapper, GroupNode, PageNode, RouteTree};
//!
//! let layout = wrapper("Layout", |_, children| format!("<main>{children}</main>"));
//! let home = content("Home", |_| "<h1>Home</h1>".to_string());
//!
//! let tree = RouteTree::builder()
//!     .node(GroupNode::new(layout).child(PageNode::new("/", "home", home)))
//!     .build()
//!     .unwrap();
//!
//! let composition = resolve(&tree, "home").unwrap();
//! assert_eq!(composition.names(), vec!["Layout", "home"]);
//! ```

mod announcer;
mod bridge;
mod chain;
mod error;
mod manifest;
mod matcher;
mod navigator;
mod props;
mod render;
mod resolve;
mod tree;

#[cfg(test)]
mod test_fixtures;

#[cfg(test)]
mod announcer_tests;

pub use announcer::{
    announcement_text, global as global_live_region, install as install_live_region,
    shutdown as shutdown_live_region, Announcement, AnnouncementSink, Announcer,
    AnnouncerConfig, AnnouncerState, LiveRegion, Politeness, Transition, VISUALLY_HIDDEN_STYLE,
};
#[cfg(feature = "napi")]
pub use bridge::{resolve_composition_native, resolve_match_native};
pub use bridge::{plan_from_manifest, plan_json};
pub use chain::{build_chain, group_props, ChainLink};
pub use error::{AnnouncerError, ManifestError, PatternError, PlanError, ResolveError, TreeError};
pub use manifest::{
    ComponentRegistry, ComposerConfig, GroupManifest, LoadedRouter, NodeManifest, PageManifest,
    RouterManifest, WrapSpec,
};
pub use matcher::{PathMatcher, PatternMatcher, RoutePattern};
pub use navigator::{CommitTicket, Navigation, Navigator, PendingNavigation};
pub use props::Props;
pub use render::{AsyncRenderSubstrate, HtmlRenderer, RenderSubstrate, Rendered};
pub use resolve::{
    resolve, resolve_match, CompositionPlan, PlannedPage, PlannedWrapper, ResolvedComposition,
    RouteMatch,
};
pub use tree::{
    content, wrapper, FnContent, FnWrapper, GroupNode, PageContent, PageNode, RouteNode,
    RouteTree, TreeBuilder, WrapList, Wrapper,
};
