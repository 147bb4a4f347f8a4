//! # Wrapper Chain Builder
//!
//! Turns the ancestor groups of a page (root first) into the ordered list of
//! wrapper invocations, outermost first.
//!
//! ## Key Invariants
//!
//! 1. **Declared Order**: a group wrapping `[W1, W2]` yields `W1(W2(child))`.
//! 2. **Concatenation**: a nested group's wrappers sit inside all of its
//!    ancestors' wrappers, whatever the depth.
//! 3. **Prop Isolation**: a wrapper sees its own group's merged bag only.
//!    Every wrapper of one group sees the same bag.
//! 4. **Purity**: no hidden state; equal inputs give equal chains.

use std::fmt;
use std::sync::Arc;

use crate::props::Props;
use crate::tree::{GroupNode, Wrapper};

/// One wrapper invocation in a resolved chain.
#[derive(Clone)]
pub struct ChainLink {
    wrapper: Arc<dyn Wrapper>,
    props: Props,
    /// Nesting depth of the contributing group (0 = outermost group).
    depth: usize,
}

impl ChainLink {
    pub fn wrapper(&self) -> &Arc<dyn Wrapper> {
        &self.wrapper
    }

    pub fn name(&self) -> &str {
        self.wrapper.name()
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Debug for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainLink")
            .field("wrapper", &self.wrapper.name())
            .field("props", &self.props)
            .field("depth", &self.depth)
            .finish()
    }
}

/// The bag handed to each wrapper of `group`: shared props overlaid with the
/// ad-hoc props passed alongside the wrapper list.
pub fn group_props(group: &GroupNode) -> Props {
    group.shared().overlay(group.adhoc())
}

/// Builds the wrapper chain for a root-to-leaf list of ancestor groups.
///
/// Groups with an empty wrapper list contribute nothing.
pub fn build_chain(ancestors: &[&GroupNode]) -> Vec<ChainLink> {
    let mut chain = Vec::new();

    for (depth, group) in ancestors.iter().enumerate() {
        if group.wrappers().is_empty() {
            continue;
        }
        let props = group_props(group);
        for wrapper in group.wrappers() {
            tracing::trace!(wrapper = wrapper.name(), depth, "chain link");
            chain.push(ChainLink {
                wrapper: Arc::clone(wrapper),
                props: props.clone(),
                depth,
            });
        }
    }

    chain
}
