//! # Navigator
//!
//! Drives one navigation at a time: resolve, hand to the substrate, wait for
//! the commit, announce.
//!
//! ## Key Invariants
//!
//! 1. **Latest Wins**: a navigation issued before the previous one committed
//!    supersedes it. The superseded commit is ignored and never announced.
//! 2. **Fresh Resolution**: every navigation resolves from the immutable tree;
//!    nothing from the previous composition is reused.
//! 3. **Failed Resolution Is Inert**: a not-found page leaves the active page
//!    and any pending commit untouched.

use std::sync::Arc;

use crate::announcer::{
    self, Announcement, AnnouncementSink, Announcer, AnnouncerConfig, LiveRegion, Transition,
};
use crate::error::{AnnouncerError, ResolveError};
use crate::matcher::PathMatcher;
use crate::render::{AsyncRenderSubstrate, RenderSubstrate, Rendered};
use crate::resolve::{resolve_match, ResolvedComposition, RouteMatch};
use crate::tree::{PageNode, RouteTree};

/// Identifies the navigation a commit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitTicket(u64);

/// A resolved navigation waiting for the substrate to commit it.
#[derive(Debug)]
pub struct PendingNavigation {
    pub ticket: CommitTicket,
    pub composition: ResolvedComposition,
}

/// Result of a navigation that ran through commit.
#[derive(Debug)]
pub struct Navigation {
    pub composition: ResolvedComposition,
    pub rendered: Rendered,
    pub announcement: Option<Announcement>,
}

struct Pending {
    ticket: CommitTicket,
    page: PageNode,
}

pub struct Navigator {
    tree: Arc<RouteTree>,
    announcer: Announcer,
    active: Option<String>,
    generation: u64,
    pending: Option<Pending>,
}

impl Navigator {
    pub fn new(
        tree: Arc<RouteTree>,
        sink: Arc<dyn AnnouncementSink>,
        config: AnnouncerConfig,
    ) -> Self {
        Self {
            tree,
            announcer: Announcer::new(sink, config),
            active: None,
            generation: 0,
            pending: None,
        }
    }

    pub fn with_region(tree: Arc<RouteTree>, region: Arc<LiveRegion>) -> Self {
        let config = region.config().clone();
        Self::new(tree, region, config)
    }

    /// Navigator announcing through the process-wide live region.
    pub fn with_global_region(tree: Arc<RouteTree>) -> Result<Self, AnnouncerError> {
        let region = announcer::global().ok_or(AnnouncerError::NotInstalled)?;
        Ok(Self::with_region(tree, region))
    }

    pub fn tree(&self) -> &Arc<RouteTree> {
        &self.tree
    }

    /// Name of the last committed page.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn announcer(&self) -> &Announcer {
        &self.announcer
    }

    /// Offers an announcement the sink refused to it again.
    pub fn retry_announcement(&mut self) -> bool {
        self.announcer.retry()
    }

    /// Resolves `route` and issues a commit ticket. Supersedes any navigation
    /// still waiting for its commit.
    pub fn navigate(&mut self, route: &RouteMatch) -> Result<PendingNavigation, ResolveError> {
        let composition = resolve_match(&self.tree, route)?;

        self.generation += 1;
        let ticket = CommitTicket(self.generation);
        if let Some(previous) = self.pending.take() {
            tracing::debug!(
                superseded = previous.page.name(),
                by = composition.page_name(),
                "pending navigation superseded"
            );
        }
        self.pending = Some(Pending {
            ticket,
            page: composition.page().clone(),
        });

        tracing::debug!(
            page = composition.page_name(),
            ticket = self.generation,
            "navigation resolved"
        );
        Ok(PendingNavigation {
            ticket,
            composition,
        })
    }

    /// Reports that the substrate committed the navigation for `ticket`.
    /// Stale tickets are ignored.
    pub fn commit(&mut self, ticket: CommitTicket, page_markup: &str) -> Option<Announcement> {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => {}
            _ => {
                tracing::warn!(ticket = ticket.0, "ignoring commit for superseded navigation");
                return None;
            }
        }
        let pending = self.pending.take()?;

        let announcement = self.announcer.observe(Transition {
            from: self.active.as_deref(),
            to: &pending.page,
            page_markup,
        });
        self.active = Some(pending.page.name().to_string());
        announcement
    }

    /// Resolves, commits through `substrate` and announces.
    pub fn navigate_with<S: RenderSubstrate>(
        &mut self,
        route: &RouteMatch,
        substrate: &mut S,
    ) -> Result<Navigation, ResolveError> {
        let PendingNavigation {
            ticket,
            composition,
        } = self.navigate(route)?;
        let rendered = substrate.commit(&composition);
        let announcement = self.commit(ticket, &rendered.page_markup);
        Ok(Navigation {
            composition,
            rendered,
            announcement,
        })
    }

    /// Like [`Navigator::navigate_with`], suspending until the substrate
    /// finishes its commit.
    pub async fn navigate_async<S: AsyncRenderSubstrate>(
        &mut self,
        route: &RouteMatch,
        substrate: &mut S,
    ) -> Result<Navigation, ResolveError> {
        let PendingNavigation {
            ticket,
            composition,
        } = self.navigate(route)?;
        let rendered = substrate.commit(&composition).await;
        let announcement = self.commit(ticket, &rendered.page_markup);
        Ok(Navigation {
            composition,
            rendered,
            announcement,
        })
    }

    /// Matches `path` first; unmatched paths fail with [`ResolveError::NoMatch`].
    pub fn navigate_path<M: PathMatcher, S: RenderSubstrate>(
        &mut self,
        path: &str,
        matcher: &M,
        substrate: &mut S,
    ) -> Result<Navigation, ResolveError> {
        let route = matcher
            .match_path(path)
            .ok_or_else(|| ResolveError::NoMatch(path.to_string()))?;
        self.navigate_with(&route, substrate)
    }
}
