//! # Navigation Announcer
//!
//! Announces page changes to assistive technology through a single live
//! region.
//!
//! ## Key Invariants
//!
//! 1. **One Per Transition**: a committed navigation to a different page emits
//!    exactly one announcement. Re-committing the active page emits none.
//! 2. **Single Sink**: one live region per process. A newer message replaces
//!    the previous one instead of queueing behind it.
//! 3. **Always Attached**: the region is visually hidden by size and clipping,
//!    never removed from the render tree.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::AnnouncerError;
use crate::tree::PageNode;

/// Inline style keeping the live region imperceptible but announceable.
pub const VISUALLY_HIDDEN_STYLE: &str = "position: absolute; top: 0px; width: 1px; height: 1px; padding: 0px; overflow: hidden; clip: rect(0px, 0px, 0px, 0px); white-space: nowrap; border: 0px;";

lazy_static! {
    static ref LIVE_REGION: Mutex<Option<Arc<LiveRegion>>> = Mutex::new(None);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Politeness {
    #[default]
    Assertive,
    Polite,
}

impl Politeness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Politeness::Assertive => "assertive",
            Politeness::Polite => "polite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnnouncerConfig {
    pub region_id: String,
    pub politeness: Politeness,
    pub atomic: bool,
    /// Attribute marking the element whose text should be announced.
    #[serde(alias = "announcementSelector")]
    pub announcement_attribute: String,
    /// Prefix of the last-resort message, followed by the page path.
    pub fallback_prefix: String,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            region_id: "route-announcer".to_string(),
            politeness: Politeness::Assertive,
            atomic: true,
            announcement_attribute: "data-route-announcement".to_string(),
            fallback_prefix: "new page at".to_string(),
        }
    }
}

impl AnnouncerConfig {
    /// Live region element attributes in render order.
    pub fn region_attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("aria-atomic", self.atomic.to_string()),
            ("aria-live", self.politeness.as_str().to_string()),
            ("id", self.region_id.clone()),
            ("role", "alert".to_string()),
            ("style", VISUALLY_HIDDEN_STYLE.to_string()),
        ]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SINK
// ═══════════════════════════════════════════════════════════════════════════════

/// Receives plain-text announcements.
pub trait AnnouncementSink: Send + Sync {
    /// Delivers `text`. Returns `false` when the sink cannot take it yet; the
    /// announcer then holds the message until [`Announcer::retry`].
    fn announce(&self, text: &str) -> bool;
}

/// The live region: holds the latest message only.
#[derive(Debug)]
pub struct LiveRegion {
    config: AnnouncerConfig,
    message: Mutex<Option<String>>,
    emitted: AtomicUsize,
}

impl LiveRegion {
    pub fn new(config: AnnouncerConfig) -> Self {
        Self {
            config,
            message: Mutex::new(None),
            emitted: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &AnnouncerConfig {
        &self.config
    }

    /// Message currently held by the region.
    pub fn current(&self) -> Option<String> {
        self.message
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Total announcements received since creation.
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::SeqCst)
    }

    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        self.config.region_attributes()
    }
}

impl AnnouncementSink for LiveRegion {
    fn announce(&self, text: &str) -> bool {
        let mut message = self
            .message
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *message = Some(text.to_string());
        self.emitted.fetch_add(1, Ordering::SeqCst);
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROCESS-WIDE REGION
// ═══════════════════════════════════════════════════════════════════════════════

/// Creates the process-wide live region. Call once at application start.
pub fn install(config: AnnouncerConfig) -> Result<Arc<LiveRegion>, AnnouncerError> {
    let mut slot = LIVE_REGION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(existing) = slot.as_ref() {
        return Err(AnnouncerError::AlreadyInstalled(
            existing.config.region_id.clone(),
        ));
    }
    let region = Arc::new(LiveRegion::new(config));
    *slot = Some(Arc::clone(&region));
    tracing::info!(region = %region.config.region_id, "live region installed");
    Ok(region)
}

/// The installed live region, if any.
pub fn global() -> Option<Arc<LiveRegion>> {
    LIVE_REGION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Tears down the process-wide live region, returning it.
pub fn shutdown() -> Result<Arc<LiveRegion>, AnnouncerError> {
    let region = LIVE_REGION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take()
        .ok_or(AnnouncerError::NotInstalled)?;
    tracing::info!(region = %region.config.region_id, "live region shut down");
    Ok(region)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOUNCER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub page: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnnouncerState {
    #[default]
    Idle,
    /// Holding a message the sink has not accepted yet.
    Announcing { page: String, text: String },
}

/// A committed navigation, as observed by the announcer.
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    pub from: Option<&'a str>,
    pub to: &'a PageNode,
    /// Markup of the committed page content (without wrappers).
    pub page_markup: &'a str,
}

pub struct Announcer {
    sink: Arc<dyn AnnouncementSink>,
    config: AnnouncerConfig,
    state: AnnouncerState,
}

impl Announcer {
    pub fn new(sink: Arc<dyn AnnouncementSink>, config: AnnouncerConfig) -> Self {
        Self {
            sink,
            config,
            state: AnnouncerState::Idle,
        }
    }

    /// Announcer bound to a live region, using the region's own config.
    pub fn for_region(region: Arc<LiveRegion>) -> Self {
        let config = region.config().clone();
        Self::new(region, config)
    }

    pub fn state(&self) -> &AnnouncerState {
        &self.state
    }

    pub fn config(&self) -> &AnnouncerConfig {
        &self.config
    }

    /// Observes a commit. Emits one announcement when the active page changed.
    /// A held, undelivered announcement is replaced by the newer one.
    pub fn observe(&mut self, transition: Transition<'_>) -> Option<Announcement> {
        let to = transition.to.name();
        if transition.from == Some(to) {
            tracing::trace!(page = to, "same page committed, nothing to announce");
            return None;
        }

        let text = announcement_text(&self.config, transition.to, transition.page_markup);
        if let AnnouncerState::Announcing { page, .. } = &self.state {
            tracing::warn!(held = %page, by = to, "undelivered announcement replaced");
        }
        self.state = AnnouncerState::Announcing {
            page: to.to_string(),
            text: text.clone(),
        };
        self.deliver();
        tracing::debug!(from = ?transition.from, to, text = %text, "navigation announced");

        Some(Announcement {
            page: to.to_string(),
            text,
        })
    }

    /// Offers a held announcement to the sink again. Returns `true` once idle.
    pub fn retry(&mut self) -> bool {
        self.deliver();
        self.state == AnnouncerState::Idle
    }

    fn deliver(&mut self) {
        let AnnouncerState::Announcing { page, text } = &self.state else {
            return;
        };
        if self.sink.announce(text) {
            self.state = AnnouncerState::Idle;
        } else {
            tracing::debug!(page = %page, "sink not ready, holding announcement");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOUNCEMENT TEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Picks the human-readable summary of a committed page: the element marked
/// with the announcement attribute, then the first `<h1>`, then the page
/// title, then `"{fallback_prefix} {path}"`.
///
/// Markup goes through the HTML parser, so entities arrive decoded and nested
/// elements are matched by structure rather than by text.
pub fn announcement_text(config: &AnnouncerConfig, page: &PageNode, markup: &str) -> String {
    let dom = parse_document(RcDom::default(), Default::default()).one(markup);
    let attribute = config.announcement_attribute.as_str();

    let marked = if attribute.is_empty() {
        None
    } else {
        find_element(&dom.document, &|el| carries_attribute(el, attribute))
    };
    let heading = find_element(&dom.document, &|el| is_element(el, "h1"));

    marked
        .into_iter()
        .chain(heading)
        .map(|el| text_content(&el))
        .find(|text| !text.is_empty())
        .or_else(|| {
            page.page_title()
                .map(collapse_whitespace)
                .filter(|text| !text.is_empty())
        })
        .unwrap_or_else(|| format!("{} {}", config.fallback_prefix, page.path()))
}

/// First element in document order accepted by `accept`.
fn find_element(handle: &Handle, accept: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    if matches!(handle.data, NodeData::Element { .. }) && accept(handle) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, accept))
}

fn is_element(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if &*name.local == tag)
}

// html5ever lowercases attribute names
fn carries_attribute(handle: &Handle, attribute: &str) -> bool {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .any(|attr| attr.name.local.as_ref().eq_ignore_ascii_case(attribute)),
        _ => false,
    }
}

fn text_content(handle: &Handle) -> String {
    let mut raw = String::new();
    collect_text(handle, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } if matches!(&*name.local, "script" | "style") => {}
        _ => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
