//! Rendering substrate interface and a string-markup implementation.
//!
//! The substrate receives a fully resolved composition, paints it, and hands
//! back the committed page markup so the announcer can summarize it.

use futures::future::BoxFuture;

use crate::announcer::AnnouncerConfig;
use crate::resolve::ResolvedComposition;

/// Output of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Page content markup only, without wrappers or the live region.
    pub page_markup: String,
    /// The full document: wrappers around page content and live region.
    pub document: String,
}

pub trait RenderSubstrate {
    fn commit(&mut self, composition: &ResolvedComposition) -> Rendered;
}

/// Substrate whose commit completes asynchronously.
pub trait AsyncRenderSubstrate {
    fn commit<'a>(&'a mut self, composition: &'a ResolvedComposition) -> BoxFuture<'a, Rendered>;
}

/// Renders compositions into HTML strings. The live region element is placed
/// right after the page content, inside the innermost wrapper.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    region: AnnouncerConfig,
    commits: usize,
}

impl HtmlRenderer {
    pub fn new(region: AnnouncerConfig) -> Self {
        Self { region, commits: 0 }
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn live_region_markup(&self) -> String {
        let attrs = self
            .region
            .region_attributes()
            .into_iter()
            .map(|(name, value)| format!("{}=\"{}\"", name, escape_attr(&value)))
            .collect::<Vec<_>>()
            .join(" ");
        format!("<div {}></div>", attrs)
    }

    pub fn render(&self, composition: &ResolvedComposition) -> Rendered {
        let page_markup = composition.render_page();
        let inner = format!("{}{}", page_markup, self.live_region_markup());
        let document = composition.wrap(inner);
        Rendered {
            page_markup,
            document,
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(AnnouncerConfig::default())
    }
}

impl RenderSubstrate for HtmlRenderer {
    fn commit(&mut self, composition: &ResolvedComposition) -> Rendered {
        self.commits += 1;
        tracing::trace!(page = composition.page_name(), commit = self.commits, "html commit");
        self.render(composition)
    }
}

impl AsyncRenderSubstrate for HtmlRenderer {
    fn commit<'a>(&'a mut self, composition: &'a ResolvedComposition) -> BoxFuture<'a, Rendered> {
        Box::pin(async move { RenderSubstrate::commit(self, composition) })
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
