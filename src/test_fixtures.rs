//! Components and trees shared by the test modules.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::announcer::AnnouncementSink;
use crate::props::Props;
use crate::tree::{content, wrapper, GroupNode, PageContent, PageNode, RouteTree, Wrapper};

pub fn heading(name: &'static str) -> Arc<dyn PageContent> {
    content(name, move |_| format!("<h1>{}</h1>", name))
}

pub fn global_layout() -> Arc<dyn Wrapper> {
    wrapper("GlobalLayout", |_, children| {
        format!(
            "<div><h1>Global Layout</h1>{}<footer>This is a footer</footer></div>",
            children
        )
    })
}

pub fn custom_wrapper() -> Arc<dyn Wrapper> {
    wrapper("CustomWrapper", |_, children| {
        format!(
            "<div><h1>Custom Wrapper</h1>{}<p>Custom Wrapper End</p></div>",
            children
        )
    })
}

pub fn b_layout() -> Arc<dyn Wrapper> {
    wrapper("BLayout", |_, children| {
        format!("<div><h1>Layout for B</h1>{}</div>", children)
    })
}

pub fn prop_wrapper() -> Arc<dyn Wrapper> {
    wrapper("PropWrapper", |props, children| {
        format!(
            "<div><h1>Prop Wrapper</h1><p>1:{}</p><p>2:{}</p>{}</div>",
            props.get_str("propOne").unwrap_or_default(),
            props.get_str("propTwo").unwrap_or_default(),
            children
        )
    })
}

pub fn prop_wrapper_two() -> Arc<dyn Wrapper> {
    wrapper("PropWrapperTwo", |_, children| {
        format!(
            "<div><h1>Prop Wrapper Two</h1>{}<footer>This is a footer</footer></div>",
            children
        )
    })
}

/// Wrapper that renders only a marker, for order checks.
pub fn marker(name: &'static str) -> Arc<dyn Wrapper> {
    wrapper(name, move |_: &Props, children: &str| {
        format!("[{}]{}[/{}]", name, children, name)
    })
}

/// ```text
/// Group(wrap=[CustomWrapper, GlobalLayout])
///   Page childA  /a
///   Group(wrap=BLayout)
///     Page childB  /
/// Page childC  /c
/// ```
pub fn set_tree() -> RouteTree {
    RouteTree::builder()
        .node(
            GroupNode::new([custom_wrapper(), global_layout()])
                .child(PageNode::new("/a", "childA", heading("ChildA")))
                .child(
                    GroupNode::new(b_layout())
                        .child(PageNode::new("/", "childB", heading("ChildB"))),
                ),
        )
        .node(PageNode::new("/c", "childC", heading("ChildC")))
        .build()
        .unwrap()
}

/// `Group(wrap=[PropWrapper, PropWrapperTwo], propOne="une", propTwo="deux")`
/// around `childA`.
pub fn prop_tree() -> RouteTree {
    RouteTree::builder()
        .node(
            GroupNode::new([prop_wrapper(), prop_wrapper_two()])
                .prop("propOne", "une")
                .prop("propTwo", "deux")
                .child(PageNode::new("/", "childA", heading("ChildA"))),
        )
        .build()
        .unwrap()
}

/// Sink that keeps every announcement it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl AnnouncementSink for RecordingSink {
    fn announce(&self, text: &str) -> bool {
        self.messages.lock().unwrap().push(text.to_string());
        true
    }
}

/// Sink that refuses every announcement until opened.
#[derive(Debug, Default)]
pub struct GatedSink {
    open: AtomicBool,
    delivered: RecordingSink,
}

impl GatedSink {
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.delivered.messages()
    }
}

impl AnnouncementSink for GatedSink {
    fn announce(&self, text: &str) -> bool {
        self.open.load(Ordering::SeqCst) && self.delivered.announce(text)
    }
}
