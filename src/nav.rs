//! Hamburger navigation menu.
//!
//! The open state lives on the page itself (`data-open` on `.navLinks`,
//! mirrored to `aria-expanded` on `.navToggle`), so there is nothing to keep
//! in sync besides the two element handles.

use crate::dom::{Document, NodeId};

/// Keys the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

#[derive(Debug, Clone, Copy)]
pub struct Nav {
    toggle: NodeId,
    links: NodeId,
}

impl Nav {
    /// Bind to `.navToggle` and `.navLinks`. `None` if either is missing.
    pub fn attach(doc: &Document) -> Option<Self> {
        Some(Self {
            toggle: doc.query(".navToggle")?,
            links: doc.query(".navLinks")?,
        })
    }

    pub fn toggle_button(&self) -> NodeId {
        self.toggle
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.attr(self.links, "data-open") == Some("true")
    }

    pub fn set_open(&self, doc: &mut Document, open: bool) {
        let value = if open { "true" } else { "false" };
        doc.set_attr(self.links, "data-open", value);
        doc.set_attr(self.toggle, "aria-expanded", value);
    }

    pub fn toggle(&self, doc: &mut Document) {
        let open = self.is_open(doc);
        self.set_open(doc, !open);
    }

    /// True when `target` is a link inside the menu.
    pub fn is_menu_link(&self, doc: &Document, target: NodeId) -> bool {
        doc.query_all_within(self.links, "a")
            .into_iter()
            .any(|a| doc.contains(a, target))
    }

    /// Following a menu link always closes the menu.
    pub fn link_clicked(&self, doc: &mut Document) {
        self.set_open(doc, false);
    }

    /// Escape closes an open menu and returns focus to the toggle.
    pub fn key_down(&self, doc: &mut Document, key: Key) {
        if key != Key::Escape || !self.is_open(doc) {
            return;
        }
        self.set_open(doc, false);
        doc.focus(self.toggle);
    }

    /// A pointer press outside both the toggle and the menu closes it.
    pub fn pointer_down(&self, doc: &mut Document, target: NodeId) {
        if !self.is_open(doc) {
            return;
        }
        if doc.contains(self.toggle, target) || doc.contains(self.links, target) {
            return;
        }
        self.set_open(doc, false);
    }
}
