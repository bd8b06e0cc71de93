//! Retained-mode document tree.
//!
//! Renderers never mutate the page piecemeal. They build an immutable
//! description of a subtree ([`Node`]) and hand it to
//! [`Document::replace_children`], which frees the old children of a mount
//! point and materializes the new ones. Widgets hold [`NodeId`]s of static
//! elements and flip attributes on them.
//!
//! ## Selectors
//!
//! Lookups take compound simple selectors only, which is all the page
//! markup needs:
//!
//! ```text
//! .navToggle            class
//! #galleryCarousel      id
//! [data-pricing]        attribute presence
//! [data-flag='se']      attribute value (single or double quotes)
//! button[type='submit'] tag plus any of the above
//! ```
//!
//! There are no combinators; use [`Document::query_within`] to scope a
//! lookup to a subtree.
//!
//! ## Rendering
//!
//! [`Node`] implements [`maud::Render`], so descriptions can be spliced into
//! Maud templates or turned into a string with `node.render().into_string()`.

use maud::{Escaper, Render};
use std::fmt::Write;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

// ============================================================================
// Immutable descriptions
// ============================================================================

/// Description of an element: tag, ordered attributes, children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A node in a subtree description.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Start building an element description.
pub fn el(tag: &str) -> Element {
    Element::new(tag)
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append one or more space-separated classes.
    pub fn class(mut self, class: &str) -> Self {
        if class.is_empty() {
            return self;
        }
        match self.attrs.iter_mut().find(|(name, _)| name == "class") {
            Some((_, existing)) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(class);
            }
            Some((_, existing)) => existing.push_str(class),
            None => self.attrs.push(("class".to_string(), class.to_string())),
        }
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        set_pair(&mut self.attrs, name, value);
        self
    }

    /// Set a valueless boolean attribute such as `hidden` or `data-phone`.
    pub fn flag(self, name: &str) -> Self {
        self.attr(name, "")
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.child(Node::Text(text.to_string()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn text(text: &str) -> Self {
        Node::Text(text.to_string())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }
}

impl Render for Node {
    fn render_to(&self, buffer: &mut String) {
        match self {
            Node::Text(text) => {
                let _ = Escaper::new(buffer).write_str(text);
            }
            Node::Element(element) => {
                buffer.push('<');
                buffer.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    buffer.push(' ');
                    buffer.push_str(name);
                    if !value.is_empty() {
                        buffer.push_str("=\"");
                        let _ = Escaper::new(buffer).write_str(value);
                        buffer.push('"');
                    }
                }
                buffer.push('>');
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    return;
                }
                for child in &element.children {
                    child.render_to(buffer);
                }
                buffer.push_str("</");
                buffer.push_str(&element.tag);
                buffer.push('>');
            }
        }
    }
}

fn set_pair(attrs: &mut Vec<(String, String)>, name: &str, value: &str) {
    match attrs.iter_mut().find(|(n, _)| n == name) {
        Some((_, existing)) => *existing = value.to_string(),
        None => attrs.push((name.to_string(), value.to_string())),
    }
}

// ============================================================================
// Selectors
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

impl AttrMatch {
    fn parse(inner: &str) -> Self {
        match inner.split_once('=') {
            Some((name, value)) => Self {
                name: name.trim().to_string(),
                value: Some(value.trim().trim_matches(['\'', '"']).to_string()),
            },
            None => Self {
                name: inner.trim().to_string(),
                value: None,
            },
        }
    }
}

/// A compound simple selector: `tag#id.class[attr='value']`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Selector {
    pub fn parse(input: &str) -> Self {
        let mut selector = Selector::default();
        let mut tag = String::new();
        let mut chars = input.trim().chars().peekable();

        while let Some(&c) = chars.peek() {
            match c {
                '#' => {
                    chars.next();
                    selector.id = Some(take_ident(&mut chars));
                }
                '.' => {
                    chars.next();
                    selector.classes.push(take_ident(&mut chars));
                }
                '[' => {
                    chars.next();
                    let inner: String = chars.by_ref().take_while(|&c| c != ']').collect();
                    selector.attrs.push(AttrMatch::parse(&inner));
                }
                _ => {
                    tag.push(c);
                    chars.next();
                }
            }
        }

        if !tag.is_empty() {
            selector.tag = Some(tag.to_ascii_lowercase());
        }
        selector
    }

    fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        let lookup = |name: &str| {
            attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };

        if let Some(expected) = &self.tag
            && !tag.eq_ignore_ascii_case(expected)
        {
            return false;
        }
        if let Some(id) = &self.id
            && lookup("id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.is_empty() {
            let classes = lookup("class").unwrap_or_default();
            if !self
                .classes
                .iter()
                .all(|wanted| classes.split_whitespace().any(|c| c == wanted))
            {
                return false;
            }
        }
        self.attrs.iter().all(|m| match (lookup(&m.name), &m.value) {
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
            (None, _) => false,
        })
    }
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

// ============================================================================
// Document arena
// ============================================================================

/// Handle to a node in a [`Document`]. Slots are reused after a node is
/// freed, so a handle also records the slot generation it was issued for.
/// Handles to freed nodes resolve to nothing, even once the slot holds a
/// new node; every accessor treats them as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
enum Content {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    content: Content,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    slot: Option<Slot>,
}

/// A mutable page tree rooted at an `<html>` element.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Entry>,
    free: Vec<usize>,
    root: NodeId,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with a bare `<html>` root.
    pub fn new() -> Self {
        Self::from_root(el("html"))
    }

    /// Materialize a full page description. The given element becomes the root.
    pub fn from_root(root: Element) -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            focused: None,
        };
        doc.root = doc.materialize(Node::Element(root), None);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots
            .get(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.slot.as_ref())
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.slot.as_mut())
    }

    fn alloc(&mut self, slot: Slot) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let entry = &mut self.slots[index];
                entry.generation += 1;
                entry.slot = Some(slot);
                NodeId {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                self.slots.push(Entry {
                    generation: 0,
                    slot: Some(slot),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn materialize(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        match node {
            Node::Text(text) => self.alloc(Slot {
                content: Content::Text(text),
                parent,
                children: Vec::new(),
            }),
            Node::Element(element) => {
                let id = self.alloc(Slot {
                    content: Content::Element {
                        tag: element.tag,
                        attrs: element.attrs,
                    },
                    parent,
                    children: Vec::new(),
                });
                let children: Vec<NodeId> = element
                    .children
                    .into_iter()
                    .map(|child| self.materialize(child, Some(id)))
                    .collect();
                if let Some(slot) = self.slot_mut(id) {
                    slot.children = children;
                }
                id
            }
        }
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|entry| entry.slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------

    /// Append a description as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, node: impl Into<Node>) -> Option<NodeId> {
        self.slot(parent)?;
        let id = self.materialize(node.into(), Some(parent));
        self.slot_mut(parent)?.children.push(id);
        Some(id)
    }

    /// Free every child of `parent`, then materialize `nodes` in their place.
    pub fn replace_children(&mut self, parent: NodeId, nodes: Vec<Node>) -> Vec<NodeId> {
        if self.slot(parent).is_none() {
            return Vec::new();
        }
        self.clear_children(parent);
        let ids: Vec<NodeId> = nodes
            .into_iter()
            .map(|node| self.materialize(node, Some(parent)))
            .collect();
        if let Some(slot) = self.slot_mut(parent) {
            slot.children = ids.clone();
        }
        ids
    }

    pub fn clear_children(&mut self, parent: NodeId) {
        let children = match self.slot_mut(parent) {
            Some(slot) => std::mem::take(&mut slot.children),
            None => return,
        };
        for child in children {
            self.free_subtree(child);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let freed = self
                .slots
                .get_mut(current.index)
                .filter(|entry| entry.generation == current.generation)
                .and_then(|entry| entry.slot.take());
            if let Some(slot) = freed {
                stack.extend(slot.children);
                self.free.push(current.index);
                if self.focused == Some(current) {
                    self.focused = None;
                }
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// Element children only, skipping text nodes.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.tag(c).is_some())
            .collect()
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// True when `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // ------------------------------------------------------------------------
    // Element data
    // ------------------------------------------------------------------------

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.slot(id)?.content {
            Content::Element { tag, .. } => Some(tag),
            Content::Text(_) => None,
        }
    }

    fn attrs(&self, id: NodeId) -> Option<&[(String, String)]> {
        match &self.slot(id)?.content {
            Content::Element { attrs, .. } => Some(attrs),
            Content::Text(_) => None,
        }
    }

    fn attrs_mut(&mut self, id: NodeId) -> Option<&mut Vec<(String, String)>> {
        match &mut self.slot_mut(id)?.content {
            Content::Element { attrs, .. } => Some(attrs),
            Content::Text(_) => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(attrs) = self.attrs_mut(id) {
            set_pair(attrs, name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(attrs) = self.attrs_mut(id) {
            attrs.retain(|(n, _)| n != name);
        }
    }

    /// Add or remove a valueless boolean attribute (`hidden`, `disabled`).
    pub fn set_flag(&mut self, id: NodeId, name: &str, on: bool) {
        if on {
            if !self.has_attr(id, name) {
                self.set_attr(id, name, "");
            }
        } else {
            self.remove_attr(id, name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) {
        let current = self.attr(id, "class").unwrap_or_default();
        let mut classes: Vec<&str> = current
            .split_whitespace()
            .filter(|&c| c != class)
            .collect();
        if on {
            classes.push(class);
        }
        let joined = classes.join(" ");
        self.set_attr(id, "class", &joined);
    }

    /// Concatenated text of the node and everything below it.
    pub fn text(&self, id: NodeId) -> String {
        let own = match self.slot(id).map(|s| &s.content) {
            Some(Content::Text(text)) => return text.clone(),
            Some(Content::Element { .. }) => String::new(),
            None => return String::new(),
        };
        self.descendants(id)
            .into_iter()
            .fold(own, |mut acc, child| {
                if let Some(Slot {
                    content: Content::Text(text),
                    ..
                }) = self.slot(child)
                {
                    acc.push_str(text);
                }
                acc
            })
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if self.tag(id).is_none() {
            return;
        }
        self.clear_children(id);
        if !text.is_empty() {
            self.append(id, Node::text(text));
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        match (self.tag(id), self.attrs(id)) {
            (Some(tag), Some(attrs)) => selector.matches(tag, attrs),
            _ => false,
        }
    }

    /// First match in the whole document, root included.
    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&id| self.matches(id, &selector))
            .collect()
    }

    /// First match strictly below `scope`.
    pub fn query_within(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.query_all_within(scope, selector).into_iter().next()
    }

    pub fn query_all_within(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        self.descendants(scope)
            .into_iter()
            .filter(|&id| self.matches(id, &selector))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------------

    pub fn focus(&mut self, id: NodeId) {
        if self.slot(id).is_some() {
            self.focused = Some(id);
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    /// Copy a live subtree back into a description.
    pub fn snapshot(&self, id: NodeId) -> Option<Node> {
        let slot = self.slot(id)?;
        Some(match &slot.content {
            Content::Text(text) => Node::Text(text.clone()),
            Content::Element { tag, attrs } => Node::Element(Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                children: slot
                    .children
                    .iter()
                    .filter_map(|&c| self.snapshot(c))
                    .collect(),
            }),
        })
    }

    /// HTML of everything below `id`, without the element itself.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut buffer = String::new();
        for &child in self.children(id) {
            if let Some(node) = self.snapshot(child) {
                node.render_to(&mut buffer);
            }
        }
        buffer
    }
}
