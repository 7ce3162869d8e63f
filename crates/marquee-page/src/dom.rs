//! In-memory document tree the page runtime operates on.
//!
//! Models only what the runtime touches: tags, ids, classes, attributes,
//! inline styles, text, layout offsets, focus and selection.
//!
//! Elements live in generational slots. [`Document::remove`] frees a subtree
//! and later elements reuse its slots; handles to removed elements go stale
//! and read as empty.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};

/// Handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    offset_top: f64,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A document rooted at `<body>`.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    body: NodeId,
    active: Option<NodeId>,
    selection: Option<NodeId>,
}

impl Document {
    /// Create an empty document containing only `<body>`.
    pub fn new() -> Self {
        let body = Node {
            tag: "body".to_string(),
            ..Default::default()
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(body),
            }],
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            active: None,
            selection: None,
        }
    }

    /// Parse an HTML page. Elements under `<body>` are imported with their
    /// attributes, classes and inline styles; comments are dropped.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Self::new();
        let source_body = parsed
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body");
        if let Some(source_body) = source_body {
            let body = doc.body;
            doc.import_attributes(body, source_body);
            doc.import_children(body, source_body);
        }
        tracing::debug!(nodes = doc.node_count(), "Parsed document");
        doc
    }

    fn import_children(&mut self, parent: NodeId, source: ElementRef<'_>) {
        for child in source.children() {
            match child.value() {
                scraper::Node::Text(text) => {
                    if let Some(node) = self.node_mut(parent) {
                        node.text.push_str(text);
                    }
                }
                scraper::Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        let id = self.create_element(element.value().name());
                        self.import_attributes(id, element);
                        self.append_child(parent, id);
                        self.import_children(id, element);
                    }
                }
                _ => {}
            }
        }
    }

    fn import_attributes(&mut self, node: NodeId, source: ElementRef<'_>) {
        for (name, value) in source.value().attrs() {
            match name {
                "class" => {
                    for class in value.split_whitespace() {
                        self.add_class(node, class);
                    }
                }
                "style" => self.set_css_text(node, value),
                _ => self.set_attr(node, name, value),
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of live elements, attached or not.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether `node` refers to a live element.
    pub fn exists(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node = Node {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Start building an element; finish with [`ElementBuilder::append_to`].
    pub fn build(&mut self, tag: &str) -> ElementBuilder<'_> {
        let id = self.create_element(tag);
        ElementBuilder { doc: self, id }
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` before `reference` (or at the end when `None` or not a child of `parent`).
    ///
    /// Does nothing when either handle is stale or `child` contains `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if !self.exists(child) || !self.exists(parent) || self.contains(child, parent) {
            return;
        }
        self.detach(child);
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        let index = reference
            .and_then(|r| node.children.iter().position(|c| *c == r))
            .unwrap_or(node.children.len());
        node.children.insert(index, child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Remove an element from its parent. Returns `false` if it was already detached.
    pub fn detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.node_mut(node).and_then(|n| n.parent.take()) else {
            return false;
        };
        if let Some(parent) = self.node_mut(parent) {
            parent.children.retain(|c| *c != node);
        }
        self.clear_focus_within(node);
        true
    }

    /// Detach an element and free it with all its descendants.
    ///
    /// Returns `false` for `<body>` and for stale handles.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if node == self.body || !self.exists(node) {
            return false;
        }
        self.detach(node);
        self.clear_focus_within(node);
        let mut doomed = self.descendants(node);
        doomed.push(node);
        for id in doomed {
            let slot = &mut self.slots[id.index];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
        true
    }

    fn clear_focus_within(&mut self, node: NodeId) {
        if self.active.is_some_and(|a| self.contains(node, a)) {
            self.active = None;
        }
        if self.selection.is_some_and(|s| self.contains(node, s)) {
            self.selection = None;
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    /// Whether the element is reachable from `<body>`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.exists(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Nearest inclusive ancestor matching the predicate.
    pub fn closest(&self, node: NodeId, predicate: impl Fn(Element<'_>) -> bool) -> Option<NodeId> {
        let mut current = self.exists(node).then_some(node);
        while let Some(n) = current {
            if predicate(self.element(n)) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// Descendants of `root` in document order, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Attached elements matching the predicate, in document order.
    pub fn query(&self, predicate: impl Fn(Element<'_>) -> bool) -> Vec<NodeId> {
        std::iter::once(self.body)
            .chain(self.descendants(self.body))
            .filter(|n| predicate(self.element(*n)))
            .collect()
    }

    /// First attached element matching the predicate.
    pub fn query_first(&self, predicate: impl Fn(Element<'_>) -> bool) -> Option<NodeId> {
        self.query(predicate).into_iter().next()
    }

    /// Descendants of `root` matching the predicate, in document order.
    pub fn query_within(
        &self,
        root: NodeId,
        predicate: impl Fn(Element<'_>) -> bool,
    ) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|n| predicate(self.element(*n)))
            .collect()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_first(|el| el.attr("id") == Some(id))
    }

    /// Read-only view of an element.
    pub fn element(&self, node: NodeId) -> Element<'_> {
        Element { doc: self, node }
    }

    pub fn tag(&self, node: NodeId) -> &str {
        self.node(node).map_or("", |n| n.tag.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.node_mut(node)?.attributes.remove(name)
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.node(node)
            .map(|n| n.classes.as_slice())
            .unwrap_or_default()
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    /// Toggle a class; returns whether it is present afterwards.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            self.has_class(node, class)
        }
    }

    /// Add or remove a class depending on `present`.
    pub fn set_class(&mut self, node: NodeId, class: &str, present: bool) {
        if present {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    /// Text of the element and all its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let Some(own) = self.node(node) else {
            return String::new();
        };
        let mut text = own.text.clone();
        for child in self.descendants(node) {
            if let Some(child) = self.node(child) {
                text.push_str(&child.text);
            }
        }
        text
    }

    /// Replace the element's content with text, removing its children.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        for child in self.children(node).to_vec() {
            self.remove(child);
        }
        if let Some(n) = self.node_mut(node) {
            n.text = text.into();
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node)?.styles.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.styles.insert(property.to_string(), value.into());
        }
    }

    /// Apply a `prop: value; ...` declaration block.
    pub fn set_css_text(&mut self, node: NodeId, css: &str) {
        for declaration in css.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                let property = property.trim();
                if !property.is_empty() {
                    self.set_style(node, property, value.trim());
                }
            }
        }
    }

    pub fn offset_top(&self, node: NodeId) -> f64 {
        self.node(node).map_or(0.0, |n| n.offset_top)
    }

    pub fn set_offset_top(&mut self, node: NodeId, offset: f64) {
        if let Some(n) = self.node_mut(node) {
            n.offset_top = offset;
        }
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.exists(node) {
            self.active = Some(node);
        }
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// Select the contents of an input surface.
    pub fn select(&mut self, node: NodeId) {
        if self.exists(node) {
            self.selection = Some(node);
        }
    }

    /// Text of the current selection, read from the selected element's value.
    pub fn selected_text(&self) -> Option<&str> {
        self.selection.and_then(|node| self.attr(node, "value"))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only element view used by query predicates.
#[derive(Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl<'a> Element<'a> {
    pub fn id(&self) -> NodeId {
        self.node
    }

    pub fn tag(&self) -> &'a str {
        self.doc.tag(self.node)
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.doc.attr(self.node, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.doc.has_class(self.node, class)
    }

    /// Whether the attribute exists and starts with `prefix`.
    pub fn attr_starts_with(&self, name: &str, prefix: &str) -> bool {
        self.attr(name).is_some_and(|v| v.starts_with(prefix))
    }
}

/// Fluent element construction.
pub struct ElementBuilder<'a> {
    doc: &'a mut Document,
    id: NodeId,
}

impl ElementBuilder<'_> {
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Add whitespace-separated classes.
    pub fn class(self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.doc.add_class(self.id, class);
        }
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.doc.set_attr(self.id, name, value);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.doc.set_text(self.id, text);
        self
    }

    pub fn offset_top(self, offset: f64) -> Self {
        self.doc.set_offset_top(self.id, offset);
        self
    }

    /// Attach the element and return its handle.
    pub fn append_to(self, parent: NodeId) -> NodeId {
        self.doc.append_child(parent, self.id);
        self.id
    }

    /// Return the handle without attaching the element.
    pub fn detached(self) -> NodeId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_in_document_order() {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.build("nav").append_to(body);
        let first = doc.build("a").attr("href", "#one").append_to(nav);
        let section = doc.build("section").append_to(body);
        let second = doc.build("a").attr("href", "#two").append_to(section);

        let links = doc.query(|el| el.tag() == "a");

        assert_eq!(links, vec![first, second]);
    }

    #[test]
    fn detached_elements_are_not_queried() {
        let mut doc = Document::new();
        let loose = doc.build("div").id("loose").detached();

        assert!(doc.get_element_by_id("loose").is_none());

        doc.append_child(doc.body(), loose);
        assert_eq!(doc.get_element_by_id("loose"), Some(loose));

        assert!(doc.detach(loose));
        assert!(!doc.detach(loose));
        assert!(!doc.is_attached(loose));
    }

    #[test]
    fn contains_checks_ancestry() {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.build("button").append_to(body);
        let icon = doc.build("i").append_to(button);
        let other = doc.build("div").append_to(body);

        assert!(doc.contains(button, icon));
        assert!(doc.contains(button, button));
        assert!(!doc.contains(button, other));
        assert_eq!(doc.closest(icon, |el| el.tag() == "button"), Some(button));
    }

    #[test]
    fn insert_before_first_child() {
        let mut doc = Document::new();
        let body = doc.body();
        let existing = doc.build("section").append_to(body);
        let link = doc.build("a").detached();

        doc.insert_before(body, link, doc.first_child(body));

        assert_eq!(doc.children(body), &[link, existing]);
    }

    #[test]
    fn toggles_classes() {
        let mut doc = Document::new();
        let body = doc.body();
        let menu = doc.build("div").class("hidden md:hidden").append_to(body);

        assert!(!doc.toggle_class(menu, "hidden"));
        assert!(doc.toggle_class(menu, "hidden"));
        assert!(doc.has_class(menu, "md:hidden"));
    }

    #[test]
    fn text_content_includes_descendants() {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.build("button").append_to(body);
        doc.build("i").class("fas fa-copy").append_to(button);

        assert_eq!(doc.text_content(button).trim(), "");

        doc.build("span").text("Copy").append_to(button);
        assert_eq!(doc.text_content(button), "Copy");

        doc.set_text(button, "Done");
        assert!(doc.children(button).is_empty());
        assert_eq!(doc.text_content(button), "Done");
    }

    #[test]
    fn parses_css_text() {
        let mut doc = Document::new();
        let el = doc.build("div").detached();

        doc.set_css_text(el, "\n  position: fixed;\n  top: 20px;\n  transform: translateY(-100px);\n");

        assert_eq!(doc.style(el, "position"), Some("fixed"));
        assert_eq!(doc.style(el, "top"), Some("20px"));
        assert_eq!(doc.style(el, "transform"), Some("translateY(-100px)"));
    }

    #[test]
    fn detaching_clears_selection() {
        let mut doc = Document::new();
        let body = doc.body();
        let area = doc.build("textarea").attr("value", "copied").append_to(body);
        doc.focus(area);
        doc.select(area);

        assert_eq!(doc.selected_text(), Some("copied"));

        doc.detach(area);
        assert_eq!(doc.selected_text(), None);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn removed_slots_are_reused() {
        let mut doc = Document::new();
        let body = doc.body();
        let toast = doc.build("div").id("toast").append_to(body);
        doc.build("span").text("Copied").append_to(toast);
        assert_eq!(doc.node_count(), 3);

        assert!(doc.remove(toast));
        assert!(!doc.remove(toast));
        assert_eq!(doc.node_count(), 1);
        assert!(!doc.exists(toast));
        assert!(!doc.is_attached(toast));
        assert_eq!(doc.tag(toast), "");
        assert_eq!(doc.attr(toast, "id"), None);

        let next = doc.build("div").append_to(body);
        assert_ne!(next, toast);
        assert_eq!(doc.node_count(), 2);
        doc.set_attr(toast, "id", "stale");
        assert_eq!(doc.get_element_by_id("stale"), None);
    }

    #[test]
    fn body_cannot_be_removed() {
        let mut doc = Document::new();

        assert!(!doc.remove(doc.body()));
        assert!(doc.exists(doc.body()));
    }

    #[test]
    fn set_text_frees_children() {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.build("button").append_to(body);
        let icon = doc.build("i").append_to(button);

        doc.set_text(button, "Done");

        assert!(!doc.exists(icon));
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn parses_rendered_markup() {
        let doc = Document::parse(
            r##"<!DOCTYPE html><html><head><title>t</title></head>
<body class="page">
  <!-- hero -->
  <nav><a href="#features" class="nav-link">Features</a></nav>
  <div id="mobileMenu" class="hidden md:hidden" style="top: 0; left: 1px"></div>
  <button onclick="copyToClipboard(&#x27;it\&#x27;s&#x27;)"><i class="fas fa-copy"></i>Copy</button>
</body></html>"##,
        );
        let body = doc.body();

        assert!(doc.has_class(body, "page"));
        let link = doc.query_first(|el| el.tag() == "a").unwrap();
        assert_eq!(doc.attr(link, "href"), Some("#features"));
        assert!(doc.has_class(link, "nav-link"));
        assert_eq!(doc.text_content(link), "Features");

        let menu = doc.get_element_by_id("mobileMenu").unwrap();
        assert_eq!(doc.classes(menu), &["hidden", "md:hidden"]);
        assert_eq!(doc.style(menu, "left"), Some("1px"));
        assert_eq!(doc.attr(menu, "class"), None);

        let button = doc.query_first(|el| el.tag() == "button").unwrap();
        assert_eq!(doc.attr(button, "onclick"), Some(r"copyToClipboard('it\'s')"));
        assert_eq!(doc.text_content(button), "Copy");
        assert_eq!(doc.tag(doc.first_child(button).unwrap()), "i");
    }
}
