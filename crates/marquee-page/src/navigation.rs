//! Mobile menu, active-link highlighting and smooth in-page scrolling.

use crate::dom::{Document, Element, NodeId};

/// Id of the collapsible mobile menu.
pub const MENU_ID: &str = "mobileMenu";
/// Inline handler that marks menu toggles.
pub const TOGGLE_HANDLER: &str = "toggleMobileMenu()";

const HIDDEN_CLASS: &str = "hidden";
const ACTIVE_CLASS: &str = "active";

/// How the viewport should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// A viewport scroll the host should perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// What a click did to navigation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavClick {
    /// Default link navigation must be suppressed
    pub default_prevented: bool,
    pub scroll: Option<ScrollRequest>,
    pub menu_changed: bool,
}

/// Menu visibility and link state, mirrored to the document by [`sync`](Self::sync).
#[derive(Debug, Clone)]
pub struct NavigationController {
    open: bool,
    header_offset: f64,
    button: Option<NodeId>,
    menu: Option<NodeId>,
    nav_links: Vec<NodeId>,
    anchors: Vec<NodeId>,
    active: Option<NodeId>,
}

fn is_in_page_link(el: Element<'_>) -> bool {
    el.tag() == "a" && el.attr_starts_with("href", "#")
}

impl NavigationController {
    /// A closed, unwired controller.
    pub fn new(header_offset: f64) -> Self {
        Self {
            open: false,
            header_offset,
            button: None,
            menu: None,
            nav_links: Vec::new(),
            anchors: Vec::new(),
            active: None,
        }
    }

    /// Find the menu button, the menu and the nav links.
    ///
    /// The initial open state is read from the menu's `hidden` class.
    pub fn wire(doc: &Document, header_offset: f64) -> Self {
        let mut controller = Self::new(header_offset);

        let button = doc.query_first(|el| el.attr("onclick") == Some(TOGGLE_HANDLER));
        let menu = doc.get_element_by_id(MENU_ID);

        match (button, menu) {
            (Some(button), Some(menu)) => {
                controller.button = Some(button);
                controller.menu = Some(menu);
                controller.open = !doc.has_class(menu, HIDDEN_CLASS);
            }
            _ => tracing::debug!("Mobile menu not found, skipping menu wiring"),
        }

        controller.nav_links = doc
            .query(is_in_page_link)
            .into_iter()
            .filter(|link| doc.closest(*link, |el| el.tag() == "nav").is_some())
            .collect();

        controller
    }

    /// Attach smooth scrolling to every in-page anchor currently in the document.
    pub fn wire_smooth_scroll(&mut self, doc: &Document) {
        self.anchors = doc.query(is_in_page_link);
        tracing::debug!(anchors = self.anchors.len(), "Smooth scrolling wired");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether both the menu button and the menu were found.
    pub fn is_wired(&self) -> bool {
        self.button.is_some() && self.menu.is_some()
    }

    pub fn active_link(&self) -> Option<NodeId> {
        self.active
    }

    /// Flip the menu; returns the new open state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Close the menu; returns whether it was open.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// Escape closes an open menu and does nothing otherwise.
    pub fn handle_escape(&mut self) -> bool {
        self.open && self.close()
    }

    /// Mark a nav link as the active one.
    pub fn highlight(&mut self, link: NodeId) {
        self.active = Some(link);
    }

    /// Whether a click on `target` landed outside both the button and the menu.
    pub fn is_outside(&self, doc: &Document, target: NodeId) -> bool {
        match (self.button, self.menu) {
            (Some(button), Some(menu)) => {
                !doc.contains(button, target) && !doc.contains(menu, target)
            }
            _ => false,
        }
    }

    /// Scroll position for an in-page `href`, or `None` when the target is missing.
    pub fn scroll_request(&self, doc: &Document, href: &str) -> Option<ScrollRequest> {
        let id = href.strip_prefix('#')?;
        if id.is_empty() {
            return None;
        }
        let target = doc.get_element_by_id(id)?;
        Some(ScrollRequest {
            top: doc.offset_top(target) - self.header_offset,
            behavior: ScrollBehavior::Smooth,
        })
    }

    /// Route a click through the menu toggle, link handlers and outside-click check.
    pub fn handle_click(&mut self, doc: &Document, target: NodeId) -> NavClick {
        let mut outcome = NavClick::default();
        let was_open = self.open;

        // Without a menu there is nothing to open.
        if self.is_wired()
            && doc
                .closest(target, |el| el.attr("onclick") == Some(TOGGLE_HANDLER))
                .is_some()
        {
            self.toggle();
        }

        if let Some(link) = doc.closest(target, |el| el.tag() == "a") {
            if self.nav_links.contains(&link) {
                self.highlight(link);
            }
            if self.anchors.contains(&link) {
                outcome.default_prevented = true;
                let href = doc.attr(link, "href").unwrap_or_default();
                if let Some(scroll) = self.scroll_request(doc, href) {
                    outcome.scroll = Some(scroll);
                    self.close();
                }
            }
        }

        if self.is_outside(doc, target) {
            self.close();
        }

        outcome.menu_changed = was_open != self.open;
        outcome
    }

    /// Write menu visibility and link highlighting to the document.
    pub fn sync(&self, doc: &mut Document) {
        if let Some(menu) = self.menu {
            doc.set_class(menu, HIDDEN_CLASS, !self.open);
        }
        if let Some(active) = self.active {
            for link in &self.nav_links {
                doc.set_class(*link, ACTIVE_CLASS, *link == active);
            }
        }
    }
}
