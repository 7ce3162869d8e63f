//! Skip link, main landmark and labels for icon-only copy buttons.

use crate::dom::{Document, NodeId};

pub const MAIN_CONTENT_ID: &str = "main-content";
pub const SKIP_LINK_TEXT: &str = "Skip to main content";
pub const COPY_BUTTON_LABEL: &str = "Copy to clipboard";

const SKIP_LINK_CLASSES: &str =
    "sr-only focus:not-sr-only focus:absolute focus:top-4 focus:left-4 bg-blue-600 text-white p-2 rounded";

const SKIP_LINK_CSS: &str = r#"
  position: absolute;
  top: -40px;
  left: 6px;
  background: #2563eb;
  color: white;
  padding: 8px;
  border-radius: 4px;
  text-decoration: none;
  transition: top 0.3s;
  z-index: 1000;
"#;

const SKIP_LINK_SHOWN_TOP: &str = "6px";
const SKIP_LINK_HIDDEN_TOP: &str = "-40px";

/// Off-screen link that jumps to the main landmark when focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipLink {
    node: NodeId,
}

impl SkipLink {
    /// Insert the link as the first child of `body`, pointing at `#target_id`.
    pub fn inject(doc: &mut Document, target_id: &str) -> Self {
        let node = doc
            .build("a")
            .attr("href", &format!("#{}", target_id))
            .class(SKIP_LINK_CLASSES)
            .text(SKIP_LINK_TEXT)
            .detached();
        doc.set_css_text(node, SKIP_LINK_CSS);

        let body = doc.body();
        let first = doc.first_child(body);
        doc.insert_before(body, node, first);

        Self { node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn on_focus(&self, doc: &mut Document) {
        doc.set_style(self.node, "top", SKIP_LINK_SHOWN_TOP);
    }

    pub fn on_blur(&self, doc: &mut Document) {
        doc.set_style(self.node, "top", SKIP_LINK_HIDDEN_TOP);
    }
}

/// Mark the first `section` as the main landmark.
///
/// An existing id is kept so in-page links to the section still resolve;
/// [`MAIN_CONTENT_ID`] is only assigned to a section without one.
pub fn tag_main_landmark(doc: &mut Document) -> Option<NodeId> {
    let Some(section) = doc.query_first(|el| el.tag() == "section") else {
        tracing::debug!("No section found, skipping main landmark");
        return None;
    };
    if doc.attr(section, "id").is_none_or(str::is_empty) {
        doc.set_attr(section, "id", MAIN_CONTENT_ID);
    }
    doc.set_attr(section, "role", "main");
    Some(section)
}

/// Label buttons that only show a copy icon. Returns the labelled buttons.
pub fn label_copy_buttons(doc: &mut Document) -> Vec<NodeId> {
    let unlabelled: Vec<NodeId> = doc
        .query(|el| el.tag() == "button" && el.attr("aria-label").is_none_or(str::is_empty))
        .into_iter()
        .filter(|button| doc.text_content(*button).trim().is_empty())
        .filter(|button| {
            doc.query_within(*button, |el| el.tag() == "i")
                .first()
                .is_some_and(|icon| doc.has_class(*icon, "fa-copy"))
        })
        .collect();

    for button in &unlabelled {
        doc.set_attr(*button, "aria-label", COPY_BUTTON_LABEL);
    }
    unlabelled
}

/// What the accessibility pass added to the page.
#[derive(Debug, Clone)]
pub struct Accessibility {
    pub skip_link: SkipLink,
    pub main: Option<NodeId>,
    pub labelled: Vec<NodeId>,
}

/// Run every enhancement.
pub fn enhance(doc: &mut Document) -> Accessibility {
    let main = tag_main_landmark(doc);
    let target_id = main
        .and_then(|section| doc.attr(section, "id"))
        .unwrap_or(MAIN_CONTENT_ID)
        .to_string();
    let skip_link = SkipLink::inject(doc, &target_id);
    let labelled = label_copy_buttons(doc);

    tracing::debug!(labelled = labelled.len(), "Accessibility enhancements applied");

    Accessibility {
        skip_link,
        main,
        labelled,
    }
}
