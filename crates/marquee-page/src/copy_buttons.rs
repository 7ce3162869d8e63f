//! Keyboard access for code-block copy buttons.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, Element, NodeId};

/// Prefix of the inline handler that marks a copy button.
pub const COPY_HANDLER: &str = "copyToClipboard";

const GROUP_CLASS: &str = "group";

static PAYLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*copyToClipboard\('(.*)'\)\s*;?\s*$").expect("Invalid copy handler regex")
});

/// Whether an element carries the copy handler.
pub fn is_copy_button(el: Element<'_>) -> bool {
    el.attr_starts_with("onclick", COPY_HANDLER)
}

/// Escaped payload embedded in a `copyToClipboard('...')` handler.
pub fn payload_for(handler: &str) -> Option<&str> {
    PAYLOAD_RE
        .captures(handler)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Keys that activate a focused copy button.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// The copy buttons found in code blocks.
#[derive(Debug, Clone, Default)]
pub struct CopyButtons {
    buttons: Vec<NodeId>,
}

impl CopyButtons {
    /// Make the first copy button of every `.group` block focusable.
    pub fn wire(doc: &mut Document) -> Self {
        let blocks = doc.query(|el| el.has_class(GROUP_CLASS));

        let buttons: Vec<NodeId> = blocks
            .into_iter()
            .filter_map(|block| doc.query_within(block, is_copy_button).into_iter().next())
            .collect();

        for button in &buttons {
            doc.set_attr(*button, "tabindex", "0");
        }

        tracing::debug!(buttons = buttons.len(), "Copy buttons wired");
        Self { buttons }
    }

    pub fn buttons(&self) -> &[NodeId] {
        &self.buttons
    }

    /// The wired button a key press on `target` activates.
    pub fn activated_by(&self, target: NodeId, key: &str) -> Option<NodeId> {
        (is_activation_key(key) && self.buttons.contains(&target)).then_some(target)
    }

    /// Escaped payload of the copy button at or above `target`, if any.
    ///
    /// Clicks go through the inline handler, so any element carrying it counts,
    /// wired or not.
    pub fn clicked_payload<'d>(doc: &'d Document, target: NodeId) -> Option<&'d str> {
        let button = doc.closest(target, is_copy_button)?;
        doc.attr(button, "onclick").and_then(payload_for)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn block(doc: &mut Document, handler: &str) -> NodeId {
        let body = doc.body();
        let group = doc.build("div").class("relative group").append_to(body);
        let button = doc
            .build("button")
            .attr("onclick", handler)
            .append_to(group);
        doc.build("i").class("fas fa-copy").append_to(button);
        doc.build("pre").append_to(group);
        button
    }

    #[test]
    fn extracts_payload() {
        assert_eq!(
            payload_for(r"copyToClipboard('echo \'hi\'\nls')"),
            Some(r"echo \'hi\'\nls")
        );
        assert_eq!(payload_for("copyToClipboard('')"), Some(""));
        assert_eq!(payload_for("toggleMobileMenu()"), None);
    }

    #[test]
    fn makes_buttons_focusable() {
        let mut doc = Document::new();
        let first = block(&mut doc, "copyToClipboard('a')");
        let second = block(&mut doc, "copyToClipboard('b')");

        let wired = CopyButtons::wire(&mut doc);

        assert_eq!(wired.buttons(), &[first, second]);
        assert_eq!(doc.attr(first, "tabindex"), Some("0"));
        assert_eq!(doc.attr(second, "tabindex"), Some("0"));
    }

    #[test]
    fn ignores_buttons_outside_groups() {
        let mut doc = Document::new();
        let body = doc.body();
        let loose = doc
            .build("button")
            .attr("onclick", "copyToClipboard('x')")
            .append_to(body);

        let wired = CopyButtons::wire(&mut doc);

        assert!(wired.buttons().is_empty());
        assert_eq!(doc.attr(loose, "tabindex"), None);
    }

    #[test]
    fn enter_and_space_activate() {
        let mut doc = Document::new();
        let button = block(&mut doc, "copyToClipboard('a')");
        let wired = CopyButtons::wire(&mut doc);

        assert_eq!(wired.activated_by(button, "Enter"), Some(button));
        assert_eq!(wired.activated_by(button, " "), Some(button));
        assert_eq!(wired.activated_by(button, "Tab"), None);
        assert_eq!(wired.activated_by(doc.body(), "Enter"), None);
    }

    #[test]
    fn click_on_icon_finds_payload() {
        let mut doc = Document::new();
        let button = block(&mut doc, r"copyToClipboard('npm i\nnpm test')");
        let icon = doc.children(button)[0];

        assert_eq!(
            CopyButtons::clicked_payload(&doc, icon),
            Some(r"npm i\nnpm test")
        );
        assert_eq!(CopyButtons::clicked_payload(&doc, doc.body()), None);
    }
}
