//! Transient "copied" toast.
//!
//! One floating element (`#copy-feedback`) is created on first use and reused
//! while attached. A notification slides it into view, slides it out after
//! the visible period, and removes it once the exit animation has run.
//!
//! A notification that arrives while an earlier one is still visible or
//! leaving replaces it: the text is swapped, the element slides back in and
//! the visible period restarts. The earlier deadlines are dropped, so they can
//! never hide or remove the newer message.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::FeedbackConfig;
use crate::dom::{Document, NodeId};

pub const COPIED_MESSAGE: &str = "Copied to clipboard!";
pub const COPY_FAILED_MESSAGE: &str = "Copy failed. Please copy manually.";

const FEEDBACK_ID: &str = "copy-feedback";
const SHOWN_TRANSFORM: &str = "translateY(0)";
const HIDDEN_TRANSFORM: &str = "translateY(-100px)";

const FEEDBACK_CSS: &str = r#"
  position: fixed;
  top: 20px;
  right: 20px;
  background: #10b981;
  color: white;
  padding: 12px 24px;
  border-radius: 8px;
  font-size: 14px;
  font-weight: 500;
  z-index: 1000;
  transform: translateY(-100px);
  transition: transform 0.3s ease;
  box-shadow: 0 4px 12px rgba(0, 0, 0, 0.15);
"#;

/// Where the toast is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackPhase {
    /// No element in the document
    Idle,
    /// Element in view
    Visible,
    /// Exit animation running
    Leaving,
}

/// Owner of the feedback element and its timers.
#[derive(Debug)]
pub struct FeedbackNotifier {
    element: Option<NodeId>,
    phase: FeedbackPhase,
    hide_at: Option<Instant>,
    remove_at: Option<Instant>,
    visible_for: Duration,
    exit_after: Duration,
}

impl FeedbackNotifier {
    pub fn new(config: &FeedbackConfig) -> Self {
        Self {
            element: None,
            phase: FeedbackPhase::Idle,
            hide_at: None,
            remove_at: None,
            visible_for: config.visible_for(),
            exit_after: config.exit_after(),
        }
    }

    /// Show a message, creating the element if needed.
    pub fn notify(&mut self, doc: &mut Document, message: &str, now: Instant) -> NodeId {
        let element = match self.element {
            Some(el) if doc.is_attached(el) => el,
            previous => {
                // Detached by the page; free it before making a new one.
                if let Some(el) = previous {
                    doc.remove(el);
                }
                let el = doc.build("div").id(FEEDBACK_ID).detached();
                doc.set_css_text(el, FEEDBACK_CSS);
                doc.append_child(doc.body(), el);
                el
            }
        };

        if self.phase != FeedbackPhase::Idle {
            tracing::debug!("Replacing visible feedback message");
        }

        doc.set_text(element, message);
        doc.set_style(element, "transform", SHOWN_TRANSFORM);

        self.element = Some(element);
        self.phase = FeedbackPhase::Visible;
        self.hide_at = Some(now + self.visible_for);
        self.remove_at = None;

        element
    }

    /// Advance timers to `now`.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) {
        loop {
            match self.phase {
                FeedbackPhase::Visible => {
                    let Some(hide_at) = self.hide_at.filter(|t| *t <= now) else {
                        break;
                    };
                    if let Some(el) = self.element {
                        doc.set_style(el, "transform", HIDDEN_TRANSFORM);
                    }
                    self.phase = FeedbackPhase::Leaving;
                    self.hide_at = None;
                    self.remove_at = Some(hide_at + self.exit_after);
                }
                FeedbackPhase::Leaving => {
                    if !self.remove_at.is_some_and(|t| t <= now) {
                        break;
                    }
                    if let Some(el) = self.element.take() {
                        // No-op when the page removed it already.
                        doc.remove(el);
                    }
                    self.phase = FeedbackPhase::Idle;
                    self.remove_at = None;
                }
                FeedbackPhase::Idle => break,
            }
        }
    }

    pub fn phase(&self) -> FeedbackPhase {
        self.phase
    }

    pub fn element(&self) -> Option<NodeId> {
        self.element
    }

    /// When `tick` next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            FeedbackPhase::Visible => self.hide_at,
            FeedbackPhase::Leaving => self.remove_at,
            FeedbackPhase::Idle => None,
        }
    }
}
