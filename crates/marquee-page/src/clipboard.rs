//! Clipboard copy with a legacy fallback.
//!
//! A system clipboard write runs on its own task. [`ClipboardService::copy`]
//! returns right away with [`CopyOutcome::Pending`] and the result is applied
//! by [`poll`](ClipboardService::poll) or [`finish`](ClipboardService::finish),
//! so the page keeps handling events while the write is in flight.

use std::future::Future;

use marquee_components::payload;
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::dom::{Document, NodeId};
use crate::feedback::{FeedbackNotifier, COPIED_MESSAGE, COPY_FAILED_MESSAGE};

/// Errors reported by clipboard backends.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard write rejected: {0}")]
    WriteRejected(String),

    #[error("Copy command is not supported")]
    Unsupported,

    #[error("Clipboard write was interrupted")]
    Interrupted,

    #[error("No async runtime available")]
    NoRuntime,
}

/// The asynchronous clipboard capability.
pub trait SystemClipboard {
    /// Whether the capability exists and the page runs in a secure context.
    fn is_available(&self) -> bool;

    /// Write text to the system clipboard.
    ///
    /// The future is spawned, so it must own what it uses.
    fn write_text(
        &self,
        text: String,
    ) -> impl Future<Output = Result<(), ClipboardError>> + Send + 'static;
}

/// The legacy copy command, which copies the document's current selection.
pub trait LegacyCopy {
    /// Returns `Ok(false)` when the command ran but reported failure.
    fn exec_copy(&mut self, doc: &Document) -> Result<bool, ClipboardError>;
}

/// Host without an asynchronous clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSystemClipboard;

impl SystemClipboard for NoSystemClipboard {
    fn is_available(&self) -> bool {
        false
    }

    fn write_text(
        &self,
        _text: String,
    ) -> impl Future<Output = Result<(), ClipboardError>> + Send + 'static {
        std::future::ready(Err::<(), _>(ClipboardError::Unsupported))
    }
}

/// Host without a copy command.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLegacyCopy;

impl LegacyCopy for NoLegacyCopy {
    fn exec_copy(&mut self, _doc: &Document) -> Result<bool, ClipboardError> {
        Err(ClipboardError::Unsupported)
    }
}

/// How a copy request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// A system clipboard write is in flight
    Pending,
    /// Written through the asynchronous clipboard
    Modern,
    /// Written through the legacy copy command
    Legacy,
    /// Nothing was copied; the user was told to copy manually
    Failed,
}

/// Off-screen textarea holding the text for the legacy copy command.
///
/// The surface is removed from the document when dropped, whatever the copy
/// command reported.
pub struct CopySurface<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> CopySurface<'a> {
    /// Insert a fixed-position textarea containing `text`, focus and select it.
    pub fn acquire(doc: &'a mut Document, text: &str) -> Self {
        let node = doc.build("textarea").attr("value", text).detached();
        doc.set_style(node, "top", "0");
        doc.set_style(node, "left", "0");
        doc.set_style(node, "position", "fixed");
        doc.append_child(doc.body(), node);
        doc.focus(node);
        doc.select(node);
        Self { doc, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn document(&self) -> &Document {
        &*self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.doc
    }
}

impl Drop for CopySurface<'_> {
    fn drop(&mut self) {
        self.doc.remove(self.node);
    }
}

#[derive(Debug)]
struct PendingWrite {
    text: String,
    handle: JoinHandle<()>,
    rx: oneshot::Receiver<Result<(), ClipboardError>>,
}

/// Copies code payloads and reports the result through the feedback toast.
#[derive(Debug)]
pub struct ClipboardService<C, L> {
    system: C,
    legacy: L,
    pending: Option<PendingWrite>,
}

impl<C: SystemClipboard, L: LegacyCopy> ClipboardService<C, L> {
    pub fn new(system: C, legacy: L) -> Self {
        Self {
            system,
            legacy,
            pending: None,
        }
    }

    /// Copy an escaped payload (as embedded in `copyToClipboard('...')`).
    ///
    /// With a system clipboard and a Tokio runtime the write is spawned and
    /// [`CopyOutcome::Pending`] is returned; a newer copy supersedes an
    /// unfinished one. Otherwise the legacy fallback runs immediately.
    /// Never fails: every error ends in a visible message.
    pub fn copy(
        &mut self,
        doc: &mut Document,
        feedback: &mut FeedbackNotifier,
        escaped: &str,
        now: Instant,
    ) -> CopyOutcome {
        let text = payload::unescape(escaped);

        if self.system.is_available() {
            if Handle::try_current().is_ok() {
                self.start_write(text);
                return CopyOutcome::Pending;
            }
            tracing::warn!("Failed to copy text: {}", ClipboardError::NoRuntime);
        }

        self.fallback_copy(doc, feedback, &text, now)
    }

    fn start_write(&mut self, text: String) {
        if self.abort() {
            tracing::debug!("Superseded unfinished clipboard write");
        }

        let (tx, rx) = oneshot::channel();
        let write = self.system.write_text(text.clone());
        let handle = tokio::spawn(async move {
            let _ = tx.send(write.await);
        });

        self.pending = Some(PendingWrite { text, handle, rx });
    }

    /// Apply the pending write's result if it has arrived.
    ///
    /// Returns the final outcome once, or `None` while nothing has completed.
    pub fn poll(
        &mut self,
        doc: &mut Document,
        feedback: &mut FeedbackNotifier,
        now: Instant,
    ) -> Option<CopyOutcome> {
        let result = match self.pending.as_mut()?.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(ClipboardError::Interrupted),
        };
        let pending = self.pending.take()?;
        Some(self.complete(doc, feedback, &pending.text, result, now))
    }

    /// Wait for the pending write and apply its result.
    pub async fn finish(
        &mut self,
        doc: &mut Document,
        feedback: &mut FeedbackNotifier,
        now: Instant,
    ) -> Option<CopyOutcome> {
        let pending = self.pending.take()?;
        let result = pending
            .rx
            .await
            .unwrap_or(Err(ClipboardError::Interrupted));
        Some(self.complete(doc, feedback, &pending.text, result, now))
    }

    /// Cancel the pending write without feedback. Returns `false` if none was running.
    pub fn abort(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn complete(
        &mut self,
        doc: &mut Document,
        feedback: &mut FeedbackNotifier,
        text: &str,
        result: Result<(), ClipboardError>,
        now: Instant,
    ) -> CopyOutcome {
        match result {
            Ok(()) => {
                feedback.notify(doc, COPIED_MESSAGE, now);
                CopyOutcome::Modern
            }
            Err(e) => {
                tracing::warn!("Failed to copy text: {}", e);
                self.fallback_copy(doc, feedback, text, now)
            }
        }
    }

    /// Copy through a temporary selection and the legacy copy command.
    pub fn fallback_copy(
        &mut self,
        doc: &mut Document,
        feedback: &mut FeedbackNotifier,
        text: &str,
        now: Instant,
    ) -> CopyOutcome {
        let mut surface = CopySurface::acquire(doc, text);

        let copied = match self.legacy.exec_copy(surface.document()) {
            Ok(copied) => copied,
            Err(e) => {
                tracing::warn!("Fallback copy failed: {}", e);
                false
            }
        };

        let message = if copied {
            COPIED_MESSAGE
        } else {
            COPY_FAILED_MESSAGE
        };
        feedback.notify(surface.document_mut(), message, now);

        if copied {
            CopyOutcome::Legacy
        } else {
            CopyOutcome::Failed
        }
    }

    pub fn system(&self) -> &C {
        &self.system
    }

    pub fn legacy(&self) -> &L {
        &self.legacy
    }
}

impl<C, L> Drop for ClipboardService<C, L> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::testing::{FakeClipboard, FakeLegacy};
    use super::*;
    use crate::config::FeedbackConfig;
    use crate::feedback::FeedbackPhase;

    fn feedback() -> FeedbackNotifier {
        FeedbackNotifier::new(&FeedbackConfig::default())
    }

    fn feedback_text(doc: &Document) -> Option<String> {
        doc.get_element_by_id("copy-feedback")
            .map(|el| doc.text_content(el))
    }

    fn textareas(doc: &Document) -> usize {
        doc.query(|el| el.tag() == "textarea").len()
    }

    #[tokio::test]
    async fn writes_unescaped_text_to_system_clipboard() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service = ClipboardService::new(FakeClipboard::available(), FakeLegacy::succeeding());
        let now = Instant::now();

        let outcome = service.copy(&mut doc, &mut notifier, r"echo \'hi\'\nls", now);
        assert_eq!(outcome, CopyOutcome::Pending);
        assert_eq!(feedback_text(&doc), None);

        let done = service.finish(&mut doc, &mut notifier, now).await;

        assert_eq!(done, Some(CopyOutcome::Modern));
        assert_eq!(service.system().written(), vec!["echo 'hi'\nls".to_string()]);
        assert_eq!(feedback_text(&doc).as_deref(), Some(COPIED_MESSAGE));
        assert!(service.legacy().copied.is_empty());
        assert!(!service.is_pending());
    }

    #[tokio::test]
    async fn poll_applies_result_once() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service = ClipboardService::new(FakeClipboard::available(), FakeLegacy::succeeding());
        let now = Instant::now();

        service.copy(&mut doc, &mut notifier, "ls", now);

        let mut outcome = None;
        for _ in 0..100 {
            outcome = service.poll(&mut doc, &mut notifier, now);
            if outcome.is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(outcome, Some(CopyOutcome::Modern));
        assert_eq!(service.poll(&mut doc, &mut notifier, now), None);
        assert_eq!(notifier.next_deadline(), Some(now + Duration::from_millis(3000)));
    }

    #[tokio::test]
    async fn unresolved_write_shows_nothing_until_aborted() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service =
            ClipboardService::new(FakeClipboard::never_resolving(), FakeLegacy::succeeding());
        let now = Instant::now();

        assert_eq!(
            service.copy(&mut doc, &mut notifier, "ls", now),
            CopyOutcome::Pending
        );
        tokio::task::yield_now().await;

        assert_eq!(service.poll(&mut doc, &mut notifier, now), None);
        assert!(service.is_pending());
        assert_eq!(notifier.phase(), FeedbackPhase::Idle);

        assert!(service.abort());
        assert!(!service.abort());
        assert_eq!(service.finish(&mut doc, &mut notifier, now).await, None);
    }

    #[tokio::test]
    async fn newer_copy_supersedes_unfinished_write() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service =
            ClipboardService::new(FakeClipboard::never_resolving(), FakeLegacy::succeeding());
        let now = Instant::now();

        service.copy(&mut doc, &mut notifier, "first", now);
        service.copy(&mut doc, &mut notifier, "second", now);

        assert!(service.abort());
        assert!(!service.abort());

        assert!(service.legacy().copied.is_empty());
        assert_eq!(feedback_text(&doc), None);
    }

    #[test]
    fn falls_back_without_runtime() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service = ClipboardService::new(FakeClipboard::available(), FakeLegacy::succeeding());

        let outcome = service.copy(&mut doc, &mut notifier, "ls", Instant::now());

        assert_eq!(outcome, CopyOutcome::Legacy);
        assert!(service.system().written().is_empty());
        assert_eq!(service.legacy().copied, vec!["ls".to_string()]);
    }

    #[tokio::test]
    async fn falls_back_when_unavailable() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service = ClipboardService::new(FakeClipboard::default(), FakeLegacy::succeeding());

        let outcome = service.copy(&mut doc, &mut notifier, r"a\nb", Instant::now());

        assert_eq!(outcome, CopyOutcome::Legacy);
        assert_eq!(service.legacy().copied, vec!["a\nb".to_string()]);
        assert_eq!(feedback_text(&doc).as_deref(), Some(COPIED_MESSAGE));
        assert_eq!(textareas(&doc), 0);
    }

    #[tokio::test]
    async fn falls_back_when_write_rejected() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service = ClipboardService::new(FakeClipboard::rejecting(), FakeLegacy::succeeding());
        let now = Instant::now();

        service.copy(&mut doc, &mut notifier, "pip install x", now);
        let outcome = service.finish(&mut doc, &mut notifier, now).await;

        assert_eq!(outcome, Some(CopyOutcome::Legacy));
        assert_eq!(service.legacy().copied, vec!["pip install x".to_string()]);
        assert_eq!(textareas(&doc), 0);
    }

    #[test]
    fn reports_failure_and_removes_surface() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service =
            ClipboardService::new(NoSystemClipboard, FakeLegacy::reporting_failure());

        let outcome = service.copy(&mut doc, &mut notifier, "text", Instant::now());

        assert_eq!(outcome, CopyOutcome::Failed);
        assert_eq!(feedback_text(&doc).as_deref(), Some(COPY_FAILED_MESSAGE));
        assert_eq!(textareas(&doc), 0);
    }

    #[test]
    fn command_error_is_not_fatal() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service = ClipboardService::new(NoSystemClipboard, FakeLegacy::throwing());

        let outcome = service.copy(&mut doc, &mut notifier, "text", Instant::now());

        assert_eq!(outcome, CopyOutcome::Failed);
        assert_eq!(feedback_text(&doc).as_deref(), Some(COPY_FAILED_MESSAGE));
        assert_eq!(textareas(&doc), 0);
    }

    #[test]
    fn feedback_uses_the_callers_clock() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service = ClipboardService::new(NoSystemClipboard, FakeLegacy::succeeding());
        let now = Instant::now() + Duration::from_secs(60);

        service.copy(&mut doc, &mut notifier, "text", now);

        assert_eq!(notifier.next_deadline(), Some(now + Duration::from_millis(3000)));
    }

    #[test]
    fn fallback_copies_do_not_grow_document() {
        let mut doc = Document::new();
        let mut notifier = feedback();
        let mut service = ClipboardService::new(NoSystemClipboard, FakeLegacy::succeeding());
        let now = Instant::now();

        for _ in 0..1000 {
            service.copy(&mut doc, &mut notifier, "text", now);
        }

        // body and the toast
        assert_eq!(doc.node_count(), 2);
        assert_eq!(service.legacy().copied.len(), 1000);
    }

    #[test]
    fn surface_is_fixed_selected_and_released() {
        let mut doc = Document::new();

        let node = {
            let surface = CopySurface::acquire(&mut doc, "copied text");
            let node = surface.node();
            let doc = surface.document();
            assert!(doc.is_attached(node));
            assert_eq!(doc.style(node, "position"), Some("fixed"));
            assert_eq!(doc.active_element(), Some(node));
            assert_eq!(doc.selected_text(), Some("copied text"));
            node
        };

        assert!(!doc.exists(node));
        assert_eq!(doc.selected_text(), None);
        assert_eq!(doc.active_element(), None);
    }
}
