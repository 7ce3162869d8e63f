//! Page startup and event routing.

use tokio::time::Instant;

use crate::accessibility::{self, Accessibility};
use crate::clipboard::{ClipboardService, CopyOutcome, LegacyCopy, SystemClipboard};
use crate::config::RuntimeConfig;
use crate::contributors::{ContributorCountTask, ContributorSource, TaskStatus};
use crate::copy_buttons::CopyButtons;
use crate::dom::{Document, NodeId};
use crate::feedback::FeedbackNotifier;
use crate::navigation::{NavigationController, ScrollRequest};
use crate::performance::{IntersectionEntry, LazyImages, ScrollGate};

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Click { target: NodeId },
    KeyDown { target: NodeId, key: String },
    Focus { target: NodeId },
    Blur { target: NodeId },
    Scroll,
    /// A frame requested after a scroll ran
    AnimationFrame,
    Intersection(Vec<IntersectionEntry>),
    /// Clock advanced; runs due timers
    Tick,
}

/// What the host should do after an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOutcome {
    pub default_prevented: bool,
    pub scroll: Option<ScrollRequest>,
    /// Result of a copy started or completed during this event
    pub copy: Option<CopyOutcome>,
    /// Request an animation frame and send [`PageEvent::AnimationFrame`] when it runs
    pub frame_requested: bool,
    pub images_loaded: usize,
}

/// The running page.
pub struct App<C, L> {
    doc: Document,
    config: RuntimeConfig,
    navigation: NavigationController,
    copy_buttons: CopyButtons,
    clipboard: ClipboardService<C, L>,
    feedback: FeedbackNotifier,
    contributors: Option<ContributorCountTask>,
    accessibility: Accessibility,
    lazy_images: Option<LazyImages>,
    scroll: ScrollGate,
}

impl<C: SystemClipboard, L: LegacyCopy> App<C, L> {
    /// Wire the page. Must run once the document structure is in place.
    ///
    /// The contributor fetch is started but not awaited.
    pub fn initialize<S: ContributorSource>(
        mut doc: Document,
        config: RuntimeConfig,
        clipboard: ClipboardService<C, L>,
        source: S,
    ) -> Self {
        tracing::info!("Initializing page runtime");

        let mut navigation = NavigationController::wire(&doc, config.header_offset);
        navigation.wire_smooth_scroll(&doc);
        let copy_buttons = CopyButtons::wire(&mut doc);
        let contributors = ContributorCountTask::start(&mut doc, source);
        let accessibility = accessibility::enhance(&mut doc);

        let lazy_images = if config.lazy_images {
            Some(LazyImages::observe(&doc))
        } else {
            tracing::debug!("Lazy images disabled");
            None
        };

        let feedback = FeedbackNotifier::new(&config.feedback);

        tracing::info!(
            menu = navigation.is_wired(),
            copy_buttons = copy_buttons.buttons().len(),
            "Page runtime ready"
        );

        Self {
            doc,
            config,
            navigation,
            copy_buttons,
            clipboard,
            feedback,
            contributors,
            accessibility,
            lazy_images,
            scroll: ScrollGate::default(),
        }
    }

    /// Route an event to the controller that owns it.
    ///
    /// Never waits on background work. A clipboard write that finished since
    /// the last event is applied first and reported in the outcome.
    pub fn dispatch(&mut self, event: PageEvent, now: Instant) -> EventOutcome {
        let completed = self.poll_background(now);

        let mut outcome = match event {
            PageEvent::Click { target } => self.click(target, now),
            PageEvent::KeyDown { target, key } => self.key_down(target, &key, now),
            PageEvent::Focus { target } => {
                if target == self.accessibility.skip_link.node() {
                    self.accessibility.skip_link.on_focus(&mut self.doc);
                }
                EventOutcome::default()
            }
            PageEvent::Blur { target } => {
                if target == self.accessibility.skip_link.node() {
                    self.accessibility.skip_link.on_blur(&mut self.doc);
                }
                EventOutcome::default()
            }
            PageEvent::Scroll => EventOutcome {
                frame_requested: self.scroll.on_scroll(),
                ..Default::default()
            },
            PageEvent::AnimationFrame => {
                self.scroll.on_frame();
                EventOutcome::default()
            }
            PageEvent::Intersection(entries) => {
                let images_loaded = match self.lazy_images.as_mut() {
                    Some(images) => images.on_intersect(&mut self.doc, &entries),
                    None => 0,
                };
                EventOutcome {
                    images_loaded,
                    ..Default::default()
                }
            }
            PageEvent::Tick => EventOutcome::default(),
        };

        self.feedback.tick(&mut self.doc, now);
        if outcome.copy.is_none() {
            outcome.copy = completed;
        }
        outcome
    }

    fn click(&mut self, target: NodeId, now: Instant) -> EventOutcome {
        let mut outcome = EventOutcome::default();

        let payload = CopyButtons::clicked_payload(&self.doc, target).map(str::to_owned);
        if let Some(payload) = payload {
            let copied = self
                .clipboard
                .copy(&mut self.doc, &mut self.feedback, &payload, now);
            outcome.copy = Some(copied);
        }

        let nav = self.navigation.handle_click(&self.doc, target);
        self.navigation.sync(&mut self.doc);
        outcome.default_prevented = nav.default_prevented;
        outcome.scroll = nav.scroll;

        outcome
    }

    fn key_down(&mut self, target: NodeId, key: &str, now: Instant) -> EventOutcome {
        if key == "Escape" && self.navigation.handle_escape() {
            self.navigation.sync(&mut self.doc);
        }

        match self.copy_buttons.activated_by(target, key) {
            Some(button) => {
                let mut outcome = self.click(button, now);
                outcome.default_prevented = true;
                outcome
            }
            None => EventOutcome::default(),
        }
    }

    /// Apply background results that have arrived: the contributor count and
    /// a finished clipboard write. Returns the copy outcome, if one completed.
    pub fn poll_background(&mut self, now: Instant) -> Option<CopyOutcome> {
        if let Some(task) = self.contributors.as_mut() {
            if task.poll(&mut self.doc) != TaskStatus::Pending {
                self.contributors = None;
            }
        }

        self.clipboard.poll(&mut self.doc, &mut self.feedback, now)
    }

    /// Wait for background work to finish and apply it.
    ///
    /// Returns the outcome of a clipboard write that was still pending.
    pub async fn settle(&mut self, now: Instant) -> Option<CopyOutcome> {
        if let Some(task) = self.contributors.take() {
            task.finish(&mut self.doc).await;
        }
        self.clipboard
            .finish(&mut self.doc, &mut self.feedback, now)
            .await
    }

    /// Cancel background work.
    pub fn teardown(&mut self) {
        if let Some(task) = self.contributors.take() {
            tracing::debug!("Aborting contributor fetch");
            task.abort();
        }
        if self.clipboard.abort() {
            tracing::debug!("Aborting clipboard write");
        }
    }

    /// Earliest instant a [`PageEvent::Tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.feedback.next_deadline()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn copy_buttons(&self) -> &CopyButtons {
        &self.copy_buttons
    }

    pub fn clipboard(&self) -> &ClipboardService<C, L> {
        &self.clipboard
    }

    pub fn feedback(&self) -> &FeedbackNotifier {
        &self.feedback
    }

    pub fn accessibility(&self) -> &Accessibility {
        &self.accessibility
    }

    pub fn lazy_images(&self) -> Option<&LazyImages> {
        self.lazy_images.as_ref()
    }
}
