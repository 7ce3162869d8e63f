//! Lazy image loading, scroll gating and rate limiters.

use std::time::Duration;

use tokio::time::Instant;

use crate::dom::{Document, NodeId};

const DATA_SRC: &str = "data-src";

/// One observation reported by the host's intersection observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
}

/// Images waiting to enter the viewport.
#[derive(Debug, Clone, Default)]
pub struct LazyImages {
    observed: Vec<NodeId>,
}

impl LazyImages {
    /// Observe every `img[data-src]` in the document.
    pub fn observe(doc: &Document) -> Self {
        let observed = doc.query(|el| el.tag() == "img" && el.attr(DATA_SRC).is_some());
        tracing::debug!(images = observed.len(), "Observing lazy images");
        Self { observed }
    }

    pub fn observed(&self) -> &[NodeId] {
        &self.observed
    }

    pub fn is_observed(&self, image: NodeId) -> bool {
        self.observed.contains(&image)
    }

    /// Load intersecting images and stop observing them. Returns how many loaded.
    pub fn on_intersect(&mut self, doc: &mut Document, entries: &[IntersectionEntry]) -> usize {
        let mut loaded = 0;
        for entry in entries {
            if !entry.is_intersecting || !self.is_observed(entry.target) {
                continue;
            }
            if let Some(src) = doc.remove_attr(entry.target, DATA_SRC) {
                doc.set_attr(entry.target, "src", src);
                loaded += 1;
            }
            self.observed.retain(|img| *img != entry.target);
        }
        loaded
    }
}

/// Coalesces scroll events into at most one pending animation frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollGate {
    ticking: bool,
}

impl ScrollGate {
    /// Returns `true` when a frame should be requested.
    pub fn on_scroll(&mut self) -> bool {
        if self.ticking {
            return false;
        }
        self.ticking = true;
        true
    }

    /// The requested frame ran.
    pub fn on_frame(&mut self) {
        self.ticking = false;
    }

    pub fn is_pending(&self) -> bool {
        self.ticking
    }
}

/// Runs once `wait` has passed without another call.
///
/// With `immediate` the call that starts a quiet period runs right away and
/// the trailing edge is skipped. Call [`poll`](Self::poll) before
/// [`call`](Self::call) so a due trailing edge is seen first.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    immediate: bool,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(wait: Duration, immediate: bool) -> Self {
        Self {
            wait,
            immediate,
            deadline: None,
        }
    }

    /// Record a call. Returns `true` when it should run now.
    pub fn call(&mut self, now: Instant) -> bool {
        let call_now = self.immediate && self.deadline.is_none_or(|d| d <= now);
        self.deadline = Some(now + self.wait);
        call_now
    }

    /// Returns `true` when the trailing edge is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                !self.immediate
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Runs at most once per `limit`, on the leading edge.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit: Duration,
    blocked_until: Option<Instant>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            blocked_until: None,
        }
    }

    /// Returns `true` when the call should run.
    pub fn call(&mut self, now: Instant) -> bool {
        if self.blocked_until.is_some_and(|until| now < until) {
            return false;
        }
        self.blocked_until = Some(now + self.limit);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn gallery() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let lazy = doc.build("img").attr("data-src", "/a.png").append_to(body);
        let other = doc.build("img").attr("data-src", "/b.png").append_to(body);
        let eager = doc.build("img").attr("src", "/c.png").append_to(body);
        (doc, lazy, other, eager)
    }

    #[test]
    fn observes_only_deferred_images() {
        let (doc, lazy, other, eager) = gallery();

        let images = LazyImages::observe(&doc);

        assert_eq!(images.observed(), &[lazy, other]);
        assert!(!images.is_observed(eager));
    }

    #[test]
    fn loads_image_once() {
        let (mut doc, lazy, other, _) = gallery();
        let mut images = LazyImages::observe(&doc);
        let hit = IntersectionEntry {
            target: lazy,
            is_intersecting: true,
        };

        assert_eq!(images.on_intersect(&mut doc, &[hit]), 1);
        assert_eq!(doc.attr(lazy, "src"), Some("/a.png"));
        assert_eq!(doc.attr(lazy, "data-src"), None);
        assert!(!images.is_observed(lazy));
        assert!(images.is_observed(other));

        doc.set_attr(lazy, "src", "/changed.png");
        assert_eq!(images.on_intersect(&mut doc, &[hit]), 0);
        assert_eq!(doc.attr(lazy, "src"), Some("/changed.png"));
    }

    #[test]
    fn ignores_non_intersecting_entries() {
        let (mut doc, lazy, _, _) = gallery();
        let mut images = LazyImages::observe(&doc);

        let loaded = images.on_intersect(
            &mut doc,
            &[IntersectionEntry {
                target: lazy,
                is_intersecting: false,
            }],
        );

        assert_eq!(loaded, 0);
        assert!(images.is_observed(lazy));
        assert_eq!(doc.attr(lazy, "src"), None);
    }

    #[test]
    fn scroll_gate_requests_one_frame() {
        let mut gate = ScrollGate::default();

        assert!(gate.on_scroll());
        assert!(!gate.on_scroll());
        assert!(gate.is_pending());

        gate.on_frame();
        assert!(!gate.is_pending());
        assert!(gate.on_scroll());
    }

    #[test]
    fn debouncer_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(100), false);

        assert!(!debouncer.call(start));
        assert!(!debouncer.call(start + ms(50)));
        assert!(!debouncer.poll(start + ms(120)));
        assert!(debouncer.poll(start + ms(150)));
        assert!(!debouncer.poll(start + ms(400)));
    }

    #[test]
    fn immediate_debouncer_fires_on_leading_edge() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(100), true);

        assert!(debouncer.call(start));
        assert!(!debouncer.call(start + ms(50)));
        assert!(!debouncer.poll(start + ms(150)));
        assert!(debouncer.call(start + ms(300)));
    }

    #[test]
    fn throttle_limits_rate() {
        let start = Instant::now();
        let mut throttle = Throttle::new(ms(200));

        assert!(throttle.call(start));
        assert!(!throttle.call(start + ms(100)));
        assert!(!throttle.call(start + ms(199)));
        assert!(throttle.call(start + ms(200)));
        assert!(!throttle.call(start + ms(300)));
    }
}
