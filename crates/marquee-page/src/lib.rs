//! Interactive runtime for the marquee landing page.
//!
//! The runtime works on an in-memory [`Document`] and keeps menu, toast and
//! fetch state in explicit controllers. Hosts feed it [`PageEvent`]s and
//! carry out the returned [`EventOutcome`]s (scrolling, frame requests).

pub mod accessibility;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod contributors;
pub mod copy_buttons;
pub mod dom;
pub mod feedback;
pub mod navigation;
pub mod performance;

pub use app::{App, EventOutcome, PageEvent};
pub use clipboard::{
    ClipboardError, ClipboardService, CopyOutcome, CopySurface, LegacyCopy, NoLegacyCopy,
    NoSystemClipboard, SystemClipboard,
};
pub use config::{ContributorsConfig, FeedbackConfig, RuntimeConfig};
pub use contributors::{display_text, ContributorCountTask, ContributorSource, FetchError, GithubContributors};
pub use dom::{Document, Element, ElementBuilder, NodeId};
pub use feedback::{FeedbackNotifier, FeedbackPhase};
pub use navigation::{NavigationController, ScrollBehavior, ScrollRequest};
pub use performance::{Debouncer, IntersectionEntry, LazyImages, ScrollGate, Throttle};
