//! HTML fragment components for the marquee landing page.
//!
//! Each component is a plain view model rendered through minijinja templates
//! with HTML auto-escaping. Fragments are returned as strings; inserting them
//! into a document is the caller's job.

pub mod layout;
pub mod model;
pub mod payload;
pub mod templates;

pub use layout::PageLayout;
pub use model::{Badge, CodeSnippet, Contributor, Feature, FeatureItem, InstallationStep, NavItem};
pub use templates::{Component, ComponentRenderer, NavPlacement, Navigation, RenderError};
