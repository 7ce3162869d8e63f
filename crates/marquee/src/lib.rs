//! marquee: a landing page with an interactive runtime.
//!
//! Site content and runtime settings come from `site.toml` ([`Site::load`]).
//! [`Site::render`] produces the page markup, [`Site::document`] parses it into
//! a [`Document`], and [`Site::start`] runs the page runtime over it.

pub mod site;
pub mod telemetry;

pub use site::{Site, SiteConfig, SiteError, SiteSection};

pub use marquee_components::{
    Badge, CodeSnippet, Component, ComponentRenderer, Contributor, Feature, FeatureItem,
    InstallationStep, NavItem, PageLayout, RenderError,
};
pub use marquee_page::{
    App, ClipboardService, CopyOutcome, Document, EventOutcome, GithubContributors, NodeId,
    PageEvent, RuntimeConfig,
};
