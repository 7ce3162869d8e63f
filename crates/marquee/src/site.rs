//! Site content and runtime settings loaded from `site.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use marquee_components::{
    Badge, ComponentRenderer, Contributor, Feature, InstallationStep, NavItem, PageLayout,
    RenderError,
};
use marquee_page::{
    App, ClipboardService, ContributorSource, Document, FetchError, GithubContributors, LegacyCopy,
    RuntimeConfig, SystemClipboard,
};
use serde::Deserialize;

/// Errors from parsing or rendering a site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Invalid site config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Configuration file structure (site.toml).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub nav: Vec<NavItem>,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub steps: Vec<InstallationStep>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSection {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    /// Stylesheet URLs
    #[serde(default)]
    pub styles: Vec<String>,
    /// Script URLs
    #[serde(default)]
    pub scripts: Vec<String>,
}

fn default_title() -> String {
    "SuperClaude".to_string()
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: default_title(),
            tagline: String::new(),
            description: String::new(),
            styles: Vec::new(),
            scripts: Vec::new(),
        }
    }
}

impl SiteConfig {
    pub fn from_toml(content: &str) -> Result<Self, SiteError> {
        Ok(toml::from_str(content)?)
    }

    /// The page layout described by this config.
    pub fn layout(&self) -> PageLayout {
        PageLayout {
            title: self.site.title.clone(),
            tagline: self.site.tagline.clone(),
            description: self.site.description.clone(),
            nav: self.nav.clone(),
            badges: self.badges.clone(),
            features: self.features.clone(),
            steps: self.steps.clone(),
            contributors: self.contributors.clone(),
            styles: self.site.styles.clone(),
            scripts: self.site.scripts.clone(),
        }
    }
}

/// A loaded site, ready to render and run.
pub struct Site {
    config: SiteConfig,
    renderer: ComponentRenderer,
}

impl Site {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config,
            renderer: ComponentRenderer::new(),
        }
    }

    /// Load `path` if it exists, otherwise use defaults.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(Self::new(SiteConfig::default()));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = SiteConfig::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Render the full landing page.
    pub fn render(&self) -> Result<String, SiteError> {
        Ok(self.config.layout().render(&self.renderer)?)
    }

    /// Render the page and parse it into a document for the runtime.
    pub fn document(&self) -> Result<Document, SiteError> {
        Ok(Document::parse(&self.render()?))
    }

    /// Contributor source for the configured endpoint.
    pub fn contributor_source(&self) -> Result<GithubContributors, FetchError> {
        GithubContributors::new(&self.config.runtime.contributors)
    }

    /// Start the page runtime on `doc`, usually from [`document`](Self::document).
    pub fn start<C, L, S>(
        &self,
        doc: Document,
        clipboard: ClipboardService<C, L>,
        source: S,
    ) -> App<C, L>
    where
        C: SystemClipboard,
        L: LegacyCopy,
        S: ContributorSource,
    {
        App::initialize(doc, self.config.runtime.clone(), clipboard, source)
    }
}
