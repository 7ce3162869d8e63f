//! View-model records rendered by the components.
//!
//! Every field defaults to empty so partially specified site content renders
//! with blanks instead of failing.

use serde::{Deserialize, Serialize};

/// A shield-style badge linking to an external page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Badge {
    /// Link target
    pub url: String,
    /// Badge image URL
    pub image_source: String,
    /// Image alt text
    pub alt_text: String,
}

/// A single command row inside a feature card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureItem {
    pub command: String,
    pub description: String,
}

/// A feature card with an icon and a list of commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub title: String,
    pub description: String,
    /// Icon-font class list (e.g. `fas fa-terminal`)
    pub icon_class: String,
    pub items: Vec<FeatureItem>,
}

/// A contributor shown on the community section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contributor {
    /// Code-hosting username, used for avatar and profile links
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub tags: Vec<String>,
    /// Placeholder cards ("you could be here") have no avatar and an inert link
    pub is_placeholder: bool,
}

/// A snippet of code rendered with a copy button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSnippet {
    pub code: String,
    pub language: String,
}

impl CodeSnippet {
    /// Create a bash snippet.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Override the language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl Default for CodeSnippet {
    fn default() -> Self {
        Self {
            code: String::new(),
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "bash".to_string()
}

/// A numbered installation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallationStep {
    pub step_number: u32,
    pub title: String,
    /// Trusted markup inserted as-is (usually rendered code blocks)
    pub content: String,
    /// Background utility class for the step number badge
    pub bg_color: String,
}

impl Default for InstallationStep {
    fn default() -> Self {
        Self {
            step_number: 0,
            title: String::new(),
            content: String::new(),
            bg_color: default_step_color(),
        }
    }
}

fn default_step_color() -> String {
    "claude-bg-primary".to_string()
}

/// A navigation link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavItem {
    pub href: String,
    pub label: String,
}

impl NavItem {
    pub fn new(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
        }
    }
}
