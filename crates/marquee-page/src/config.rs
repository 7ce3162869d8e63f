//! Runtime configuration (`[runtime]` in site.toml).

use std::time::Duration;

use serde::Deserialize;

/// Settings for the page runtime.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// Height of the sticky header subtracted from scroll targets
    #[serde(default = "default_header_offset")]
    pub header_offset: f64,

    /// Enable intersection-based lazy image loading
    #[serde(default = "default_true")]
    pub lazy_images: bool,

    #[serde(default)]
    pub feedback: FeedbackConfig,

    #[serde(default)]
    pub contributors: ContributorsConfig,
}

/// Timing of the copy feedback toast.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedbackConfig {
    /// How long the message stays in view
    #[serde(default = "default_visible_ms")]
    pub visible_ms: u64,

    /// Exit animation length before the element is removed
    #[serde(default = "default_exit_ms")]
    pub exit_ms: u64,
}

/// Where the contributor count comes from.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContributorsConfig {
    /// Contributors listing endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Records requested per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// User-Agent sent with the request (the hosting API rejects anonymous agents)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_header_offset() -> f64 {
    80.0
}
fn default_true() -> bool {
    true
}
fn default_visible_ms() -> u64 {
    3000
}
fn default_exit_ms() -> u64 {
    300
}
fn default_endpoint() -> String {
    "https://api.github.com/repos/NomenAK/SuperClaude/contributors".to_string()
}
fn default_per_page() -> u32 {
    100
}
fn default_user_agent() -> String {
    concat!("marquee/", env!("CARGO_PKG_VERSION")).to_string()
}

impl FeedbackConfig {
    pub fn visible_for(&self) -> Duration {
        Duration::from_millis(self.visible_ms)
    }

    pub fn exit_after(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            header_offset: default_header_offset(),
            lazy_images: default_true(),
            feedback: FeedbackConfig::default(),
            contributors: ContributorsConfig::default(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            visible_ms: default_visible_ms(),
            exit_ms: default_exit_ms(),
        }
    }
}

impl Default for ContributorsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            per_page: default_per_page(),
            user_agent: default_user_agent(),
        }
    }
}
