use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::query::ClassifierRules;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_BLUR_GRACE_MS: u64 = 300;
pub const DEFAULT_MAX_RESULTS: usize = 50;
pub const DEFAULT_OBJECT_LABEL: &str = "company";

/// Settings for one lookup field. Missing keys in a config file fall back
/// to the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub rules: ClassifierRules,
    pub debounce_ms: u64,
    pub blur_grace_ms: u64,
    pub page_size: usize,
    pub max_results: usize,
    pub request_timeout_ms: Option<u64>,
    pub filters: BTreeMap<String, String>,
    /// A selection must be made before the surrounding form is valid.
    pub required: bool,
    /// Noun used in the "Please select a ..." message.
    pub object_label: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            rules: ClassifierRules::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            blur_grace_ms: DEFAULT_BLUR_GRACE_MS,
            page_size: DEFAULT_PAGE_SIZE,
            max_results: DEFAULT_MAX_RESULTS,
            request_timeout_ms: None,
            filters: BTreeMap::new(),
            required: false,
            object_label: DEFAULT_OBJECT_LABEL.to_string(),
        }
    }
}

impl LookupConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
