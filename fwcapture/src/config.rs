use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use firewire_capture::{CaptureOptions, ChannelSelect};

/// Capture settings from a config file and the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub output: Option<PathBuf>,
    pub channel: Option<u8>,
    pub tag: Option<u8>,
    pub buffer_timeout_ms: Option<u64>,
    pub pool_count: Option<usize>,
    pub max_read_errors: Option<usize>,
}

impl CaptureConfig {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Layer `overrides` on top, keeping our values where it has none.
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            output: overrides.output.or(self.output),
            channel: overrides.channel.or(self.channel),
            tag: overrides.tag.or(self.tag),
            buffer_timeout_ms: overrides.buffer_timeout_ms.or(self.buffer_timeout_ms),
            pool_count: overrides.pool_count.or(self.pool_count),
            max_read_errors: overrides.max_read_errors.or(self.max_read_errors),
        }
    }

    pub fn options(&self) -> CaptureOptions {
        let defaults = CaptureOptions::default();
        CaptureOptions {
            select: ChannelSelect::new(
                self.channel.unwrap_or(defaults.select.channel),
                self.tag.unwrap_or(defaults.select.tag),
            ),
            buffer_timeout: self
                .buffer_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.buffer_timeout),
            pool_count: self.pool_count.or(defaults.pool_count),
            max_read_errors: self.max_read_errors.unwrap_or(defaults.max_read_errors),
        }
    }
}
