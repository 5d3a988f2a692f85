//! Feed settings, read from an optional `feed.toml`.
//!
//! Settings never branch feed behavior directly: the feed only watches
//! their fingerprint to invalidate its cache; the hosting shell decides
//! what a mode means.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where the hosting shell is allowed to source update notes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedMode {
    /// Only locally bundled and discovered content.
    #[default]
    LocalOnly,
    /// Remote sources may additionally be fetched by the host.
    RemoteOk,
}

/// Feed settings parsed from `feed.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSettings {
    #[serde(default)]
    pub mode: FeedMode,
}

impl FeedSettings {
    /// Loads settings from an explicit path.
    ///
    /// A missing file yields the defaults silently; a malformed file
    /// yields the defaults with a warning. Settings loading never fails.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no feed settings file, using defaults");
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(settings) => settings,
                Err(error) => {
                    warn!(path = %path.display(), "failed to parse feed settings, using defaults: {error}");
                    Self::default()
                }
            },
            Err(error) => {
                warn!(path = %path.display(), "failed to read feed settings, using defaults: {error}");
                Self::default()
            }
        }
    }

    /// Conventional settings location under the given config directory.
    #[must_use]
    pub fn default_path(config_dir: &Path) -> PathBuf {
        config_dir.join("feed.toml")
    }

    /// Whether the host may consult remote sources.
    #[must_use]
    pub const fn allows_remote(&self) -> bool {
        matches!(self.mode, FeedMode::RemoteOk)
    }

    /// Stable fingerprint for cache invalidation; feed hosts return this
    /// from [`PackageHost::config_fingerprint`](crate::PackageHost::config_fingerprint).
    #[must_use]
    pub const fn fingerprint(&self) -> &'static str {
        match self.mode {
            FeedMode::LocalOnly => "local-only",
            FeedMode::RemoteOk => "remote-ok",
        }
    }
}
