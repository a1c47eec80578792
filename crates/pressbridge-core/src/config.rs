// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration and data directory resolution.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BridgeError, Result};

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "pressbridge.json";

/// Persistent bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Hold duration at which a press completes as a long press.
    pub long_press_delay_ms: u64,
    /// Hold duration used by simulated presses on headless widgets.
    pub min_press_duration_ms: u64,
    /// Host queue capacity.  `None` means unbounded; when bounded, emits
    /// into a full queue drop the event instead of blocking.
    pub queue_capacity: Option<usize>,
    /// Log events that arrive for an unmounted control at `warn` instead of
    /// `debug`.
    pub warn_on_stale: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            long_press_delay_ms: 500,
            min_press_duration_ms: 130,
            queue_capacity: None,
            warn_on_stale: true,
        }
    }
}

impl BridgeConfig {
    /// Check the settings for values the bridge cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == Some(0) {
            return Err(BridgeError::Config("queue_capacity must be at least 1".into()));
        }
        if self.min_press_duration_ms >= self.long_press_delay_ms {
            return Err(BridgeError::Config(format!(
                "min_press_duration_ms ({}) must be below long_press_delay_ms ({})",
                self.min_press_duration_ms, self.long_press_delay_ms
            )));
        }
        Ok(())
    }

    /// Load the config from `dir`, falling back to defaults when the file is
    /// missing, unparsable, or invalid.
    pub fn load(dir: &Path) -> Self {
        match Self::try_load(dir) {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!(dir = %dir.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "ignoring unusable config file");
                Self::default()
            }
        }
    }

    /// Strict variant of [`BridgeConfig::load`]: `Ok(None)` when absent.
    pub fn try_load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Write the config as pretty JSON into `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(CONFIG_FILE), json)?;
        Ok(())
    }
}

/// Directory under the data root that holds `pressbridge.json`.
const APP_DIR: &str = "pressbridge";

/// Resolve and create the bridge's data directory.
///
/// Embedders on mobile pass their sandbox directory to `BridgeConfig::load`
/// directly and never call this.
pub fn data_dir() -> Result<PathBuf> {
    let dir = data_root(std::env::var_os("XDG_DATA_HOME"), std::env::var_os("HOME"))
        .join(APP_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// `$XDG_DATA_HOME`, else `$HOME/.local/share`, else the temp dir.
/// Empty or relative XDG values are ignored, as the XDG base-dir rules require.
fn data_root(xdg_data_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let xdg = xdg_data_home.map(PathBuf::from).filter(|p| p.is_absolute());
    let home = home
        .filter(|h| !h.is_empty())
        .map(|h| PathBuf::from(h).join(".local").join("share"));
    xdg.or(home).unwrap_or_else(std::env::temp_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BridgeConfig::default();
        assert_eq!(config.long_press_delay_ms, 500);
        assert_eq!(config.min_press_duration_ms, 130);
        assert!(config.queue_capacity.is_none());
        config.validate().expect("defaults validate");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = BridgeConfig {
            long_press_delay_ms: 800,
            queue_capacity: Some(64),
            ..BridgeConfig::default()
        };
        config.save(dir.path()).expect("save");

        let loaded = BridgeConfig::try_load(dir.path()).expect("load").expect("present");
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(BridgeConfig::try_load(dir.path()).expect("load").is_none());
        assert_eq!(BridgeConfig::load(dir.path()), BridgeConfig::default());
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "{ nope").expect("write");

        assert!(matches!(
            BridgeConfig::try_load(dir.path()),
            Err(BridgeError::Serialization(_))
        ));
        assert_eq!(BridgeConfig::load(dir.path()), BridgeConfig::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "queue_capacity": 16 }"#)
            .expect("write");

        let loaded = BridgeConfig::load(dir.path());
        assert_eq!(loaded.queue_capacity, Some(16));
        assert_eq!(loaded.long_press_delay_ms, 500);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = BridgeConfig {
            queue_capacity: Some(0),
            ..BridgeConfig::default()
        };
        assert!(matches!(config.validate(), Err(BridgeError::Config(_))));

        let dir = tempfile::tempdir().expect("tempdir");
        assert!(config.save(dir.path()).is_err());
    }

    #[test]
    fn press_duration_must_stay_below_long_press_delay() {
        let config = BridgeConfig {
            min_press_duration_ms: 600,
            ..BridgeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn data_root_prefers_absolute_xdg_data_home() {
        let root = data_root(Some("/srv/data".into()), Some("/home/ada".into()));
        assert_eq!(root, PathBuf::from("/srv/data"));
    }

    #[test]
    fn data_root_ignores_empty_or_relative_xdg_data_home() {
        let expected = PathBuf::from("/home/ada/.local/share");
        assert_eq!(data_root(Some("".into()), Some("/home/ada".into())), expected);
        assert_eq!(data_root(Some("share".into()), Some("/home/ada".into())), expected);
    }

    #[test]
    fn data_root_falls_back_to_temp_dir() {
        assert_eq!(data_root(None, None), std::env::temp_dir());
        assert_eq!(data_root(None, Some("".into())), std::env::temp_dir());
    }
}
