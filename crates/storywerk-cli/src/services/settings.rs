// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor settings resolution for the command line.

use std::path::{Path, PathBuf};

use storywerk_core::EditorConfig;
use storywerk_core::error::Result;
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.json";

/// Default location of the persisted settings:
/// `$XDG_CONFIG_HOME/storywerk/config.json`, else under `~/.config`.
/// `None` when neither variable is set.
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("storywerk").join(CONFIG_FILE))
}

/// Settings from an explicit file (which must exist and parse), else from the
/// default location if present, else built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<EditorConfig> {
    if let Some(path) = explicit {
        let config = EditorConfig::load(path)?;
        info!(path = %path.display(), "Using settings file");
        return Ok(config);
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            let config = EditorConfig::load(&path)?;
            info!(path = %path.display(), "Using saved settings");
            Ok(config)
        }
        _ => {
            debug!("No saved settings, using defaults");
            Ok(EditorConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "image_base_width": 270.0 }"#).expect("write");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.image_base_width, 270.0);
        assert_eq!(config.min_scale, EditorConfig::default().min_scale);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_config(Some(&dir.path().join("absent.json"))).is_err());
    }
}
