// SPDX-License-Identifier: GPL-3.0-only
//! Daemon configuration
//!
//! Read once at startup from `$XDG_CONFIG_HOME/xrandrd/config.kdl`:
//!
//! ```kdl
//! display ":0"
//! debounce-ms 2000
//! match-policy "strict"
//! reassert-auto #true
//! xrandr-command "xrandr"
//! dry-run #false
//! ```
//!
//! Every key is optional. A key that fails to parse is reported and left at
//! its default; the rest of the file still applies.

use std::path::PathBuf;
use std::time::Duration;

use kdl::{KdlDocument, KdlValue};

use crate::error::{AppError, Result};
use crate::layout::AutoPolicy;
use crate::resolve::MatchPolicy;

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const CONFIG_FILE: &str = "config.kdl";

/// Quiet period required after the last topology notification
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// X display to manage, `$DISPLAY` when unset
    pub display: Option<String>,
    pub debounce: Duration,
    pub match_policy: MatchPolicy,
    /// Re-send `--auto` to outputs already on a preferred mode
    pub reassert_auto: bool,
    pub xrandr_command: String,
    /// Log the layout command instead of running it
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: None,
            debounce: DEFAULT_DEBOUNCE,
            match_policy: MatchPolicy::default(),
            reassert_auto: true,
            xrandr_command: "xrandr".to_string(),
            dry_run: false,
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Load the config file, falling back to defaults when there is none
    ///
    /// On errors, the config built from whatever did parse is returned
    /// alongside them.
    pub fn load() -> std::result::Result<Self, (Vec<AppError>, Self)> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!("Loading config from {}", path.display());
                Self::from_kdl(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err((vec![AppError::Io(e)], Self::default())),
        }
    }

    pub fn from_kdl(text: &str) -> std::result::Result<Self, (Vec<AppError>, Self)> {
        let document: KdlDocument = match text.parse() {
            Ok(document) => document,
            Err(e) => {
                return Err((
                    vec![AppError::Config(format!("invalid KDL: {e}"))],
                    Self::default(),
                ));
            }
        };

        let mut config = Self::default();
        let mut errors = Vec::new();

        for node in document.nodes() {
            let key = node.name().value();
            let value = node.entries().first().map(|entry| entry.value());
            if let Err(e) = config.set(key, value) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(config)
        } else {
            Err((errors, config))
        }
    }

    pub fn auto_policy(&self) -> AutoPolicy {
        AutoPolicy {
            reassert: self.reassert_auto,
        }
    }

    fn set(&mut self, key: &str, value: Option<&KdlValue>) -> Result<()> {
        let value = value.ok_or_else(|| AppError::Config(format!("{key} needs a value")))?;

        match key {
            "display" => self.display = Some(string(key, value)?.to_string()),
            "debounce-ms" => {
                let millis = integer(key, value)?;
                if millis == 0 {
                    return Err(AppError::Config("debounce-ms must be positive".to_string()));
                }
                self.debounce = Duration::from_millis(millis);
            }
            "match-policy" => self.match_policy = string(key, value)?.parse()?,
            "reassert-auto" => self.reassert_auto = boolean(key, value)?,
            "xrandr-command" => self.xrandr_command = string(key, value)?.to_string(),
            "dry-run" => self.dry_run = boolean(key, value)?,
            other => return Err(AppError::Config(format!("unknown key {other:?}"))),
        }

        Ok(())
    }
}

fn string<'a>(key: &str, value: &'a KdlValue) -> Result<&'a str> {
    value
        .as_string()
        .ok_or_else(|| AppError::Config(format!("{key} expects a string, got {value}")))
}

fn integer(key: &str, value: &KdlValue) -> Result<u64> {
    value
        .as_integer()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| AppError::Config(format!("{key} expects a non-negative integer, got {value}")))
}

fn boolean(key: &str, value: &KdlValue) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| AppError::Config(format!("{key} expects #true or #false, got {value}")))
}
