//! How a toolchain came to exist.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Provenance of a toolchain descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Detection {
    /// Created by the user.
    #[default]
    Manual,
    /// Found by a factory scanning the environment.
    Auto,
    /// Restored from settings that recorded it as autodetected.
    AutoFromSettings,
}

impl Detection {
    /// Whether the toolchain was autodetected, whichever way.
    pub fn is_auto_detected(&self) -> bool {
        !matches!(self, Detection::Manual)
    }

    /// Provenance of a restored toolchain, from its persisted autodetect flag.
    pub fn from_autodetect_flag(auto_detected: bool) -> Self {
        if auto_detected {
            Detection::AutoFromSettings
        } else {
            Detection::Manual
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Detection::Manual => "manual",
            Detection::Auto => "auto",
            Detection::AutoFromSettings => "auto-from-settings",
        }
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
