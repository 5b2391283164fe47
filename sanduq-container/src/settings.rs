//! Container settings.
//!
//! Settings are plain data and deserialize with serde, so applications
//! can embed them in their own configuration.
//!
//! ```
//! use sanduq_container::settings::Settings;
//!
//! let settings = Settings::default().allow_override(true);
//! assert!(settings.allow_override);
//! assert!(!settings.strict_validation);
//! ```

use serde::{Deserialize, Serialize};

/// Behaviour switches for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Replace existing registrations instead of failing with
    /// `AlreadyRegistered`.
    pub allow_override: bool,

    /// Treat declared dependencies that nothing provides as build errors
    /// rather than warnings. Off by default, since callers may hand such
    /// dependencies in pre-built.
    pub strict_validation: bool,
}

impl Settings {
    pub fn allow_override(mut self, allow: bool) -> Self {
        self.allow_override = allow;
        self
    }

    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }
}
