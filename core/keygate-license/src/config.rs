//! Service configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Settings supplied by the operator.
///
/// Only `key_expiry_hours` and `admin_secret` affect lifecycle behavior;
/// the rest is passed through to the HTTP boundary.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeygateConfig {
    /// Display name of the gated script.
    pub script_name: String,
    /// Lifetime of newly issued keys, in hours.
    pub key_expiry_hours: u32,
    /// Shared secret for admin operations.
    pub admin_secret: String,
    /// Partner link users are sent to before a key is issued.
    pub redirect_link: String,
    /// Community invite link.
    pub community_link: String,
}

impl KeygateConfig {
    /// Marker left in an unconfigured redirect link.
    pub const PLACEHOLDER_MARKER: &'static str = "YOUR_LINK";

    /// Returns true if the redirect link is still the placeholder, in which
    /// case keys are issued directly.
    #[must_use]
    pub fn is_demo_redirect(&self) -> bool {
        self.redirect_link.contains(Self::PLACEHOLDER_MARKER)
    }
}

impl Default for KeygateConfig {
    fn default() -> Self {
        Self {
            script_name: "My Script".to_string(),
            key_expiry_hours: 24,
            admin_secret: "admin123".to_string(),
            redirect_link: "https://loot-link.com/s?YOUR_LINK".to_string(),
            community_link: "https://discord.gg/yourserver".to_string(),
        }
    }
}

impl fmt::Debug for KeygateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeygateConfig")
            .field("script_name", &self.script_name)
            .field("key_expiry_hours", &self.key_expiry_hours)
            .field("admin_secret", &"<redacted>")
            .field("redirect_link", &self.redirect_link)
            .field("community_link", &self.community_link)
            .finish()
    }
}
