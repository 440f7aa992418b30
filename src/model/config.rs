use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from wrc.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub show_key_hints: bool,
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Kitty keyboard protocol: true = force on, false = force off, absent = on (default).
    /// Modifier key presses (and so the automation key combination) are
    /// only reported with it on.
    #[serde(default)]
    pub kitty_keyboard: Option<bool>,
}
