pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::time::Duration;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::{config_path, load};
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOAST_DURATION_MS: u64 = 1500;

/// Behaviour of the dialog manager and toast slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Play fade transitions when the surface can show them.
    pub animations: bool,
    pub toast_duration_ms: u64,
    /// Plain text longer than this many characters opens a wide dialog.
    pub wide_text_threshold: usize,
    /// Markup longer than this many characters opens a wide dialog.
    pub wide_markup_threshold: usize,
    pub fatal_error_title: String,
    /// Shown in place of an empty message body.
    pub placeholder_text: String,
}

impl OverlayConfig {
    /// The configured toast duration; zero falls back to the built-in default.
    pub fn toast_duration(&self) -> Duration {
        match self.toast_duration_ms {
            0 => Duration::from_millis(DEFAULT_TOAST_DURATION_MS),
            ms => Duration::from_millis(ms),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            animations: true,
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            wide_text_threshold: 500,
            wide_markup_threshold: 800,
            fatal_error_title: "Fatal error".to_string(),
            placeholder_text: "(no text)".to_string(),
        }
    }
}

/// Geometry and timing of the terminal surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
    /// Frame width in columns for regular dialogs.
    pub narrow_width: u16,
    /// Frame width in columns for wide dialogs.
    pub wide_width: u16,
}

impl SurfaceConfig {
    pub const fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub const fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: 150,
            fade_out_ms: 190,
            narrow_width: 60,
            wide_width: 96,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}
