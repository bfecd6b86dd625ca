//! Composition settings
//!
//! The user-chosen look of a composited screenshot, persisted by the
//! host under one well-known key. Every capture request runs against an
//! immutable snapshot of these values; edits made mid-flight only
//! affect later requests.

use serde::{Deserialize, Serialize};
use snapmat_gradient::Color;
use snapmat_render::Background;

/// Store key the settings live under
pub const SETTINGS_KEY: &str = "screenshotSettings";

/// Gradient used until the user picks something else
pub const DEFAULT_GRADIENT_CSS: &str = "linear-gradient(135deg, #667eea 0%, #764ba2 100%)";

/// Default padding around the capture, in pixels
pub const DEFAULT_PADDING: u32 = 50;

/// Which background family to paint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Gradient,
    Solid,
    Transparent,
}

/// Snapshot of the composition options for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSettings {
    #[serde(rename = "backgroundType", default = "default_background")]
    pub background: BackgroundKind,
    /// CSS gradient string, kept verbatim; parsed only when painting
    #[serde(rename = "gradient", default = "default_gradient_css")]
    pub gradient_css: String,
    /// Solid fill color; the compositor substitutes white when absent
    #[serde(rename = "solidColor", default)]
    pub solid_color: Option<Color>,
    #[serde(default = "default_padding")]
    pub padding: u32,
}

fn default_background() -> BackgroundKind {
    BackgroundKind::Gradient
}

fn default_gradient_css() -> String {
    DEFAULT_GRADIENT_CSS.to_string()
}

fn default_padding() -> u32 {
    DEFAULT_PADDING
}

impl Default for CompositionSettings {
    fn default() -> Self {
        Self {
            background: default_background(),
            gradient_css: default_gradient_css(),
            solid_color: None,
            padding: default_padding(),
        }
    }
}

impl CompositionSettings {
    /// Background description for the compositor
    pub fn background_spec(&self) -> Background {
        match self.background {
            BackgroundKind::Gradient => Background::Gradient(self.gradient_css.clone()),
            BackgroundKind::Solid => Background::Solid(self.solid_color),
            BackgroundKind::Transparent => Background::Transparent,
        }
    }
}

/// Settings store failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("settings store: {0}")]
    Io(String),
}

/// Persisted settings access under [`SETTINGS_KEY`].
///
/// Implementations are simple key/value shims; everything about
/// defaults and shape lives on this side of the interface.
pub trait SettingsStore {
    /// Currently stored settings, or None when the key is empty or
    /// unreadable
    fn load(&self) -> Option<CompositionSettings>;

    /// Replace the stored settings
    fn save(&self, settings: &CompositionSettings) -> Result<(), StoreError>;
}

/// Read the active settings, seeding the store with defaults when the
/// key has never been written.
pub fn ensure_defaults(store: &dyn SettingsStore) -> CompositionSettings {
    match store.load() {
        Some(settings) => settings,
        None => {
            let defaults = CompositionSettings::default();
            if let Err(e) = store.save(&defaults) {
                tracing::warn!("could not seed default settings: {}", e);
            } else {
                tracing::info!("seeded default settings");
            }
            defaults
        }
    }
}
