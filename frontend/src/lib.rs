//! Client-side preferences and dashboard logic for the organizze web app.

pub mod config;
pub mod error;
pub mod ledger;
pub mod preferences;
pub mod render;
pub mod storage;
pub mod theme;
pub mod wallpaper;

#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use config::PreferenceConfig;
pub use error::{ConfigError, PreferenceError, StorageError};
pub use preferences::{PreferenceState, PreferenceStore, SettingsSnapshot, ThemeChanged};
pub use render::Renderer;
pub use storage::{KeyValueStore, MemoryStore};
pub use theme::{ThemeDefinition, ThemeId, THEMES};
