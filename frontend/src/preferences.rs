//! Theme and wallpaper preferences for the current session.
//!
//! [`PreferenceStore`] owns the in-memory [`PreferenceState`] and mirrors it
//! into a [`KeyValueStore`] on a best-effort basis. The in-memory state is
//! authoritative for the session: a failed write is reported to the caller
//! but never rolls the change back.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use tracing::{debug, info, warn};
use yew::Callback;

use crate::config::{
    clamp_opacity, PreferenceConfig, THEME_KEY, WALLPAPER_IMAGE_KEY, WALLPAPER_OPACITY_KEY,
};
use crate::error::PreferenceError;
use crate::render::Renderer;
use crate::storage::{resolve_or_default, KeyValueStore};
use crate::theme::{ThemeDefinition, ThemeId, THEMES};
use crate::wallpaper::{
    decode_to_data_uri, validate_data_uri, validate_upload, ByteSource, WallpaperPreview,
    WallpaperSettings,
};

#[derive(Clone, Debug, PartialEq)]
pub struct PreferenceState {
    pub active_theme: ThemeId,
    pub wallpaper_image: Option<String>,
    pub wallpaper_opacity: f64,
}

impl PreferenceState {
    pub fn defaults(config: &PreferenceConfig) -> Self {
        PreferenceState {
            active_theme: config.default_theme_or_fallback(),
            wallpaper_image: None,
            wallpaper_opacity: clamp_opacity(config.default_opacity, 0.0),
        }
    }

    pub fn has_wallpaper(&self) -> bool {
        self.wallpaper_image.is_some()
    }
}

/// Plain form of the preferences, used for export and import.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub wallpaper: Option<String>,
    #[serde(default)]
    pub opacity: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeChanged {
    pub theme_id: ThemeId,
}

pub struct PreferenceStore<S, R> {
    storage: S,
    renderer: R,
    config: PreferenceConfig,
    state: RefCell<PreferenceState>,
    listeners: RefCell<Vec<Callback<ThemeChanged>>>,
}

impl<S: KeyValueStore, R: Renderer> PreferenceStore<S, R> {
    pub fn new(storage: S, renderer: R) -> Self {
        Self::with_config(storage, renderer, PreferenceConfig::default())
    }

    pub fn with_config(storage: S, renderer: R, config: PreferenceConfig) -> Self {
        let state = PreferenceState::defaults(&config);
        PreferenceStore {
            storage,
            renderer,
            config,
            state: RefCell::new(state),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Loads every field from storage, substituting defaults for missing or
    /// malformed entries, then renders the result.
    pub fn initialize(&self) {
        let defaults = PreferenceState::defaults(&self.config);
        let limit = self.config.max_wallpaper_bytes;
        let fallback_opacity = defaults.wallpaper_opacity;

        let active_theme = resolve_or_default(&self.storage, THEME_KEY, defaults.active_theme, |raw| {
            raw.parse::<ThemeId>().ok()
        });
        let wallpaper_image = resolve_or_default(&self.storage, WALLPAPER_IMAGE_KEY, None, |raw| {
            validate_data_uri(raw, limit).ok().map(|_| Some(raw.to_string()))
        });
        let wallpaper_opacity =
            resolve_or_default(&self.storage, WALLPAPER_OPACITY_KEY, fallback_opacity, |raw| {
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|value| !value.is_nan())
                    .map(|value| clamp_opacity(value, fallback_opacity))
            });

        *self.state.borrow_mut() = PreferenceState {
            active_theme,
            wallpaper_image,
            wallpaper_opacity,
        };
        self.render_all();
        info!(theme = %active_theme, wallpaper_opacity, "preferences initialized");
    }

    pub fn list_themes(&self) -> &'static [ThemeDefinition] {
        &THEMES
    }

    pub fn active_theme(&self) -> &'static ThemeDefinition {
        self.state.borrow().active_theme.definition()
    }

    pub fn state(&self) -> PreferenceState {
        self.state.borrow().clone()
    }

    pub fn config(&self) -> &PreferenceConfig {
        &self.config
    }

    pub fn wallpaper_settings(&self) -> WallpaperSettings {
        let state = self.state.borrow();
        WallpaperSettings {
            has_wallpaper: state.has_wallpaper(),
            opacity: state.wallpaper_opacity,
            preview: state.wallpaper_image.clone(),
        }
    }

    /// Registers a listener for successful theme switches.
    pub fn subscribe(&self, callback: Callback<ThemeChanged>) {
        self.listeners.borrow_mut().push(callback);
    }

    pub fn set_theme(&self, theme_id: &str) -> Result<&'static ThemeDefinition, PreferenceError> {
        let id = theme_id.parse::<ThemeId>().map_err(|err| {
            warn!(theme = theme_id, "theme not found");
            err
        })?;

        self.state.borrow_mut().active_theme = id;
        let persisted = self.persist(THEME_KEY, id.as_str());
        let theme = id.definition();
        self.renderer.apply_theme(theme);
        self.notify(id);
        debug!(theme = %id, "theme switched");

        persisted.map(|_| theme)
    }

    /// Validates, reads and stores a new wallpaper.
    ///
    /// State is only touched once the read completes, so of two uploads in
    /// flight the one finishing last wins, and a failed upload leaves any
    /// existing wallpaper in place.
    pub async fn upload_wallpaper<B: ByteSource>(
        &self,
        source: B,
        mime_type: &str,
        size_bytes: u64,
    ) -> Result<WallpaperPreview, PreferenceError> {
        let limit = self.config.max_wallpaper_bytes;
        validate_upload(mime_type, size_bytes, limit).map_err(|err| {
            warn!(mime_type, size_bytes, error = %err, "wallpaper rejected");
            err
        })?;

        let data_uri = decode_to_data_uri(source, mime_type, limit)
            .await
            .map_err(|err| {
                warn!(mime_type, error = %err, "wallpaper read failed");
                err
            })?;

        info!(mime_type, size_bytes, "wallpaper uploaded");
        self.store_wallpaper(data_uri.clone())?;
        Ok(WallpaperPreview {
            message: "Wallpaper uploaded successfully".to_string(),
            preview: data_uri,
        })
    }

    /// Stores an already encoded wallpaper after checking it is an image
    /// data URI within the size ceiling.
    pub fn set_wallpaper_data_uri(&self, data_uri: &str) -> Result<(), PreferenceError> {
        validate_data_uri(data_uri, self.config.max_wallpaper_bytes)?;
        self.store_wallpaper(data_uri.to_string())
    }

    /// Saturates `value` into `[0, 1]` and returns the stored opacity.
    pub fn set_wallpaper_opacity(&self, value: f64) -> Result<f64, PreferenceError> {
        let opacity = clamp_opacity(value, self.config.default_opacity);
        let image = {
            let mut state = self.state.borrow_mut();
            state.wallpaper_opacity = opacity;
            state.wallpaper_image.clone()
        };
        let persisted = self.persist(WALLPAPER_OPACITY_KEY, &opacity.to_string());
        self.renderer.apply_background(image.as_deref(), opacity);
        persisted.map(|_| opacity)
    }

    pub fn remove_wallpaper(&self) -> Result<(), PreferenceError> {
        let (theme, opacity) = {
            let mut state = self.state.borrow_mut();
            state.wallpaper_image = None;
            (state.active_theme, state.wallpaper_opacity)
        };
        let removed = self.unpersist(WALLPAPER_IMAGE_KEY);
        self.renderer.apply_background(None, opacity);
        self.renderer.apply_theme(theme.definition());
        debug!("wallpaper removed");
        removed
    }

    pub fn export_settings(&self) -> SettingsSnapshot {
        let state = self.state.borrow();
        SettingsSnapshot {
            theme: Some(state.active_theme.as_str().to_string()),
            wallpaper: state.wallpaper_image.clone(),
            opacity: Some(state.wallpaper_opacity),
        }
    }

    /// Applies every present field through its setter. Fields are independent:
    /// a bad one does not stop the others. Returns the first error seen.
    pub fn import_settings(&self, snapshot: &SettingsSnapshot) -> Result<(), PreferenceError> {
        let mut first_error = None;

        if let Some(theme) = snapshot.theme.as_deref() {
            if let Err(err) = self.set_theme(theme) {
                first_error.get_or_insert(err);
            }
        }
        if let Some(wallpaper) = snapshot.wallpaper.as_deref() {
            if let Err(err) = self.set_wallpaper_data_uri(wallpaper) {
                first_error.get_or_insert(err);
            }
        }
        if let Some(opacity) = snapshot.opacity {
            if let Err(err) = self.set_wallpaper_opacity(opacity) {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Restores the built-in defaults and clears the persisted entries.
    /// Removal failures are logged only. Subscribers always hear about the
    /// default theme, changed or not.
    pub fn reset_to_defaults(&self) {
        let defaults = PreferenceState::defaults(&self.config);
        let default_theme = defaults.active_theme;
        *self.state.borrow_mut() = defaults;

        for key in [THEME_KEY, WALLPAPER_IMAGE_KEY, WALLPAPER_OPACITY_KEY] {
            let _ = self.unpersist(key);
        }
        self.render_all();
        self.notify(default_theme);
        info!("preferences reset to defaults");
    }

    fn store_wallpaper(&self, data_uri: String) -> Result<(), PreferenceError> {
        let persisted = self.persist(WALLPAPER_IMAGE_KEY, &data_uri);
        let opacity = {
            let mut state = self.state.borrow_mut();
            state.wallpaper_image = Some(data_uri.clone());
            state.wallpaper_opacity
        };
        self.renderer.apply_background(Some(&data_uri), opacity);
        persisted
    }

    fn render_all(&self) {
        let state = self.state();
        self.renderer.apply_theme(state.active_theme.definition());
        self.renderer
            .apply_background(state.wallpaper_image.as_deref(), state.wallpaper_opacity);
    }

    fn notify(&self, theme_id: ThemeId) {
        // listeners may subscribe while being notified
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener.emit(ThemeChanged { theme_id });
        }
    }

    fn persist(&self, key: &'static str, value: &str) -> Result<(), PreferenceError> {
        self.storage.set(key, value).map_err(|source| {
            warn!(key, error = %source, "preference not persisted");
            PreferenceError::PersistenceWrite { key, source }
        })
    }

    fn unpersist(&self, key: &'static str) -> Result<(), PreferenceError> {
        self.storage.remove(key).map_err(|source| {
            warn!(key, error = %source, "persisted preference not removed");
            PreferenceError::PersistenceWrite { key, source }
        })
    }
}
