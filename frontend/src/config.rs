use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::theme::ThemeId;

pub const THEME_KEY: &str = "theme";
pub const WALLPAPER_IMAGE_KEY: &str = "wallpaperImage";
pub const WALLPAPER_OPACITY_KEY: &str = "wallpaperOpacity";

pub const DEFAULT_OPACITY: f64 = 0.3;
pub const MAX_WALLPAPER_BYTES: u64 = 5 * 1024 * 1024;

/// Built-in defaults for a [`crate::preferences::PreferenceStore`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceConfig {
    pub default_theme: String,
    pub default_opacity: f64,
    pub max_wallpaper_bytes: u64,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        PreferenceConfig {
            default_theme: ThemeId::FALLBACK.as_str().to_string(),
            default_opacity: DEFAULT_OPACITY,
            max_wallpaper_bytes: MAX_WALLPAPER_BYTES,
        }
    }
}

impl PreferenceConfig {
    /// Parses a JSON config. Missing fields take their defaults, an unknown
    /// default theme is rejected and the default opacity is clamped.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let mut config: PreferenceConfig = serde_json::from_str(raw)?;
        config.validate()?;
        config.default_opacity = clamp_opacity(config.default_opacity, DEFAULT_OPACITY);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.theme_id().map(|_| ())
    }

    pub fn theme_id(&self) -> Result<ThemeId, ConfigError> {
        self.default_theme
            .parse::<ThemeId>()
            .map_err(|_| ConfigError::UnknownTheme(self.default_theme.clone()))
    }

    pub(crate) fn default_theme_or_fallback(&self) -> ThemeId {
        self.theme_id().unwrap_or(ThemeId::FALLBACK)
    }
}

/// Saturates `value` into `[0, 1]`; NaN has no position in the range and
/// maps to `fallback`.
pub fn clamp_opacity(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let config = PreferenceConfig::default();
        assert_eq!(config.default_theme, "warm");
        assert_eq!(config.default_opacity, 0.3);
        assert_eq!(config.max_wallpaper_bytes, 5_242_880);
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config = PreferenceConfig::from_json(r#"{"default_theme":"dark"}"#).unwrap();
        assert_eq!(config.theme_id().unwrap(), ThemeId::Dark);
        assert_eq!(config.default_opacity, DEFAULT_OPACITY);
        assert_eq!(config.max_wallpaper_bytes, MAX_WALLPAPER_BYTES);
    }

    #[test]
    fn from_json_clamps_opacity() {
        let config = PreferenceConfig::from_json(r#"{"default_opacity":3.5}"#).unwrap();
        assert_eq!(config.default_opacity, 1.0);
    }

    #[test]
    fn from_json_rejects_unknown_theme() {
        let err = PreferenceConfig::from_json(r#"{"default_theme":"neon"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTheme(t) if t == "neon"));
    }

    #[test]
    fn from_json_reports_syntax_errors() {
        assert!(matches!(
            PreferenceConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn clamp_saturates_and_maps_nan() {
        assert_eq!(clamp_opacity(1.4, 0.3), 1.0);
        assert_eq!(clamp_opacity(-0.2, 0.3), 0.0);
        assert_eq!(clamp_opacity(0.55, 0.3), 0.55);
        assert_eq!(clamp_opacity(f64::NAN, 0.3), 0.3);
        assert_eq!(clamp_opacity(f64::INFINITY, 0.3), 1.0);
    }
}
