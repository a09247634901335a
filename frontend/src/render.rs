use std::rc::Rc;

use crate::theme::ThemeDefinition;

/// Side-effecting sink for preference changes. The browser implementation
/// lives in [`crate::browser::DomRenderer`].
pub trait Renderer {
    fn apply_theme(&self, theme: &ThemeDefinition);
    fn apply_background(&self, image: Option<&str>, opacity: f64);
}

impl<T: Renderer + ?Sized> Renderer for Rc<T> {
    fn apply_theme(&self, theme: &ThemeDefinition) {
        (**self).apply_theme(theme)
    }

    fn apply_background(&self, image: Option<&str>, opacity: f64) {
        (**self).apply_background(image, opacity)
    }
}

/// Renderer that drops every effect, for headless sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn apply_theme(&self, _theme: &ThemeDefinition) {}
    fn apply_background(&self, _image: Option<&str>, _opacity: f64) {}
}

pub const OPACITY_VAR: &str = "--wallpaper-opacity";

/// Inline body style declarations for a wallpaper (or its absence).
pub fn background_declarations(image: Option<&str>, opacity: f64) -> Vec<(&'static str, String)> {
    let mut out = Vec::with_capacity(5);
    match image {
        Some(uri) => {
            out.push(("background-image", format!("url('{}')", uri)));
            out.push(("background-size", "cover".to_string()));
            out.push(("background-position", "center".to_string()));
            out.push(("background-attachment", "fixed".to_string()));
        }
        None => out.push(("background-image", "none".to_string())),
    }
    out.push((OPACITY_VAR, opacity.to_string()));
    out
}

/// Preview swatch for the settings page: the wallpaper washed out with a
/// white overlay of `1 - opacity`, or the theme's base color without one.
pub fn preview_background(theme: &ThemeDefinition, image: Option<&str>, opacity: f64) -> String {
    match image {
        Some(uri) => {
            let veil = 1.0 - opacity;
            format!(
                "linear-gradient(rgba(255, 255, 255, {veil}), rgba(255, 255, 255, {veil})), url('{uri}')"
            )
        }
        None => theme.colors.base_background.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeId;

    #[test]
    fn wallpaper_declarations_cover_the_page() {
        let decls = background_declarations(Some("data:image/png;base64,AA=="), 0.5);
        assert_eq!(decls[0], ("background-image", "url('data:image/png;base64,AA==')".to_string()));
        assert!(decls.contains(&("background-size", "cover".to_string())));
        assert_eq!(decls.last(), Some(&(OPACITY_VAR, "0.5".to_string())));
    }

    #[test]
    fn no_wallpaper_clears_the_image() {
        let decls = background_declarations(None, 0.3);
        assert_eq!(
            decls,
            vec![
                ("background-image", "none".to_string()),
                (OPACITY_VAR, "0.3".to_string())
            ]
        );
    }

    #[test]
    fn preview_falls_back_to_theme_color() {
        assert_eq!(preview_background(ThemeId::Dark.definition(), None, 0.3), "#1a1f3a");
        assert_eq!(preview_background(ThemeId::Warm.definition(), None, 0.3), "#f5e6d3");
    }

    #[test]
    fn preview_veils_the_wallpaper() {
        let css = preview_background(ThemeId::Warm.definition(), Some("data:x"), 0.25);
        assert!(css.starts_with("linear-gradient(rgba(255, 255, 255, 0.75)"));
        assert!(css.ends_with("url('data:x')"));
    }
}
