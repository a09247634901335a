use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PreferenceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    Warm,
    Dark,
}

impl ThemeId {
    pub const FALLBACK: ThemeId = ThemeId::Warm;

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Warm => "warm",
            ThemeId::Dark => "dark",
        }
    }

    pub fn definition(self) -> &'static ThemeDefinition {
        // THEMES is ordered by variant
        &THEMES[self as usize]
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warm" => Ok(ThemeId::Warm),
            "dark" => Ok(ThemeId::Dark),
            other => Err(PreferenceError::InvalidTheme(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub accent: &'static str,
    pub dark: &'static str,
    /// Page background shown when no wallpaper is set.
    pub base_background: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ThemeDefinition {
    pub id: ThemeId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub colors: Palette,
}

pub static THEMES: [ThemeDefinition; 2] = [
    ThemeDefinition {
        id: ThemeId::Warm,
        name: "Warm/Golden Mode",
        description: "Suave design with warm tones",
        icon: "☀️",
        colors: Palette {
            primary: "#F97316",
            accent: "#F59E0B",
            dark: "#EA580C",
            base_background: "#f5e6d3",
        },
    },
    ThemeDefinition {
        id: ThemeId::Dark,
        name: "Dark Cyan Mode",
        description: "Modern dark theme with cyan accents",
        icon: "🌙",
        colors: Palette {
            primary: "#06B6D4",
            accent: "#14B8A6",
            dark: "#0891B2",
            base_background: "#1a1f3a",
        },
    },
];
