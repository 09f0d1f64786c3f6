use std::fs;
use std::path::{Path, PathBuf};

use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::config::AppConfig;
use crate::error::ThemeError;
use crate::utils::THEME_SUFFIX;

// ============================================================================
// COLORS
// ============================================================================

/// An `#RRGGBB` color. A blank string in a theme file means "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeColor(pub Option<(u8, u8, u8)>);

impl ThemeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Some((r, g, b)))
    }

    pub fn parse(text: &str) -> Result<Self, ThemeError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self(None));
        }

        let invalid = || ThemeError::InvalidColor(text.to_string());
        let hex = text.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        match self.0 {
            Some((r, g, b)) => format!("#{:02X}{:02X}{:02X}", r, g, b),
            None => String::new(),
        }
    }

    /// The terminal color, or `fallback` when unset.
    pub fn or(self, fallback: Color) -> Color {
        match self.0 {
            Some((r, g, b)) => Color::Rgb(r, g, b),
            None => fallback,
        }
    }
}

impl Serialize for ThemeColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ThemeColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        ThemeColor::parse(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// THEME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub background_color: ThemeColor,
    #[serde(default)]
    pub button_color: ThemeColor,
    #[serde(default)]
    pub button_text_color: ThemeColor,
    #[serde(default)]
    pub input_field_color: ThemeColor,
    #[serde(default)]
    pub input_field_text_color: ThemeColor,
    #[serde(default)]
    pub header_bar_color: ThemeColor,
    #[serde(default)]
    pub header_bar_text_color: ThemeColor,
    #[serde(default)]
    pub title_bar_color: ThemeColor,
    #[serde(default = "default_border_color")]
    pub border_color: ThemeColor,
    #[serde(default = "default_border_thickness")]
    pub border_thickness: u32,
}

fn default_border_color() -> ThemeColor {
    ThemeColor::rgb(0, 0, 0)
}

fn default_border_thickness() -> u32 {
    2
}

impl Theme {
    /// The stock palette.
    pub fn clickboard() -> Self {
        Self {
            name: String::from("Clickboard"),
            background_color: ThemeColor::rgb(0x24, 0x01, 0x15),
            button_color: ThemeColor::rgb(0x91, 0x3B, 0x5D),
            button_text_color: ThemeColor::rgb(0x2F, 0x13, 0x1E),
            input_field_color: ThemeColor::rgb(0x87, 0xF5, 0xFB),
            input_field_text_color: ThemeColor::rgb(0x24, 0x01, 0x15),
            header_bar_color: ThemeColor::rgb(0x2F, 0x13, 0x1E),
            header_bar_text_color: ThemeColor::rgb(0xCE, 0xC3, 0xC1),
            title_bar_color: ThemeColor::rgb(0xDE, 0x3C, 0x4B),
            border_color: default_border_color(),
            border_thickness: default_border_thickness(),
        }
    }

    /// Plain black and white, also used for the unlock prompt.
    pub fn mono() -> Self {
        let black = ThemeColor::rgb(0, 0, 0);
        let white = ThemeColor::rgb(0xFF, 0xFF, 0xFF);
        Self {
            name: String::from("Mono"),
            background_color: black,
            button_color: black,
            button_text_color: white,
            input_field_color: black,
            input_field_text_color: white,
            header_bar_color: black,
            header_bar_text_color: white,
            title_bar_color: black,
            border_color: white,
            border_thickness: 1,
        }
    }

    pub fn builtin() -> Vec<Theme> {
        vec![Self::clickboard(), Self::mono()]
    }

    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let json = fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ThemeError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ============================================================================
// THEME STORE
// ============================================================================

/// Built-in themes plus any `*.theme.json` files in the data directory,
/// with the current choice remembered in `selected.theme`.
pub struct ThemeStore {
    dir: PathBuf,
    selected_path: PathBuf,
}

impl ThemeStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            dir: config.data_dir.clone(),
            selected_path: config.selected_theme_path(),
        }
    }

    /// All usable themes. Unreadable theme files are skipped with a warning.
    pub fn list(&self) -> Vec<Theme> {
        let mut themes = Theme::builtin();

        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)
            .map(|rd| {
                rd.filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| {
                        p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.ends_with(THEME_SUFFIX))
                    })
                    .collect()
            })
            .unwrap_or_default();
        files.sort();

        for path in files {
            match Theme::from_file(&path) {
                Ok(theme) => match themes.iter_mut().find(|t| t.name == theme.name) {
                    Some(existing) => *existing = theme,
                    None => themes.push(theme),
                },
                Err(err) => warn!(error = %err, "skipping theme file"),
            }
        }

        themes
    }

    pub fn selected_name(&self) -> Option<String> {
        fs::read_to_string(&self.selected_path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// The selected theme, or the stock one if nothing valid is selected.
    pub fn selected(&self) -> Theme {
        let themes = self.list();
        self.selected_name()
            .and_then(|name| themes.iter().find(|t| t.name == name).cloned())
            .unwrap_or_else(Theme::clickboard)
    }

    pub fn select(&self, name: &str) -> Result<(), ThemeError> {
        fs::write(&self.selected_path, name).map_err(|source| ThemeError::Io {
            path: self.selected_path.clone(),
            source,
        })
    }

    /// Select the theme after `current` in list order and return it.
    pub fn cycle(&self, current: &str) -> Result<Theme, ThemeError> {
        let themes = self.list();
        let next = themes
            .iter()
            .position(|t| t.name == current)
            .map(|i| (i + 1) % themes.len())
            .unwrap_or(0);
        let theme = themes[next].clone();
        self.select(&theme.name)?;
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_theme(store: &ThemeStore, theme: &Theme) {
        let file_name = format!("{}{}", theme.name.to_lowercase(), THEME_SUFFIX);
        let json = serde_json::to_string_pretty(theme).unwrap();
        fs::write(store.dir.join(file_name), json).unwrap();
    }

    fn themes() -> (tempfile::TempDir, ThemeStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(&AppConfig::new(dir.path()));
        (dir, store)
    }

    #[test]
    fn color_parses_hex_and_blank() {
        assert_eq!(ThemeColor::parse("#de3c4b").unwrap(), ThemeColor::rgb(0xDE, 0x3C, 0x4B));
        assert_eq!(ThemeColor::parse("").unwrap(), ThemeColor(None));
        assert!(ThemeColor::parse("de3c4b").is_err());
        assert!(ThemeColor::parse("#12345").is_err());
        assert_eq!(ThemeColor::rgb(1, 2, 255).to_hex(), "#0102FF");
    }

    #[test]
    fn theme_file_uses_defaults_for_missing_fields() {
        let json = r##"{ "Name": "Night", "ButtonColor": "#101010", "TitleBarColor": "" }"##;
        let theme: Theme = serde_json::from_str(json).unwrap();
        assert_eq!(theme.button_color, ThemeColor::rgb(0x10, 0x10, 0x10));
        assert_eq!(theme.title_bar_color, ThemeColor(None));
        assert_eq!(theme.border_color, ThemeColor::rgb(0, 0, 0));
        assert_eq!(theme.border_thickness, 2);
    }

    #[test]
    fn missing_selection_falls_back_to_stock() {
        let (_dir, store) = themes();
        assert_eq!(store.selected().name, "Clickboard");
        store.select("Does Not Exist").unwrap();
        assert_eq!(store.selected().name, "Clickboard");
    }

    #[test]
    fn custom_theme_files_are_listed_and_selectable() {
        let (dir, store) = themes();
        let mut ocean = Theme::mono();
        ocean.name = String::from("Ocean");
        ocean.button_color = ThemeColor::rgb(0, 0x55, 0xAA);
        write_theme(&store, &ocean);
        fs::write(dir.path().join("broken.theme.json"), "{").unwrap();

        let names: Vec<_> = store.list().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["Clickboard", "Mono", "Ocean"]);

        store.select("Ocean").unwrap();
        assert_eq!(store.selected(), ocean);
    }

    #[test]
    fn cycle_wraps_around() {
        let (_dir, store) = themes();
        assert_eq!(store.cycle("Clickboard").unwrap().name, "Mono");
        assert_eq!(store.cycle("Mono").unwrap().name, "Clickboard");
        assert_eq!(store.selected_name().as_deref(), Some("Clickboard"));
    }
}
