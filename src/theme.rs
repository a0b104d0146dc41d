use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use ratatui::style::Color;
use tracing::{debug, info, warn};

use crate::domain::TVError;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon of the toggle: a moon invites to switch to dark, a sun back to light.
    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "☾",
            Theme::Dark => "☀",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: Color::Reset,
                foreground: Color::Reset,
                header_background: Color::Blue,
                header_foreground: Color::White,
                table_background: Color::Reset,
                border: Color::DarkGray,
                highlight: Color::LightBlue,
                accent: Color::Yellow,
            },
            Theme::Dark => Palette {
                background: Color::Rgb(0x1a, 0x1a, 0x2e),
                foreground: Color::Rgb(0xe6, 0xe6, 0xe6),
                header_background: Color::Rgb(0x16, 0x21, 0x3e),
                header_foreground: Color::Rgb(0xe6, 0xe6, 0xe6),
                table_background: Color::Rgb(0x0f, 0x34, 0x60),
                border: Color::Rgb(0x1a, 0x1a, 0x2e),
                highlight: Color::Rgb(0x53, 0x34, 0x83),
                accent: Color::Rgb(0xf3, 0x9c, 0x12),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub header_background: Color,
    pub header_foreground: Color,
    pub table_background: Color,
    pub border: Color,
    pub highlight: Color,
    pub accent: Color,
}

/// Small persistent key-value store.
pub trait ThemeStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), TVError>;
}

/// Key-value pairs kept as one JSON object in a file.
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: PathBuf) -> Result<Self, TVError> {
        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened state file {:?} with {} keys", path, values.len());
        Ok(Self { path, values })
    }
}

impl ThemeStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), TVError> {
        self.values.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Owns the active theme and keeps it in sync with the store.
pub struct ThemeManager {
    store: Box<dyn ThemeStore>,
    theme: Theme,
}

impl ThemeManager {
    /// Read the saved theme; anything missing or unknown means light.
    pub fn init(store: Box<dyn ThemeStore>) -> Self {
        let theme = store
            .get(THEME_KEY)
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default();
        info!("Theme at startup: {}", theme.as_str());
        Self { store, theme }
    }

    pub fn get(&self) -> Theme {
        self.theme
    }

    pub fn set(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            warn!("Could not persist theme {}: {e}", theme.as_str());
        }
    }

    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled());
        self.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStore {
        values: Rc<RefCell<HashMap<String, String>>>,
        fail: bool,
    }

    impl ThemeStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), TVError> {
            if self.fail {
                return Err(TVError::PermissionDenied);
            }
            self.values.borrow_mut().insert(key.into(), value.into());
            Ok(())
        }
    }

    #[test]
    fn defaults_to_light() {
        let manager = ThemeManager::init(Box::new(MemoryStore::default()));
        assert_eq!(manager.get(), Theme::Light);
    }

    #[test]
    fn unknown_saved_value_means_light() {
        let store = MemoryStore::default();
        store.values.borrow_mut().insert(THEME_KEY.into(), "purple".into());
        assert_eq!(ThemeManager::init(Box::new(store)).get(), Theme::Light);
    }

    #[test]
    fn toggle_persists_the_new_theme() {
        let store = MemoryStore::default();
        let mut manager = ThemeManager::init(Box::new(store.clone()));
        assert_eq!(manager.toggle(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(manager.toggle(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));

        manager.set(Theme::Dark);
        let reloaded = ThemeManager::init(Box::new(store));
        assert_eq!(reloaded.get(), Theme::Dark);
    }

    #[test]
    fn failing_store_still_switches_theme() {
        let store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let mut manager = ThemeManager::init(Box::new(store));
        assert_eq!(manager.toggle(), Theme::Dark);
    }

    #[test]
    fn icons_follow_theme() {
        assert_eq!(Theme::Light.icon(), "☾");
        assert_eq!(Theme::Dark.icon(), "☀");
    }

    #[test]
    fn json_store_round_trip() {
        let path = std::env::temp_dir().join(format!("ctv_state_{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::open(path.clone()).unwrap();
        assert_eq!(store.get(THEME_KEY), None);
        store.set(THEME_KEY, "dark").unwrap();

        let reopened = JsonFileStore::open(path.clone()).unwrap();
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("dark"));
        fs::remove_file(&path).unwrap();
    }
}
