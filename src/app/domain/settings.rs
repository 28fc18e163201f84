use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::app::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThemeMode {
    Light,
    Dark,
    SystemDefault,
}

/// Settings as stored on the backend (`GET`/`PUT /api/settings`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default = "default_remote_theme")]
    pub theme: String,

    #[serde(default)]
    pub wallpaper: String,

    #[serde(rename = "dimLevel", default = "default_dim_level")]
    pub dim_level: f64,
}

fn default_remote_theme() -> String {
    "dark".to_string()
}

fn default_dim_level() -> f64 {
    0.3
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            theme: default_remote_theme(),
            wallpaper: String::new(),
            dim_level: default_dim_level(),
        }
    }
}

/// Request body for `PUT /api/settings/change-password`.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    #[serde(rename = "currentPassword")]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// One wallpaper preset advertised by `GET /api/settings/wallpapers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallpaperPreset {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WallpaperPresets {
    #[serde(default)]
    pub presets: Vec<WallpaperPreset>,
}

impl WallpaperPreset {
    /// Built-in presets used when the server does not advertise any.
    pub fn fallback() -> Vec<Self> {
        [
            ("Eat Cat", "/uploads/wallpapers/eat%20cat.jpg"),
            ("Sleep Cat", "/uploads/wallpapers/sleep%20cat.jpg"),
            ("Tuxedo and Orange", "/uploads/wallpapers/tuxedo%20and%20orange.jpg"),
        ]
        .into_iter()
        .map(|(name, path)| Self {
            name: name.to_string(),
            path: path.to_string(),
        })
        .collect()
    }
}

/// Client-side settings. The backend copy is authoritative; this struct is
/// also cached locally so the window renders with the last-known theme while
/// the first fetch is still in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_theme_mode")]
    pub theme_mode: ThemeMode,

    #[serde(default)]
    pub wallpaper: String,

    #[serde(default = "default_dim_level")]
    pub dim_level: f64,
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Dark
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_mode: default_theme_mode(),
            wallpaper: String::new(),
            dim_level: default_dim_level(),
        }
    }
}

impl AppSettings {
    /// Resolve the effective dark/light choice.
    pub fn is_dark(&self, system_dark: bool) -> bool {
        match self.theme_mode {
            ThemeMode::Dark => true,
            ThemeMode::Light => false,
            ThemeMode::SystemDefault => system_dark,
        }
    }

    /// Merge in a freshly fetched backend copy.
    pub fn apply_remote(&mut self, remote: &RemoteSettings) {
        self.theme_mode = if remote.theme == "light" {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };
        self.wallpaper = remote.wallpaper.clone();
        self.dim_level = remote.dim_level.clamp(0.0, 0.8);
    }

    /// The payload to push to the backend. SystemDefault resolves to the
    /// currently effective theme, since the wire format only knows the two.
    pub fn to_remote(&self, system_dark: bool) -> RemoteSettings {
        RemoteSettings {
            theme: if self.is_dark(system_dark) {
                "dark".to_string()
            } else {
                "light".to_string()
            },
            wallpaper: self.wallpaper.clone(),
            dim_level: self.dim_level,
        }
    }

    /// Load the local cache, or defaults if missing/corrupt.
    pub fn load() -> Self {
        let config_path = Self::config_path();

        match fs::read_to_string(&config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Failed to parse settings cache: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(_) => {
                let default = Self::default();
                let _ = default.save();
                default
            }
        }
    }

    /// Write the local cache.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, json)?;

        Ok(())
    }

    /// Cache file path (cross-platform).
    pub fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("sharednotes");
        path.push("settings.json");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
        assert_eq!(settings.wallpaper, "");
        assert_eq!(settings.dim_level, 0.3);
    }

    #[test]
    fn test_serialize_deserialize() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let loaded: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn test_partial_cache() {
        // Old cache missing new fields falls back to per-field defaults
        let json = r#"{"wallpaper": "/uploads/wallpapers/cat.jpg"}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
        assert_eq!(settings.wallpaper, "/uploads/wallpapers/cat.jpg");
    }

    #[test]
    fn test_remote_wire_format() {
        let json = r#"{"theme":"light","wallpaper":"/x.jpg","dimLevel":0.5}"#;
        let remote: RemoteSettings = serde_json::from_str(json).unwrap();
        assert_eq!(remote.theme, "light");
        assert_eq!(remote.dim_level, 0.5);

        let back = serde_json::to_string(&remote).unwrap();
        assert!(back.contains("\"dimLevel\":0.5"));
    }

    #[test]
    fn test_remote_defaults_when_fields_missing() {
        let remote: RemoteSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(remote.theme, "dark");
        assert_eq!(remote.dim_level, 0.3);
    }

    #[test]
    fn test_apply_remote_clamps_dimming() {
        let mut settings = AppSettings::default();
        settings.apply_remote(&RemoteSettings {
            theme: "light".to_string(),
            wallpaper: "/w.jpg".to_string(),
            dim_level: 2.0,
        });
        assert_eq!(settings.theme_mode, ThemeMode::Light);
        assert_eq!(settings.dim_level, 0.8);
    }

    #[test]
    fn test_system_default_resolution() {
        let settings = AppSettings {
            theme_mode: ThemeMode::SystemDefault,
            ..Default::default()
        };
        assert!(settings.is_dark(true));
        assert!(!settings.is_dark(false));
        assert_eq!(settings.to_remote(true).theme, "dark");
        assert_eq!(settings.to_remote(false).theme, "light");
    }

    #[test]
    fn test_password_change_wire_names() {
        let body = PasswordChange {
            current_password: "old".to_string(),
            new_password: "newpass".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"currentPassword\":\"old\""));
        assert!(json.contains("\"newPassword\":\"newpass\""));
    }
}
