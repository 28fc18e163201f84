//! OS theme detection, used when the theme preference is System Default.

pub fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "windows")]
    if let Some(dark) = windows_dark_mode() {
        return dark;
    }

    #[cfg(target_os = "linux")]
    if let Some(dark) = gnome_dark_mode() {
        return dark;
    }

    #[cfg(target_os = "macos")]
    if let Some(dark) = macos_dark_mode() {
        return dark;
    }

    // Light when detection fails
    false
}

#[cfg(target_os = "windows")]
fn windows_dark_mode() -> Option<bool> {
    use winreg::enums::HKEY_CURRENT_USER;
    use winreg::RegKey;

    let key = RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize")
        .ok()?;
    // AppsUseLightTheme: 0 = dark mode, 1 = light mode
    let value: u32 = key.get_value("AppsUseLightTheme").ok()?;
    Some(value == 0)
}

#[cfg(target_os = "linux")]
fn gnome_dark_mode() -> Option<bool> {
    use std::process::Command;

    let scheme = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
        .ok()?;
    let scheme = String::from_utf8_lossy(&scheme.stdout);
    if scheme.contains("prefer-dark") {
        return Some(true);
    }

    let theme = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "gtk-theme"])
        .output()
        .ok()?;
    Some(String::from_utf8_lossy(&theme.stdout).to_lowercase().contains("dark"))
}

#[cfg(target_os = "macos")]
fn macos_dark_mode() -> Option<bool> {
    use std::process::Command;

    let output = Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .ok()?;
    if !output.status.success() {
        return Some(false);
    }
    Some(String::from_utf8_lossy(&output.stdout).to_lowercase().contains("dark"))
}
