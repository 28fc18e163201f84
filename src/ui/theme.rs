use fltk::{enums::Color, prelude::*, window::Window};

/// Widget palette for one theme, with the dim level already folded into the
/// background shades.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub window_bg: Color,
    pub panel_bg: Color,
    pub field_bg: Color,
    pub text: Color,
    pub muted_text: Color,
    pub accent: Color,
    pub selection: Color,
}

/// Build the palette. `dim_level` (0.0..=0.8) darkens the backgrounds the
/// same way the wallpaper dimmer does on the web client.
pub fn palette(is_dark: bool, dim_level: f64) -> Palette {
    let dim = dim_level.clamp(0.0, 0.8);
    if is_dark {
        Palette {
            window_bg: dimmed(25, 25, 32, dim),
            panel_bg: dimmed(35, 35, 44, dim),
            field_bg: dimmed(30, 30, 38, dim),
            text: Color::from_rgb(220, 220, 225),
            muted_text: Color::from_rgb(150, 150, 160),
            accent: Color::from_rgb(98, 140, 255),
            selection: Color::from_rgb(70, 70, 110),
        }
    } else {
        Palette {
            window_bg: dimmed(243, 243, 246, dim),
            panel_bg: dimmed(255, 255, 255, dim),
            field_bg: dimmed(255, 255, 255, dim),
            text: Color::from_rgb(20, 20, 25),
            muted_text: Color::from_rgb(110, 110, 120),
            accent: Color::from_rgb(40, 90, 220),
            selection: Color::from_rgb(173, 216, 230),
        }
    }
}

fn dimmed(r: u8, g: u8, b: u8, dim: f64) -> Color {
    let f = 1.0 - dim * 0.6;
    Color::from_rgb(
        (r as f64 * f) as u8,
        (g as f64 * f) as u8,
        (b as f64 * f) as u8,
    )
}

/// Set Windows title bar theme (Windows 10 build 1809+)
/// Must be called AFTER window.show() to have a valid HWND
#[cfg(target_os = "windows")]
pub fn set_windows_titlebar_theme(window: &Window, is_dark: bool) {
    use std::mem::size_of;
    use std::ptr::from_ref;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWINDOWATTRIBUTE};

    let hwnd = HWND(window.raw_handle() as *mut std::ffi::c_void);
    let on: i32 = if is_dark { 1 } else { 0 };

    // 20 is DWMWA_USE_IMMERSIVE_DARK_MODE on Win11 / Win10 2004+,
    // 19 is the pre-2004 equivalent; try both
    for attr in [20, 19] {
        unsafe {
            let _ = DwmSetWindowAttribute(
                hwnd,
                DWMWINDOWATTRIBUTE(attr),
                from_ref(&on).cast(),
                size_of::<i32>() as u32,
            );
        }
    }
}

#[cfg(not(target_os = "windows"))]
pub fn set_windows_titlebar_theme(_window: &Window, _is_dark: bool) {}
