use fltk::{
    app::Sender,
    button::{Button, RadioRoundButton},
    enums::{Align, Color},
    frame::Frame,
    group::Group,
    input::SecretInput,
    menu::Choice,
    prelude::*,
    valuator::HorValueSlider,
    window::Window,
};
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::domain::settings::{AppSettings, ThemeMode, WallpaperPreset};
use crate::app::messages::Message;

const MIN_PASSWORD_LEN: usize = 6;

/// Show the settings dialog and return updated settings if the user clicked
/// Save. Password changes are sent through the channel immediately, since
/// they hit the server independently of the settings payload.
pub fn show_settings_dialog(
    current_settings: &AppSettings,
    presets: &[WallpaperPreset],
    sender: &Sender<Message>,
) -> Option<AppSettings> {
    let mut dialog = Window::default()
        .with_size(350, 560)
        .with_label("Settings")
        .center_screen();
    dialog.make_modal(true);

    let body = Group::default().with_size(320, 490).with_pos(15, 15);

    // Theme section
    Frame::default()
        .with_pos(15, 15)
        .with_size(320, 25)
        .with_label("Theme:")
        .with_align(Align::Left | Align::Inside);
    let theme_group = Group::default().with_pos(30, 45).with_size(280, 75);
    let mut theme_light = RadioRoundButton::default()
        .with_pos(30, 45)
        .with_size(280, 25)
        .with_label("Light");
    let mut theme_dark = RadioRoundButton::default()
        .with_pos(30, 70)
        .with_size(280, 25)
        .with_label("Dark");
    let mut theme_system = RadioRoundButton::default()
        .with_pos(30, 95)
        .with_size(280, 25)
        .with_label("System Default");
    theme_group.end();

    match current_settings.theme_mode {
        ThemeMode::Light => theme_light.set_value(true),
        ThemeMode::Dark => theme_dark.set_value(true),
        ThemeMode::SystemDefault => theme_system.set_value(true),
    }

    // Wallpaper section
    Frame::default()
        .with_pos(15, 130)
        .with_size(320, 25)
        .with_label("Wallpaper:")
        .with_align(Align::Left | Align::Inside);
    let mut wallpaper_choice = Choice::default().with_pos(30, 155).with_size(280, 25);
    wallpaper_choice.add_choice("None");
    for preset in presets {
        wallpaper_choice.add_choice(&preset.name);
    }
    let selected = presets
        .iter()
        .position(|p| p.path == current_settings.wallpaper)
        .map(|i| i as i32 + 1)
        .unwrap_or(0);
    wallpaper_choice.set_value(selected);

    Frame::default()
        .with_pos(15, 190)
        .with_size(320, 25)
        .with_label("Wallpaper dimming:")
        .with_align(Align::Left | Align::Inside);
    let mut dim_slider = HorValueSlider::default().with_pos(30, 220).with_size(280, 25);
    dim_slider.set_bounds(0.0, 0.8);
    dim_slider.set_step(0.1, 1);
    dim_slider.set_value(current_settings.dim_level);

    // Password section
    Frame::default()
        .with_pos(15, 265)
        .with_size(320, 25)
        .with_label("Change password:")
        .with_align(Align::Left | Align::Inside);
    let mut current_password = SecretInput::new(140, 295, 170, 25, "Current");
    current_password.set_align(Align::Left);
    let mut new_password = SecretInput::new(140, 325, 170, 25, "New");
    new_password.set_align(Align::Left);
    let mut confirm_password = SecretInput::new(140, 355, 170, 25, "Confirm");
    confirm_password.set_align(Align::Left);

    let mut password_status = Frame::default().with_pos(30, 385).with_size(280, 25);
    password_status.set_label_size(11);
    password_status.set_label_color(Color::from_rgb(180, 70, 70));
    password_status.set_align(Align::Left | Align::Inside);

    let mut change_btn = Button::default()
        .with_pos(30, 415)
        .with_size(160, 28)
        .with_label("Change Password");

    body.end();

    // Buttons at bottom
    let mut save_btn = Button::default()
        .with_pos(150, 515)
        .with_size(90, 30)
        .with_label("Save");
    let mut cancel_btn = Button::default()
        .with_pos(250, 515)
        .with_size(90, 30)
        .with_label("Cancel");

    dialog.end();
    dialog.show();

    {
        let sender = *sender;
        let current_password = current_password.clone();
        let new_password = new_password.clone();
        let confirm_password = confirm_password.clone();
        let mut password_status = password_status.clone();
        change_btn.set_callback(move |_| {
            match validate_password_change(
                &current_password.value(),
                &new_password.value(),
                &confirm_password.value(),
            ) {
                Ok(()) => {
                    password_status.set_label("");
                    sender.send(Message::ChangePassword {
                        current: current_password.value(),
                        new: new_password.value(),
                    });
                }
                Err(message) => password_status.set_label(message),
            }
        });
    }

    let result = Rc::new(RefCell::new(None));

    let result_save = result.clone();
    let dialog_save = dialog.clone();
    let presets_save = presets.to_vec();
    save_btn.set_callback(move |_| {
        let wallpaper = match wallpaper_choice.value() {
            i if i >= 1 => presets_save
                .get(i as usize - 1)
                .map(|p| p.path.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        let new_settings = AppSettings {
            theme_mode: if theme_light.value() {
                ThemeMode::Light
            } else if theme_system.value() {
                ThemeMode::SystemDefault
            } else {
                ThemeMode::Dark
            },
            wallpaper,
            dim_level: dim_slider.value().clamp(0.0, 0.8),
        };
        *result_save.borrow_mut() = Some(new_settings);
        dialog_save.clone().hide();
    });

    let dialog_cancel = dialog.clone();
    cancel_btn.set_callback(move |_| {
        dialog_cancel.clone().hide();
    });

    dialog.set_callback(|w| w.hide());

    super::run_dialog(&dialog);

    result.borrow().clone()
}

/// The rules the server also enforces; failing early keeps the round trip
/// for the common typos.
fn validate_password_change(
    current: &str,
    new: &str,
    confirm: &str,
) -> std::result::Result<(), &'static str> {
    if current.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err("All password fields are required");
    }
    if new != confirm {
        return Err("New passwords do not match");
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err("New password must be at least 6 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_required() {
        assert!(validate_password_change("", "secret1", "secret1").is_err());
        assert!(validate_password_change("old", "", "secret1").is_err());
        assert!(validate_password_change("old", "secret1", "").is_err());
    }

    #[test]
    fn test_mismatch_rejected() {
        assert_eq!(
            validate_password_change("old", "secret1", "secret2"),
            Err("New passwords do not match")
        );
    }

    #[test]
    fn test_minimum_length() {
        assert!(validate_password_change("old", "abc", "abc").is_err());
        assert!(validate_password_change("old", "abcdef", "abcdef").is_ok());
    }
}
