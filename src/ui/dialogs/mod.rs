pub mod settings_dialog;

use fltk::{app, prelude::*, window::Window};

/// Pump events until the dialog window closes. Forces the dialog shut when
/// the program is quitting underneath it, so the loop cannot outlive the app.
pub fn run_dialog(dialog: &Window) {
    let mut dialog = dialog.clone();
    while dialog.shown() {
        app::wait();
        if app::should_program_quit() {
            dialog.hide();
        }
    }
}
