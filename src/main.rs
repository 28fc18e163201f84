#![cfg_attr(all(target_os = "windows", not(debug_assertions)), windows_subsystem = "windows")]

use fltk::{app, prelude::*};

use shared_notes::app::messages::Message;
use shared_notes::app::state::AppState;
use shared_notes::ui::main_window::build_main_window;

fn main() {
    let fltk_app = app::App::default().with_scheme(app::Scheme::Gtk);
    let (sender, receiver) = app::channel::<Message>();

    let mut widgets = build_main_window(&sender);
    widgets.wind.show();

    let mut state = AppState::new(widgets, sender);
    state.restore_session();

    while fltk_app.wait() {
        let Some(message) = receiver.recv() else {
            continue;
        };
        match message {
            // Auth
            Message::SubmitLogin { password } => state.submit_login(password),
            Message::LoginSucceeded { token } => state.login_succeeded(token),
            Message::LoginFailed(message) => state.login_failed(message),
            Message::Logout => state.logout(),
            Message::SessionExpired => state.session_expired(),

            // Note list
            Message::RefreshNotes => state.refresh_notes(),
            Message::NotesFetched { pinned, all } => state.notes_fetched(pinned, all),
            Message::SearchChanged(query) => state.search_changed(query),
            Message::NewNote => state.new_note(),
            Message::OpenNote(id) => state.open_note(id),
            Message::NoteLoaded(note) => state.note_loaded(note),
            Message::DeleteNote(id) => state.delete_note(id),
            Message::NoteDeleted(id) => state.note_deleted(id),
            Message::ToggleSection(section) => state.toggle_section(section),

            // Editor
            Message::SaveNote => state.save_note(),
            Message::NoteSaved(note) => state.note_saved(note),
            Message::SaveFailed(message) => state.save_failed(message),
            Message::CloseEditor => state.close_editor(),
            Message::SweepListItems => state.sweep_list_items(),

            // Settings
            Message::OpenSettings => state.open_settings(),
            Message::SettingsFetched(remote) => state.settings_fetched(remote),
            Message::WallpapersFetched(presets) => state.wallpapers_fetched(presets.presets),
            Message::ChangePassword { current, new } => state.change_password(current, new),
            Message::PasswordChanged => state.password_changed(),

            Message::RequestFailed(message) => state.request_failed(message),
        }
    }
}
