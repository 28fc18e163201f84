//! Main application coordinator. Owns the API client, the cached settings,
//! and the note list, and drives the views. Every server call runs on a
//! worker thread and reports back through the FLTK channel; the dispatch
//! loop in main routes the resulting messages into the methods here.

use std::thread;

use fltk::{app::Sender, dialog};

use crate::app::controllers::{NoteList, SaveGuard, Section};
use crate::app::domain::note::Note;
use crate::app::domain::settings::{
    AppSettings, RemoteSettings, WallpaperPreset, WallpaperPresets,
};
use crate::app::error::AppError;
use crate::app::infrastructure::detect_system_dark_mode;
use crate::app::messages::Message;
use crate::app::services::ApiClient;
use crate::app::session;
use crate::ui::dialogs::settings_dialog::show_settings_dialog;
use crate::ui::main_window::{MainWidgets, View};
use crate::ui::theme::set_windows_titlebar_theme;

pub struct AppState {
    pub widgets: MainWidgets,
    pub sender: Sender<Message>,
    api: ApiClient,
    settings: AppSettings,
    notes: NoteList,
    dark_mode: bool,
    wallpaper_presets: Vec<WallpaperPreset>,
    /// At most one save request is in flight; a save issued meanwhile is
    /// queued and re-sent when the current one completes.
    saves: SaveGuard,
}

fn failure_message(err: AppError) -> Message {
    if err.is_auth_failure() {
        Message::SessionExpired
    } else {
        Message::RequestFailed(err.to_string())
    }
}

impl AppState {
    pub fn new(mut widgets: MainWidgets, sender: Sender<Message>) -> Self {
        let settings = AppSettings::load();
        let dark_mode = settings.is_dark(detect_system_dark_mode());
        widgets.apply_theme(dark_mode, settings.dim_level);

        Self {
            widgets,
            sender,
            api: ApiClient::from_env(),
            settings,
            notes: NoteList::default(),
            dark_mode,
            wallpaper_presets: Vec::new(),
            saves: SaveGuard::default(),
        }
    }

    /// Pick the starting view from the stored session, if any.
    pub fn restore_session(&mut self) {
        match session::load_session() {
            Some(token) => {
                self.api.set_token(Some(token));
                self.widgets.show_view(View::Notes);
                self.refresh_notes();
                self.fetch_remote_settings();
            }
            None => self.widgets.show_view(View::Login),
        }
    }

    // --- Auth ---

    pub fn submit_login(&mut self, password: String) {
        if password.is_empty() {
            self.widgets.login.set_status("A password is required");
            return;
        }
        self.widgets.login.set_busy(true);
        let mut api = self.api.clone();
        let sender = self.sender;
        thread::spawn(move || match api.login(&password) {
            Ok(token) => sender.send(Message::LoginSucceeded { token }),
            Err(err) => sender.send(Message::LoginFailed(err.to_string())),
        });
    }

    pub fn login_succeeded(&mut self, token: String) {
        if let Err(err) = session::save_session(&token) {
            eprintln!("Failed to persist session: {}", err);
        }
        self.api.set_token(Some(token));
        self.widgets.login.reset();
        self.widgets.show_view(View::Notes);
        self.refresh_notes();
        self.fetch_remote_settings();
    }

    pub fn login_failed(&mut self, message: String) {
        self.widgets.login.set_busy(false);
        self.widgets.login.set_status(&message);
    }

    pub fn logout(&mut self) {
        session::clear_session();
        self.api.set_token(None);
        self.saves.reset();
        self.notes = NoteList::default();
        self.widgets.notes.clear_search();
        self.widgets.login.reset();
        self.widgets.show_view(View::Login);
    }

    /// The server stopped accepting our token (401).
    pub fn session_expired(&mut self) {
        self.logout();
        self.widgets.login.set_status("Session expired. Please login again.");
    }

    // --- Notes ---

    pub fn refresh_notes(&mut self) {
        let api = self.api.clone();
        let sender = self.sender;
        thread::spawn(move || {
            let result = api
                .pinned_notes()
                .and_then(|pinned| api.notes().map(|all| (pinned, all)));
            match result {
                Ok((pinned, all)) => sender.send(Message::NotesFetched { pinned, all }),
                Err(err) => sender.send(failure_message(err)),
            }
        });
    }

    pub fn notes_fetched(&mut self, pinned: Vec<Note>, all: Vec<Note>) {
        self.notes.replace(pinned, all);
        self.widgets.notes.render(&self.notes);
    }

    pub fn search_changed(&mut self, query: String) {
        self.notes.set_query(&query);
        self.widgets.notes.render(&self.notes);
    }

    pub fn new_note(&mut self) {
        self.widgets.editor.open(None);
        self.widgets.show_view(View::Editor);
    }

    pub fn open_note(&mut self, id: String) {
        let api = self.api.clone();
        let sender = self.sender;
        thread::spawn(move || match api.note(&id) {
            Ok(note) => sender.send(Message::NoteLoaded(note)),
            Err(err) => sender.send(failure_message(err)),
        });
    }

    pub fn note_loaded(&mut self, note: Note) {
        self.widgets.editor.open(Some(&note));
        self.widgets.show_view(View::Editor);
    }

    pub fn delete_note(&mut self, id: String) {
        let title = self
            .notes
            .get(&id)
            .map(|n| n.title.clone())
            .unwrap_or_default();
        let choice = dialog::choice2_default(
            &format!("Delete \"{}\"?", title),
            "Delete",
            "Cancel",
            "",
        );
        if choice != Some(0) {
            return;
        }
        let api = self.api.clone();
        let sender = self.sender;
        thread::spawn(move || match api.delete_note(&id) {
            Ok(()) => sender.send(Message::NoteDeleted(id)),
            Err(err) => sender.send(failure_message(err)),
        });
    }

    pub fn note_deleted(&mut self, id: String) {
        self.notes.remove(&id);
        self.widgets.notes.render(&self.notes);
    }

    pub fn toggle_section(&mut self, section: Section) {
        self.widgets.notes.toggle_section(section);
        self.widgets.notes.render(&self.notes);
    }

    // --- Editor ---

    pub fn save_note(&mut self) {
        let Some(draft) = self.widgets.editor.draft() else {
            self.widgets.editor.set_status("A title is required");
            return;
        };
        if !self.saves.begin() {
            return;
        }
        self.widgets.editor.set_status("Saving...");

        let id = self.widgets.editor.note_id();
        let api = self.api.clone();
        let sender = self.sender;
        thread::spawn(move || {
            let result = match &id {
                Some(id) => api.update_note(id, &draft),
                None => api.create_note(&draft),
            };
            match result {
                Ok(note) => sender.send(Message::NoteSaved(note)),
                Err(err) if err.is_auth_failure() => sender.send(Message::SessionExpired),
                Err(err) => sender.send(Message::SaveFailed(err.to_string())),
            }
        });
    }

    pub fn note_saved(&mut self, note: Note) {
        self.widgets.editor.mark_saved(&note);
        self.refresh_notes();
        if self.saves.finish() {
            self.save_note();
        }
    }

    pub fn save_failed(&mut self, message: String) {
        self.saves.fail();
        self.widgets.editor.set_status("Save failed");
        dialog::alert_default(&message);
    }

    pub fn close_editor(&mut self) {
        if self.widgets.editor.is_dirty() {
            let choice = dialog::choice2_default(
                "You have unsaved changes.",
                "Save",
                "Discard",
                "Cancel",
            );
            match choice {
                Some(0) => {
                    self.save_note();
                    return;
                }
                Some(1) => {}
                _ => return,
            }
        }
        self.widgets.show_view(View::Notes);
        self.refresh_notes();
    }

    pub fn sweep_list_items(&mut self) {
        self.widgets.editor.sweep();
    }

    // --- Settings ---

    fn fetch_remote_settings(&mut self) {
        let api = self.api.clone();
        let sender = self.sender;
        thread::spawn(move || {
            match api.settings() {
                Ok(settings) => sender.send(Message::SettingsFetched(settings)),
                Err(err) => sender.send(failure_message(err)),
            }
            match api.wallpaper_presets() {
                Ok(presets) if !presets.presets.is_empty() => {
                    sender.send(Message::WallpapersFetched(presets));
                }
                _ => sender.send(Message::WallpapersFetched(WallpaperPresets {
                    presets: WallpaperPreset::fallback(),
                })),
            }
        });
    }

    pub fn settings_fetched(&mut self, remote: RemoteSettings) {
        self.settings.apply_remote(&remote);
        let _ = self.settings.save();
        self.apply_theme();
    }

    pub fn wallpapers_fetched(&mut self, presets: Vec<WallpaperPreset>) {
        self.wallpaper_presets = presets;
    }

    pub fn open_settings(&mut self) {
        if let Some(new_settings) =
            show_settings_dialog(&self.settings, &self.wallpaper_presets, &self.sender)
        {
            self.settings = new_settings;
            let _ = self.settings.save();
            self.apply_theme();

            let payload = self.settings.to_remote(detect_system_dark_mode());
            let api = self.api.clone();
            let sender = self.sender;
            thread::spawn(move || {
                if let Err(err) = api.update_settings(&payload) {
                    sender.send(failure_message(err));
                }
            });
        }
    }

    pub fn change_password(&mut self, current: String, new: String) {
        let api = self.api.clone();
        let sender = self.sender;
        thread::spawn(move || {
            let change = crate::app::domain::settings::PasswordChange {
                current_password: current,
                new_password: new,
            };
            match api.change_password(&change) {
                Ok(()) => sender.send(Message::PasswordChanged),
                Err(err) => sender.send(failure_message(err)),
            }
        });
    }

    pub fn password_changed(&mut self) {
        // The old token is invalid server-side once the password changes
        dialog::message_default("Password changed. Please login again.");
        self.logout();
    }

    // --- Misc ---

    pub fn request_failed(&mut self, message: String) {
        // Fetch failures only report; the save guard is released by
        // NoteSaved/SaveFailed so a retry cannot start a second save.
        dialog::alert_default(&message);
    }

    fn apply_theme(&mut self) {
        self.dark_mode = self.settings.is_dark(detect_system_dark_mode());
        self.widgets.apply_theme(self.dark_mode, self.settings.dim_level);
        set_windows_titlebar_theme(&self.widgets.wind, self.dark_mode);
    }
}
