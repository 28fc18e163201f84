use crate::app::controllers::Section;
use crate::app::domain::note::Note;
use crate::app::domain::settings::{RemoteSettings, WallpaperPresets};

/// All messages that can be sent through the FLTK channel.
/// UI callbacks and worker threads send these; the dispatch loop in main
/// handles them on the UI thread.
#[derive(Debug, Clone)]
pub enum Message {
    // Auth
    SubmitLogin { password: String },
    LoginSucceeded { token: String },
    LoginFailed(String),
    Logout,
    /// The server rejected the stored token; drop it and show the login view.
    SessionExpired,

    // Note list
    RefreshNotes,
    NotesFetched { pinned: Vec<Note>, all: Vec<Note> },
    SearchChanged(String),
    NewNote,
    OpenNote(String),
    NoteLoaded(Note),
    DeleteNote(String),
    NoteDeleted(String),
    /// Collapse or expand a section under its header row.
    ToggleSection(Section),

    // Editor
    SaveNote,
    NoteSaved(Note),
    /// The save request itself failed; releases the save guard.
    SaveFailed(String),
    CloseEditor,
    /// Deferred empty-list-item cleanup, posted from the Enter handler.
    SweepListItems,

    // Settings
    OpenSettings,
    SettingsFetched(RemoteSettings),
    WallpapersFetched(WallpaperPresets),
    ChangePassword { current: String, new: String },
    PasswordChanged,

    // Errors from worker threads that only need a dialog
    RequestFailed(String),
}
