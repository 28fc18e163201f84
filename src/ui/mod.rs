pub mod dialogs;
pub mod editor_view;
pub mod login_view;
pub mod main_window;
pub mod notes_view;
pub mod theme;
