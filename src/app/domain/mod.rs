pub mod document;
pub mod note;
pub mod settings;

pub use document::{Block, FormattedDocument, InlineRun, InlineStyle, ListItem};
pub use note::{Note, NoteDraft};
pub use settings::{AppSettings, RemoteSettings, ThemeMode, WallpaperPreset};
