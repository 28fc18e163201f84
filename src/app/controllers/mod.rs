pub mod editor;
pub mod notes;
pub mod saves;

pub use editor::{BlockStyle, Caret, EditorSession, FormatState, LineKind, LineRef};
pub use notes::{NoteList, Section};
pub use saves::SaveGuard;
