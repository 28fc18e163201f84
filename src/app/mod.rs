//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (documents, notes, settings)
//! - `controllers/` - Orchestration (editor session, note list)
//! - `services/` - Business operations (converters, API client)
//! - `infrastructure/` - External integrations (platform detection)
//! - `state.rs` - Main application coordinator

pub mod controllers;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod messages;
pub mod services;
pub mod session;
pub mod state;

// Re-exports for convenient external access
pub use controllers::{EditorSession, NoteList};
pub use domain::{AppSettings, FormattedDocument, Note, ThemeMode};
pub use error::{AppError, Result};
pub use infrastructure::detect_system_dark_mode;
pub use messages::Message;
pub use services::ApiClient;
