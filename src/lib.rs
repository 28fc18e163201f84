//! SharedNotes desktop client library.
//!
//! The binary in `main.rs` wires the FLTK event loop; everything testable
//! lives here, split into the application layer (`app`) and widgets (`ui`).

pub mod app;
pub mod ui;
