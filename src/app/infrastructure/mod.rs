pub mod platform;

pub use platform::detect_system_dark_mode;
