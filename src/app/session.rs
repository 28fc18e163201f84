//! Persisted login session: a single bearer token with its save timestamp,
//! stored under the platform data directory. Tokens older than the expiry
//! window are discarded on load so a stale credential never reaches the
//! server.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    /// Unix seconds at save time.
    pub saved_at: u64,
}

/// Returns the session directory path: data_dir/sharednotes/
pub fn session_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sharednotes");
    path
}

fn session_file() -> PathBuf {
    session_dir().join("session.json")
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Persist the token after a successful login.
pub fn save_session(token: &str) -> std::io::Result<()> {
    save_session_to(&session_file(), token, now_secs())
}

fn save_session_to(path: &Path, token: &str, saved_at: u64) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let session = StoredSession {
        token: token.to_string(),
        saved_at,
    };
    let json = serde_json::to_string_pretty(&session)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

/// Load a still-valid token, or None when missing, unreadable, or expired.
/// An expired file is removed so it is not parsed again.
pub fn load_session() -> Option<String> {
    load_session_from(&session_file(), now_secs())
}

fn load_session_from(path: &Path, now: u64) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let session: StoredSession = serde_json::from_str(&contents).ok()?;
    if now.saturating_sub(session.saved_at) > SESSION_MAX_AGE_SECS {
        let _ = fs::remove_file(path);
        return None;
    }
    Some(session.token)
}

/// Forget the stored token (logout, or a 401 from the server).
pub fn clear_session() {
    let _ = fs::remove_file(session_file());
}
