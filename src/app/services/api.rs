//! REST client for the notes server. All calls are blocking; callers run
//! them on a worker thread and post the outcome back to the UI thread.

use serde::{Deserialize, Serialize};

use crate::app::domain::note::{Note, NoteDraft};
use crate::app::domain::settings::{PasswordChange, RemoteSettings, WallpaperPresets};
use crate::app::error::{AppError, Result};

const DEFAULT_BASE_URL: &str = "http://localhost:5001";
const REQUEST_TIMEOUT_SECS: u64 = 45;

#[derive(Serialize)]
struct LoginRequest<'a> {
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

/// Client bound to one server and (after login) one bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Server address comes from SHARED_NOTES_API_URL when set.
    pub fn from_env() -> Self {
        let base_url = std::env::var("SHARED_NOTES_API_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn prepare(&self, request: minreq::Request) -> minreq::Request {
        let request = request.with_timeout(REQUEST_TIMEOUT_SECS);
        match &self.token {
            Some(token) => request.with_header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// Check the status line, mapping 401 to the forced-logout error and
    /// any other non-2xx to an API error with the server's message.
    fn check(response: minreq::Response) -> Result<minreq::Response> {
        let status = response.status_code;
        if (200..300).contains(&status) {
            return Ok(response);
        }
        if status == 401 {
            return Err(AppError::Unauthorized);
        }
        let message = response
            .json::<ApiMessage>()
            .map(|m| m.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| response.reason_phrase.clone());
        Err(AppError::Api { status, message })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.prepare(minreq::get(self.url(path))).send()?;
        Ok(Self::check(response)?.json()?)
    }

    // --- Auth ---

    /// Exchange the shared password for a bearer token. The token is kept on
    /// the client for subsequent calls and returned for persistence.
    pub fn login(&mut self, password: &str) -> Result<String> {
        let response = self
            .prepare(minreq::post(self.url("/api/auth/login")))
            .with_json(&LoginRequest { password })?
            .send()?;
        let body: LoginResponse = Self::check(response)?.json()?;
        self.token = Some(body.token.clone());
        Ok(body.token)
    }

    // --- Notes ---

    pub fn notes(&self) -> Result<Vec<Note>> {
        self.get_json("/api/notes")
    }

    pub fn pinned_notes(&self) -> Result<Vec<Note>> {
        self.get_json("/api/notes/pinned")
    }

    pub fn note(&self, id: &str) -> Result<Note> {
        self.get_json(&format!("/api/notes/{id}"))
    }

    pub fn create_note(&self, draft: &NoteDraft) -> Result<Note> {
        let response = self
            .prepare(minreq::post(self.url("/api/notes")))
            .with_json(draft)?
            .send()?;
        Ok(Self::check(response)?.json()?)
    }

    pub fn update_note(&self, id: &str, draft: &NoteDraft) -> Result<Note> {
        let response = self
            .prepare(minreq::put(self.url(&format!("/api/notes/{id}"))))
            .with_json(draft)?
            .send()?;
        Ok(Self::check(response)?.json()?)
    }

    pub fn delete_note(&self, id: &str) -> Result<()> {
        let response = self
            .prepare(minreq::delete(self.url(&format!("/api/notes/{id}"))))
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    // --- Settings ---

    pub fn settings(&self) -> Result<RemoteSettings> {
        self.get_json("/api/settings")
    }

    pub fn update_settings(&self, settings: &RemoteSettings) -> Result<()> {
        let response = self
            .prepare(minreq::put(self.url("/api/settings")))
            .with_json(settings)?
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    pub fn change_password(&self, change: &PasswordChange) -> Result<()> {
        let response = self
            .prepare(minreq::put(self.url("/api/settings/change-password")))
            .with_json(change)?
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    pub fn wallpaper_presets(&self) -> Result<WallpaperPresets> {
        self.get_json("/api/settings/wallpapers")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let client = ApiClient::new("http://example.com/");
        assert_eq!(client.url("/api/notes"), "http://example.com/api/notes");
    }

    #[test]
    fn test_token_round_trip() {
        let mut client = ApiClient::new("http://example.com");
        assert!(client.token().is_none());
        client.set_token(Some("abc".to_string()));
        assert_eq!(client.token(), Some("abc"));
        client.set_token(None);
        assert!(client.token().is_none());
    }
}
