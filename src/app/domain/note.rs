use serde::{Deserialize, Serialize};

/// A note as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,

    pub title: String,

    /// Markdown in the restricted dialect (headings 1-3, bold, italic,
    /// bullet/numbered lists, paragraphs).
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub pinned: bool,
}

/// Request body for `POST /api/notes` and `PUT /api/notes/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub pinned: bool,
}

impl Note {
    /// Short plain-text preview for note cards on the home screen.
    pub fn preview(&self, max_chars: usize) -> String {
        let flat: String = self
            .content
            .chars()
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        if flat.chars().count() > max_chars {
            let cut: String = flat.chars().take(max_chars).collect();
            format!("{}...", cut.trim_end())
        } else {
            flat
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(content: &str) -> Note {
        Note {
            id: "abc123".to_string(),
            title: "Groceries".to_string(),
            content: content.to_string(),
            pinned: false,
        }
    }

    #[test]
    fn test_wire_format_uses_underscore_id() {
        let json = r#"{"_id":"64af","title":"T","content":"Body","pinned":true}"#;
        let n: Note = serde_json::from_str(json).unwrap();
        assert_eq!(n.id, "64af");
        assert!(n.pinned);

        let back = serde_json::to_string(&n).unwrap();
        assert!(back.contains("\"_id\":\"64af\""));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"_id":"1","title":"T"}"#;
        let n: Note = serde_json::from_str(json).unwrap();
        assert_eq!(n.content, "");
        assert!(!n.pinned);
    }

    #[test]
    fn test_preview_short_content_unchanged() {
        assert_eq!(note("milk and eggs").preview(100), "milk and eggs");
    }

    #[test]
    fn test_preview_truncates_and_flattens_newlines() {
        let n = note("line one\nline two that keeps going for a while");
        let p = n.preview(12);
        assert_eq!(p, "line one lin...");
        assert!(!p.contains('\n'));
    }
}
