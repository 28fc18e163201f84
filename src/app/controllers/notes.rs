//! Note-list presentation logic: pinned/unpinned partitioning, search
//! filtering, and local mutations mirrored after server calls succeed.

use crate::app::domain::note::Note;

/// The two list-view sections a note can render under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Pinned,
    Others,
}

/// The in-memory note collection backing the list view.
#[derive(Debug, Default)]
pub struct NoteList {
    pinned: Vec<Note>,
    others: Vec<Note>,
    query: String,
}

impl NoteList {
    /// Replace the collection from a fresh fetch. Notes present in `pinned`
    /// are dropped from `all` so they only show once.
    pub fn replace(&mut self, pinned: Vec<Note>, all: Vec<Note>) {
        self.others = all
            .into_iter()
            .filter(|n| !pinned.iter().any(|p| p.id == n.id))
            .collect();
        self.pinned = pinned;
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Pinned notes matching the current query, in server order.
    pub fn visible_pinned(&self) -> Vec<&Note> {
        self.pinned
            .iter()
            .filter(|n| matches_query(n, &self.query))
            .collect()
    }

    /// Unpinned notes matching the current query, in server order.
    pub fn visible_others(&self) -> Vec<&Note> {
        self.others
            .iter()
            .filter(|n| matches_query(n, &self.query))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty() && self.others.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.pinned
            .iter()
            .chain(self.others.iter())
            .find(|n| n.id == id)
    }

    /// Drop a note locally after the server confirmed the delete.
    pub fn remove(&mut self, id: &str) {
        self.pinned.retain(|n| n.id != id);
        self.others.retain(|n| n.id != id);
    }
}

/// Case-insensitive substring match over title and content.
fn matches_query(note: &Note, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    note.title.to_lowercase().contains(&query)
        || note.content.to_lowercase().contains(&query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, title: &str, content: &str, pinned: bool) -> Note {
        Note {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            pinned,
        }
    }

    fn sample() -> NoteList {
        let mut list = NoteList::default();
        list.replace(
            vec![note("1", "Groceries", "- milk\n- eggs", true)],
            vec![
                note("1", "Groceries", "- milk\n- eggs", true),
                note("2", "Meeting notes", "budget review", false),
                note("3", "Ideas", "try the new **editor**", false),
            ],
        );
        list
    }

    #[test]
    fn test_pinned_notes_are_not_duplicated() {
        let list = sample();
        assert_eq!(list.visible_pinned().len(), 1);
        assert_eq!(list.visible_others().len(), 2);
    }

    #[test]
    fn test_query_matches_title_case_insensitive() {
        let mut list = sample();
        list.set_query("MEETING");
        assert!(list.visible_pinned().is_empty());
        let others = list.visible_others();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id, "2");
    }

    #[test]
    fn test_query_matches_content() {
        let mut list = sample();
        list.set_query("milk");
        assert_eq!(list.visible_pinned().len(), 1);
        assert!(list.visible_others().is_empty());
    }

    #[test]
    fn test_blank_query_shows_everything() {
        let mut list = sample();
        list.set_query("   ");
        assert_eq!(list.visible_pinned().len(), 1);
        assert_eq!(list.visible_others().len(), 2);
    }

    #[test]
    fn test_remove_drops_from_both_sections() {
        let mut list = sample();
        list.remove("1");
        list.remove("3");
        assert!(list.visible_pinned().is_empty());
        assert_eq!(list.visible_others().len(), 1);
        assert!(list.get("1").is_none());
        assert!(list.get("2").is_some());
    }
}
