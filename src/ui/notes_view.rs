use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    app::Sender,
    browser::HoldBrowser,
    button::Button,
    enums::{CallbackTrigger, FrameType},
    group::Group,
    input::Input,
    prelude::*,
};

use crate::app::controllers::{NoteList, Section};
use crate::app::domain::note::Note;
use crate::app::messages::Message;
use super::theme::Palette;

const PREVIEW_CHARS: usize = 60;

/// What a browser row stands for (rows are 1-based in the widget).
#[derive(Debug, Clone, PartialEq)]
enum Row {
    Header(Section),
    Note(String),
    Info,
}

/// Which sections are folded under their header.
#[derive(Debug, Default, Clone, Copy)]
struct Collapsed {
    pinned: bool,
    others: bool,
}

pub struct NotesView {
    pub group: Group,
    search: Input,
    browser: HoldBrowser,
    new_btn: Button,
    delete_btn: Button,
    settings_btn: Button,
    logout_btn: Button,
    rows: Rc<RefCell<Vec<Row>>>,
    collapsed: Rc<RefCell<Collapsed>>,
}

impl NotesView {
    pub fn build(sender: &Sender<Message>) -> Self {
        let group = Group::new(0, 0, 480, 640, None);

        let mut search = Input::new(10, 10, 330, 30, None);
        search.set_trigger(CallbackTrigger::Changed);
        {
            let sender = *sender;
            search.set_callback(move |s| sender.send(Message::SearchChanged(s.value())));
        }

        let mut new_btn = Button::new(350, 10, 120, 30, "+ New note");
        new_btn.set_frame(FrameType::RFlatBox);
        {
            let sender = *sender;
            new_btn.set_callback(move |_| sender.send(Message::NewNote));
        }

        let mut browser = HoldBrowser::new(10, 50, 460, 540, None);
        browser.set_text_size(14);
        browser.set_column_char('\t');
        browser.set_column_widths(&[170]);

        let mut delete_btn = Button::new(10, 600, 100, 30, "Delete");
        let mut settings_btn = Button::new(250, 600, 100, 30, "Settings");
        let mut logout_btn = Button::new(360, 600, 110, 30, "Logout");
        {
            let sender = *sender;
            settings_btn.set_callback(move |_| sender.send(Message::OpenSettings));
        }
        {
            let sender = *sender;
            logout_btn.set_callback(move |_| sender.send(Message::Logout));
        }

        group.end();

        let rows: Rc<RefCell<Vec<Row>>> = Rc::new(RefCell::new(Vec::new()));
        let collapsed: Rc<RefCell<Collapsed>> = Rc::new(RefCell::new(Collapsed::default()));

        {
            let sender = *sender;
            let rows = rows.clone();
            browser.set_callback(move |b| match selected_row(b, &rows) {
                // Headers fold on a single click; notes open on double-click
                Some(Row::Header(section)) => sender.send(Message::ToggleSection(section)),
                Some(Row::Note(id)) if fltk::app::event_clicks() => {
                    sender.send(Message::OpenNote(id));
                }
                _ => {}
            });
        }
        {
            let sender = *sender;
            let rows = rows.clone();
            let browser = browser.clone();
            delete_btn.set_callback(move |_| {
                if let Some(Row::Note(id)) = selected_row(&browser, &rows) {
                    sender.send(Message::DeleteNote(id));
                }
            });
        }

        Self {
            group,
            search,
            browser,
            new_btn,
            delete_btn,
            settings_btn,
            logout_btn,
            rows,
            collapsed,
        }
    }

    /// Rebuild the browser rows from the filtered note list.
    pub fn render(&mut self, notes: &NoteList) {
        self.browser.clear();
        let mut rows = self.rows.borrow_mut();
        rows.clear();
        for (label, row) in build_rows(notes, *self.collapsed.borrow()) {
            self.browser.add(&label);
            rows.push(row);
        }
        self.browser.redraw();
    }

    /// Fold or unfold a section; the caller re-renders afterwards.
    pub fn toggle_section(&mut self, section: Section) {
        let mut collapsed = self.collapsed.borrow_mut();
        match section {
            Section::Pinned => collapsed.pinned = !collapsed.pinned,
            Section::Others => collapsed.others = !collapsed.others,
        }
    }

    pub fn clear_search(&mut self) {
        self.search.set_value("");
    }

    pub fn apply_palette(&mut self, palette: &Palette) {
        self.search.set_color(palette.field_bg);
        self.search.set_text_color(palette.text);
        self.browser.set_color(palette.panel_bg);
        self.browser.set_text_color(palette.text);
        self.browser.set_selection_color(palette.selection);
        self.new_btn.set_color(palette.accent);
        self.new_btn.set_label_color(fltk::enums::Color::White);
        for btn in [&mut self.delete_btn, &mut self.settings_btn, &mut self.logout_btn] {
            btn.set_color(palette.panel_bg);
            btn.set_label_color(palette.text);
        }
        self.group.redraw();
    }
}

fn selected_row(browser: &HoldBrowser, rows: &Rc<RefCell<Vec<Row>>>) -> Option<Row> {
    let row = browser.value();
    if row < 1 {
        return None;
    }
    rows.borrow().get(row as usize - 1).cloned()
}

/// Browser labels and row meanings for the current list and fold state.
/// The NOTES header only appears when a pinned section is shown above it.
fn build_rows(notes: &NoteList, collapsed: Collapsed) -> Vec<(String, Row)> {
    let mut rows = Vec::new();
    let pinned = notes.visible_pinned();
    let others = notes.visible_others();

    if !pinned.is_empty() {
        rows.push((
            header_label(Section::Pinned, collapsed.pinned),
            Row::Header(Section::Pinned),
        ));
        if !collapsed.pinned {
            for &note in &pinned {
                rows.push((note_row(note), Row::Note(note.id.clone())));
            }
        }
    }
    if !others.is_empty() {
        let with_header = !rows.is_empty();
        if with_header {
            rows.push((
                header_label(Section::Others, collapsed.others),
                Row::Header(Section::Others),
            ));
        }
        if !with_header || !collapsed.others {
            for &note in &others {
                rows.push((note_row(note), Row::Note(note.id.clone())));
            }
        }
    }
    if rows.is_empty() {
        let label = if notes.query().trim().is_empty() {
            "@i@.No notes yet. Create one!"
        } else {
            "@i@.No notes match your search."
        };
        rows.push((label.to_string(), Row::Info));
    }
    rows
}

fn header_label(section: Section, collapsed: bool) -> String {
    let arrow = if collapsed { "▸" } else { "▾" };
    let name = match section {
        Section::Pinned => "PINNED",
        Section::Others => "NOTES",
    };
    format!("@b@.{} {}", arrow, name)
}

fn note_row(note: &Note) -> String {
    let title = if note.title.is_empty() {
        "(untitled)"
    } else {
        &note.title
    };
    format!("{}\t{}", title, note.preview(PREVIEW_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, title: &str, pinned: bool) -> Note {
        Note {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            pinned,
        }
    }

    fn sample() -> NoteList {
        let mut list = NoteList::default();
        list.replace(
            vec![note("1", "Groceries", true)],
            vec![
                note("1", "Groceries", true),
                note("2", "Meeting notes", false),
            ],
        );
        list
    }

    #[test]
    fn test_both_sections_expanded() {
        let rows = build_rows(&sample(), Collapsed::default());
        let kinds: Vec<&Row> = rows.iter().map(|(_, r)| r).collect();
        assert_eq!(
            kinds,
            vec![
                &Row::Header(Section::Pinned),
                &Row::Note("1".into()),
                &Row::Header(Section::Others),
                &Row::Note("2".into()),
            ]
        );
        assert!(rows[0].0.contains("▾ PINNED"));
        assert!(rows[2].0.contains("▾ NOTES"));
    }

    #[test]
    fn test_collapsed_section_keeps_header_hides_notes() {
        let collapsed = Collapsed { pinned: true, others: false };
        let rows = build_rows(&sample(), collapsed);
        assert!(rows[0].0.contains("▸ PINNED"));
        assert_eq!(rows[0].1, Row::Header(Section::Pinned));
        // the pinned note is gone, the others section is untouched
        assert_eq!(rows[1].1, Row::Header(Section::Others));
        assert_eq!(rows[2].1, Row::Note("2".into()));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_unpinned_only_list_renders_flat() {
        let mut list = NoteList::default();
        list.replace(Vec::new(), vec![note("2", "Meeting notes", false)]);
        let rows = build_rows(&list, Collapsed { pinned: false, others: true });
        // no header to fold under, so the notes stay visible
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, Row::Note("2".into()));
    }

    #[test]
    fn test_empty_list_shows_placeholder() {
        let rows = build_rows(&NoteList::default(), Collapsed::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, Row::Info);
    }
}
