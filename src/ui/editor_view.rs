//! Rich-text editor view: renders the editor session into a TextEditor with
//! a parallel style buffer, and feeds intercepted key events back into the
//! session. The widget never owns the document; every edit goes through the
//! session and the buffers are rebuilt from it.

use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    app::{self, Sender},
    button::{Button, ToggleButton},
    enums::{Event, Font, FrameType, Key},
    frame::Frame,
    group::Group,
    input::Input,
    prelude::*,
    text::{StyleTableEntry, TextBuffer, TextEditor, WrapMode},
};

use crate::app::controllers::{BlockStyle, Caret, EditorSession, LineKind};
use crate::app::domain::note::{Note, NoteDraft};
use crate::app::messages::Message;
use super::theme::Palette;

// Style buffer letters, indexing into the style table
const STYLE_PLAIN: char = 'A';
const STYLE_BOLD: char = 'B';
const STYLE_ITALIC: char = 'C';
const STYLE_H1: char = 'D';
const STYLE_H2: char = 'E';
const STYLE_H3: char = 'F';
const STYLE_MARKER: char = 'G';

pub struct EditorView {
    pub group: Group,
    title_input: Input,
    editor: TextEditor,
    buffer: TextBuffer,
    style_buffer: TextBuffer,
    status: Frame,
    bold_btn: Button,
    italic_btn: Button,
    bullet_btn: Button,
    numbered_btn: Button,
    pin_btn: ToggleButton,
    session: Rc<RefCell<EditorSession>>,
    note_id: Rc<RefCell<Option<String>>>,
    pinned: Rc<RefCell<bool>>,
}

impl EditorView {
    pub fn build(sender: &Sender<Message>) -> Self {
        let group = Group::new(0, 0, 480, 640, None);

        let mut back_btn = Button::new(10, 10, 60, 28, "@<- Back");
        {
            let sender = *sender;
            back_btn.set_callback(move |_| sender.send(Message::CloseEditor));
        }
        let mut title_input = Input::new(80, 10, 280, 28, None);
        title_input.set_text_size(16);
        let mut save_btn = Button::new(370, 10, 100, 28, "Save");
        save_btn.set_frame(FrameType::RFlatBox);
        {
            let sender = *sender;
            save_btn.set_callback(move |_| sender.send(Message::SaveNote));
        }

        // Toolbar
        let mut bold_btn = Button::new(10, 46, 30, 26, "B");
        let mut italic_btn = Button::new(44, 46, 30, 26, "I");
        let mut h1_btn = Button::new(84, 46, 36, 26, "H1");
        let mut h2_btn = Button::new(124, 46, 36, 26, "H2");
        let mut h3_btn = Button::new(164, 46, 36, 26, "H3");
        let mut para_btn = Button::new(204, 46, 30, 26, "P");
        let mut bullet_btn = Button::new(244, 46, 60, 26, "@circle List");
        let mut numbered_btn = Button::new(308, 46, 60, 26, "1. List");
        let mut pin_btn = ToggleButton::new(400, 46, 70, 26, "Pin");

        let mut editor = TextEditor::new(10, 80, 460, 520, None);
        let buffer = TextBuffer::default();
        let style_buffer = TextBuffer::default();
        editor.set_buffer(buffer.clone());
        editor.wrap_mode(WrapMode::AtBounds, 0);

        let mut status = Frame::new(10, 606, 460, 24, "");
        status.set_label_size(12);

        group.end();

        let session = Rc::new(RefCell::new(EditorSession::open("")));
        let note_id: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
        let pinned = Rc::new(RefCell::new(false));
        {
            let pinned = pinned.clone();
            pin_btn.set_callback(move |b| *pinned.borrow_mut() = b.value());
        }

        // Toolbar commands all run through the same sync path
        let bind = |btn: &mut Button, command: Rc<dyn Fn(&mut EditorSession)>| {
            let session = session.clone();
            let mut editor = editor.clone();
            let mut buffer = buffer.clone();
            let mut style_buffer = style_buffer.clone();
            btn.set_callback(move |_| {
                apply_command(&session, &mut editor, &mut buffer, &mut style_buffer, |s| {
                    command(s)
                });
            });
        };
        bind(&mut bold_btn, Rc::new(|s| s.toggle_bold()));
        bind(&mut italic_btn, Rc::new(|s| s.toggle_italic()));
        bind(&mut h1_btn, Rc::new(|s| s.set_block_style(BlockStyle::Heading(1))));
        bind(&mut h2_btn, Rc::new(|s| s.set_block_style(BlockStyle::Heading(2))));
        bind(&mut h3_btn, Rc::new(|s| s.set_block_style(BlockStyle::Heading(3))));
        bind(&mut para_btn, Rc::new(|s| s.set_block_style(BlockStyle::Paragraph)));
        bind(&mut bullet_btn, Rc::new(|s| s.toggle_bullet_list()));
        bind(&mut numbered_btn, Rc::new(|s| s.toggle_numbered_list()));

        {
            let session = session.clone();
            let sender = *sender;
            let mut buffer = buffer.clone();
            let mut style_buffer = style_buffer.clone();
            editor.handle(move |ed, ev| {
                if ev != Event::KeyDown {
                    return false;
                }
                let key = app::event_key();
                let ctrl = app::is_event_ctrl() || app::is_event_command();

                if ctrl {
                    if key == Key::from_char('b') {
                        apply_command(&session, ed, &mut buffer, &mut style_buffer, |s| {
                            s.toggle_bold()
                        });
                        return true;
                    }
                    if key == Key::from_char('i') {
                        apply_command(&session, ed, &mut buffer, &mut style_buffer, |s| {
                            s.toggle_italic()
                        });
                        return true;
                    }
                    if key == Key::from_char('s') {
                        sender.send(Message::SaveNote);
                        return true;
                    }
                    if key == Key::from_char('z') {
                        apply_command(&session, ed, &mut buffer, &mut style_buffer, |s| {
                            s.undo()
                        });
                        return true;
                    }
                    if key == Key::from_char('y') {
                        apply_command(&session, ed, &mut buffer, &mut style_buffer, |s| {
                            s.redo()
                        });
                        return true;
                    }
                    return false;
                }

                if key == Key::Enter || key == Key::KPEnter {
                    apply_command(&session, ed, &mut buffer, &mut style_buffer, |s| {
                        s.handle_enter()
                    });
                    if session.borrow_mut().take_pending_sweep() {
                        // Run the cleanup on the next event-loop turn, after
                        // the widget has settled
                        app::add_timeout3(0.0, move |_| sender.send(Message::SweepListItems));
                    }
                    return true;
                }
                if key == Key::BackSpace {
                    apply_command(&session, ed, &mut buffer, &mut style_buffer, |s| {
                        s.backspace()
                    });
                    return true;
                }

                let text = app::event_text();
                if text == " " {
                    apply_command(&session, ed, &mut buffer, &mut style_buffer, |s| {
                        s.handle_space()
                    });
                    return true;
                }
                if !text.is_empty() && !text.chars().any(char::is_control) {
                    apply_command(&session, ed, &mut buffer, &mut style_buffer, |s| {
                        s.insert_text(&text)
                    });
                    return true;
                }
                false
            });
        }

        Self {
            group,
            title_input,
            editor,
            buffer,
            style_buffer,
            status,
            bold_btn,
            italic_btn,
            bullet_btn,
            numbered_btn,
            pin_btn,
            session,
            note_id,
            pinned,
        }
    }

    /// Load a note (or a blank draft) into the editor.
    pub fn open(&mut self, note: Option<&Note>) {
        match note {
            Some(note) => {
                self.title_input.set_value(&note.title);
                *self.note_id.borrow_mut() = Some(note.id.clone());
                *self.pinned.borrow_mut() = note.pinned;
                self.pin_btn.set_value(note.pinned);
                *self.session.borrow_mut() = EditorSession::open(&note.content);
            }
            None => {
                self.title_input.set_value("");
                *self.note_id.borrow_mut() = None;
                *self.pinned.borrow_mut() = false;
                self.pin_btn.set_value(false);
                *self.session.borrow_mut() = EditorSession::open("");
            }
        }
        self.set_status("");
        self.sync();
    }

    pub fn note_id(&self) -> Option<String> {
        self.note_id.borrow().clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.session.borrow().is_dirty()
    }

    /// Build the save payload; None when the title is missing.
    pub fn draft(&self) -> Option<NoteDraft> {
        let title = self.title_input.value().trim().to_string();
        if title.is_empty() {
            return None;
        }
        Some(NoteDraft {
            title,
            content: self.session.borrow().to_markdown(),
            pinned: *self.pinned.borrow(),
        })
    }

    pub fn mark_saved(&mut self, note: &Note) {
        *self.note_id.borrow_mut() = Some(note.id.clone());
        self.session.borrow_mut().mark_clean();
        self.set_status("Saved");
    }

    pub fn set_status(&mut self, message: &str) {
        self.status.set_label(message);
        self.status.redraw();
    }

    /// Deferred empty-item cleanup after exiting a list via Enter.
    pub fn sweep(&mut self) {
        self.session.borrow_mut().sweep_empty_list_items();
        self.sync();
    }

    fn sync(&mut self) {
        sync_widgets(
            &self.session,
            &mut self.editor,
            &mut self.buffer,
            &mut self.style_buffer,
        );
        self.update_toolbar();
    }

    fn update_toolbar(&mut self) {
        let state = self.session.borrow().format_state();
        highlight_button(&mut self.bold_btn, state.bold);
        highlight_button(&mut self.italic_btn, state.italic);
        highlight_button(&mut self.bullet_btn, state.bullet_list);
        highlight_button(&mut self.numbered_btn, state.numbered_list);
    }

    pub fn apply_palette(&mut self, palette: &Palette) {
        self.title_input.set_color(palette.field_bg);
        self.title_input.set_text_color(palette.text);
        self.editor.set_color(palette.panel_bg);
        self.editor.set_cursor_color(palette.text);
        self.editor.set_selection_color(palette.selection);
        self.status.set_label_color(palette.muted_text);
        self.editor
            .set_highlight_data(self.style_buffer.clone(), style_table(palette));
        self.group.redraw();
    }
}

fn highlight_button(btn: &mut Button, active: bool) {
    if active {
        btn.set_frame(FrameType::DownBox);
    } else {
        btn.set_frame(FrameType::UpBox);
    }
    btn.redraw();
}

/// Seek the session caret to the widget's position (and selection, when the
/// selection stays on one line), run the command, then rebuild the widget
/// from the session.
fn apply_command(
    session: &Rc<RefCell<EditorSession>>,
    editor: &mut TextEditor,
    buffer: &mut TextBuffer,
    style_buffer: &mut TextBuffer,
    command: impl FnOnce(&mut EditorSession),
) {
    {
        let mut s = session.borrow_mut();
        match buffer.selection_position() {
            Some((start, end)) if start != end => {
                let a = caret_at_byte(&s, start as usize);
                let b = caret_at_byte(&s, end as usize);
                s.set_caret(a);
                if a.block == b.block && a.item == b.item {
                    s.set_selection(a.offset, b.offset);
                }
            }
            _ => {
                let caret = caret_at_byte(&s, editor.insert_position() as usize);
                s.set_caret(caret);
            }
        }
        command(&mut s);
    }
    sync_widgets(session, editor, buffer, style_buffer);
}

fn sync_widgets(
    session: &Rc<RefCell<EditorSession>>,
    editor: &mut TextEditor,
    buffer: &mut TextBuffer,
    style_buffer: &mut TextBuffer,
) {
    let s = session.borrow();
    let (text, style) = render_buffers(&s);
    buffer.set_text(&text);
    style_buffer.set_text(&style);
    editor.set_insert_position(caret_byte(&s) as i32);
    editor.show_insert_position();
    editor.redraw();
}

/// Style table indexed by the STYLE_* letters.
fn style_table(palette: &Palette) -> Vec<StyleTableEntry> {
    vec![
        StyleTableEntry { color: palette.text, font: Font::Helvetica, size: 15 },
        StyleTableEntry { color: palette.text, font: Font::HelveticaBold, size: 15 },
        StyleTableEntry { color: palette.text, font: Font::HelveticaItalic, size: 15 },
        StyleTableEntry { color: palette.text, font: Font::HelveticaBold, size: 24 },
        StyleTableEntry { color: palette.text, font: Font::HelveticaBold, size: 20 },
        StyleTableEntry { color: palette.text, font: Font::HelveticaBold, size: 17 },
        StyleTableEntry { color: palette.muted_text, font: Font::Helvetica, size: 15 },
    ]
}

fn line_prefix(kind: LineKind) -> String {
    match kind {
        LineKind::Bullet => "\u{2022} ".to_string(),
        LineKind::Numbered(n) => format!("{n}. "),
        _ => String::new(),
    }
}

fn push_style(style: &mut String, letter: char, bytes: usize) {
    for _ in 0..bytes {
        style.push(letter);
    }
}

/// Render the document into display text and a byte-parallel style string.
fn render_buffers(session: &EditorSession) -> (String, String) {
    let mut text = String::new();
    let mut style = String::new();
    for (i, line) in session.lines().iter().enumerate() {
        if i > 0 {
            text.push('\n');
            style.push(STYLE_PLAIN);
        }
        let kind = session.line_kind(*line);
        let prefix = line_prefix(kind);
        text.push_str(&prefix);
        push_style(&mut style, STYLE_MARKER, prefix.len());

        let heading_letter = match kind {
            LineKind::Heading(1) => Some(STYLE_H1),
            LineKind::Heading(2) => Some(STYLE_H2),
            LineKind::Heading(_) => Some(STYLE_H3),
            _ => None,
        };
        for run in session.line_runs(*line) {
            let letter = heading_letter.unwrap_or(match run.style {
                crate::app::domain::InlineStyle::Bold => STYLE_BOLD,
                crate::app::domain::InlineStyle::Italic => STYLE_ITALIC,
                crate::app::domain::InlineStyle::Plain => STYLE_PLAIN,
            });
            text.push_str(&run.text);
            push_style(&mut style, letter, run.text.len());
        }
    }
    (text, style)
}

/// Byte position of the session caret in the rendered text.
fn caret_byte(session: &EditorSession) -> usize {
    let mut pos = 0;
    for (i, line) in session.lines().iter().enumerate() {
        if i > 0 {
            pos += 1; // newline
        }
        let prefix = line_prefix(session.line_kind(*line));
        let text = session.line_text(*line);
        if line.block == session.caret().block && line.item == session.caret().item {
            let byte = text
                .char_indices()
                .nth(session.caret().offset)
                .map(|(b, _)| b)
                .unwrap_or(text.len());
            return pos + prefix.len() + byte;
        }
        pos += prefix.len() + text.len();
    }
    pos
}

/// Map a byte position in the rendered text back to a session caret.
/// Positions inside a list prefix clamp to the line start.
fn caret_at_byte(session: &EditorSession, target: usize) -> Caret {
    let mut pos = 0;
    let lines = session.lines();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            pos += 1;
        }
        let prefix_len = line_prefix(session.line_kind(*line)).len();
        let text = session.line_text(*line);
        let line_end = pos + prefix_len + text.len();
        if target <= line_end || i == lines.len() - 1 {
            let in_text = target.saturating_sub(pos + prefix_len).min(text.len());
            let offset = text
                .char_indices()
                .take_while(|(b, _)| *b < in_text)
                .count();
            return Caret {
                block: line.block,
                item: line.item,
                offset,
            };
        }
        pos = line_end;
    }
    Caret {
        block: 0,
        item: None,
        offset: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_and_bold() {
        let session = EditorSession::open("a**b**");
        let (text, style) = render_buffers(&session);
        assert_eq!(text, "ab");
        assert_eq!(style, "AB");
    }

    #[test]
    fn test_render_list_prefixes() {
        let session = EditorSession::open("- one\n1. two");
        let (text, style) = render_buffers(&session);
        assert_eq!(text, "\u{2022} one\n1. two");
        // bullet glyph is 3 bytes, then the space
        assert_eq!(style, "GGGGAAAAGGGAAA");
        assert_eq!(text.len(), style.len());
    }

    #[test]
    fn test_render_heading_styles_whole_line() {
        let session = EditorSession::open("## head");
        let (text, style) = render_buffers(&session);
        assert_eq!(text, "head");
        assert_eq!(style, "EEEE");
    }

    #[test]
    fn test_caret_round_trip_through_byte_positions() {
        let mut session = EditorSession::open("- one\ntwo");
        let caret = Caret {
            block: 1,
            item: None,
            offset: 2,
        };
        session.set_caret(caret);
        let byte = caret_byte(&session);
        assert_eq!(caret_at_byte(&session, byte), caret);
    }

    #[test]
    fn test_caret_inside_prefix_clamps_to_line_start() {
        let session = EditorSession::open("- one");
        let caret = caret_at_byte(&session, 1);
        assert_eq!(
            caret,
            Caret {
                block: 0,
                item: Some(0),
                offset: 0
            }
        );
    }

    #[test]
    fn test_caret_past_end_clamps_to_last_line_end() {
        let session = EditorSession::open("ab\ncd");
        let caret = caret_at_byte(&session, 99);
        assert_eq!(caret.block, 1);
        assert_eq!(caret.offset, 2);
    }
}
