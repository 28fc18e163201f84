//! Editor session: the formatted document plus caret, mutated only through
//! commands. The FLTK view renders from it after every command and feeds key
//! events into it; nothing here touches widgets, so the whole session is
//! testable headlessly.
//!
//! Enter and Space are intercepted rather than left to the text widget: the
//! widget's native behavior knows nothing about list structure, so the
//! session implements list splitting/termination itself (and defers the
//! empty-item sweep one event-loop turn, see `take_pending_sweep`).

use crate::app::domain::document::{
    runs_text, Block, FormattedDocument, InlineRun, InlineStyle, ListItem,
};
use crate::app::services::markdown::document_to_markdown;
use crate::app::services::richtext::markdown_to_rich_text;

const UNDO_DEPTH: usize = 100;

/// Caret position: block index, item index when the block is a list, and a
/// character offset into the line's flat text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub block: usize,
    pub item: Option<usize>,
    pub offset: usize,
}

impl Caret {
    fn start() -> Self {
        Self {
            block: 0,
            item: None,
            offset: 0,
        }
    }
}

/// Block style exposed to the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Paragraph,
    Heading(u8),
}

/// Toolbar highlighting state, recomputed on every edit or caret move. Has
/// no effect on the document itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatState {
    pub block: BlockStyle,
    pub bold: bool,
    pub italic: bool,
    pub bullet_list: bool,
    pub numbered_list: bool,
}

/// One visual line of the document (a block, or one item of a list block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef {
    pub block: usize,
    pub item: Option<usize>,
}

/// What a line renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Paragraph,
    Heading(u8),
    Bullet,
    /// 1-based position within the ordered container.
    Numbered(usize),
}

pub struct EditorSession {
    doc: FormattedDocument,
    caret: Caret,
    /// Style override for the next insertion, set by the bold/italic toggles
    /// when there is no selection.
    pending_style: Option<InlineStyle>,
    /// Selection within the caret line (char offsets), set by the view.
    selection: Option<(usize, usize)>,
    pending_sweep: bool,
    dirty: bool,
    undo_stack: Vec<(FormattedDocument, Caret)>,
    redo_stack: Vec<(FormattedDocument, Caret)>,
}

impl EditorSession {
    /// Start a session from stored Markdown.
    pub fn open(markdown: &str) -> Self {
        let doc = markdown_to_rich_text(markdown);
        let mut session = Self {
            doc,
            caret: Caret::start(),
            pending_style: None,
            selection: None,
            pending_sweep: false,
            dirty: false,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        session.clamp_caret();
        session
    }

    pub fn document(&self) -> &FormattedDocument {
        &self.doc
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Serialize the current document for saving.
    pub fn to_markdown(&self) -> String {
        document_to_markdown(&self.doc)
    }

    // --- Lines ---

    pub fn lines(&self) -> Vec<LineRef> {
        let mut lines = Vec::new();
        for (b, block) in self.doc.blocks.iter().enumerate() {
            match block {
                Block::List { items, .. } => {
                    for i in 0..items.len() {
                        lines.push(LineRef {
                            block: b,
                            item: Some(i),
                        });
                    }
                }
                _ => lines.push(LineRef {
                    block: b,
                    item: None,
                }),
            }
        }
        lines
    }

    pub fn line_kind(&self, line: LineRef) -> LineKind {
        match &self.doc.blocks[line.block] {
            Block::Heading { level, .. } => LineKind::Heading(*level),
            Block::Paragraph { .. } => LineKind::Paragraph,
            Block::List { ordered, .. } => {
                if *ordered {
                    LineKind::Numbered(line.item.unwrap_or(0) + 1)
                } else {
                    LineKind::Bullet
                }
            }
        }
    }

    pub fn line_runs(&self, line: LineRef) -> &[InlineRun] {
        match &self.doc.blocks[line.block] {
            Block::Heading { runs, .. } | Block::Paragraph { runs } => runs,
            Block::List { items, .. } => &items[line.item.unwrap_or(0)].runs,
        }
    }

    fn line_runs_mut(&mut self, line: LineRef) -> &mut Vec<InlineRun> {
        match &mut self.doc.blocks[line.block] {
            Block::Heading { runs, .. } | Block::Paragraph { runs } => runs,
            Block::List { items, .. } => &mut items[line.item.unwrap_or(0)].runs,
        }
    }

    pub fn line_text(&self, line: LineRef) -> String {
        runs_text(self.line_runs(line))
    }

    fn caret_line(&self) -> LineRef {
        LineRef {
            block: self.caret.block,
            item: self.caret.item,
        }
    }

    // --- Commands ---

    /// Insert printable text at the caret.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.snapshot();
        let style = self
            .pending_style
            .take()
            .unwrap_or_else(|| self.style_at_caret());
        let offset = self.caret.offset;
        let line = self.caret_line();
        insert_runs_at(self.line_runs_mut(line), offset, text, style);
        self.caret.offset += text.chars().count();
        self.selection = None;
        self.dirty = true;
    }

    /// Space is inserted explicitly as a non-breaking space so consecutive
    /// spaces survive the surface; serialization turns it back into a plain
    /// space.
    pub fn handle_space(&mut self) {
        self.insert_text("\u{a0}");
    }

    /// Enter, with list-aware behavior:
    /// - inside a non-empty list item: new empty sibling item after it;
    /// - inside an empty list item: leave the list (paragraph after the
    ///   container) and schedule the empty-item sweep;
    /// - anywhere else: split the line into two blocks.
    pub fn handle_enter(&mut self) {
        self.snapshot();
        self.selection = None;
        self.dirty = true;
        let caret = self.caret;
        match &mut self.doc.blocks[caret.block] {
            Block::List { items, .. } => {
                let idx = caret.item.unwrap_or(0);
                if items[idx].text().trim().is_empty() {
                    // Exit the list: paragraph break after the container; the
                    // emptied item is cleaned up by the deferred sweep
                    self.doc.blocks.insert(caret.block + 1, Block::blank());
                    self.caret = Caret {
                        block: caret.block + 1,
                        item: None,
                        offset: 0,
                    };
                    self.pending_sweep = true;
                } else {
                    items.insert(idx + 1, ListItem::default());
                    self.caret = Caret {
                        block: caret.block,
                        item: Some(idx + 1),
                        offset: 0,
                    };
                }
            }
            Block::Heading { runs, .. } | Block::Paragraph { runs } => {
                let (left, right) = split_runs_at(std::mem::take(runs), caret.offset);
                *runs = left;
                self.doc
                    .blocks
                    .insert(caret.block + 1, Block::Paragraph { runs: right });
                self.caret = Caret {
                    block: caret.block + 1,
                    item: None,
                    offset: 0,
                };
            }
        }
    }

    /// Delete the char before the caret, merging lines at offset zero.
    pub fn backspace(&mut self) {
        if self.caret.offset > 0 {
            self.snapshot();
            let offset = self.caret.offset;
            let line = self.caret_line();
            remove_char_at(self.line_runs_mut(line), offset - 1);
            self.caret.offset -= 1;
            self.dirty = true;
            return;
        }

        let lines = self.lines();
        let here = self.caret_line();
        let Some(pos) = lines.iter().position(|l| *l == here) else {
            return;
        };
        if pos == 0 {
            return;
        }
        self.snapshot();
        let prev = lines[pos - 1];
        let moved = std::mem::take(self.line_runs_mut(here));
        let prev_len = self.line_text(prev).chars().count();
        self.line_runs_mut(prev).extend(moved);
        self.remove_line(here);
        self.caret = self.caret_for_line_index(pos - 1, prev_len);
        self.dirty = true;
    }

    /// Drop one line from the document structure, dissolving emptied
    /// containers.
    fn remove_line(&mut self, line: LineRef) {
        match &mut self.doc.blocks[line.block] {
            Block::List { items, .. } => {
                items.remove(line.item.unwrap_or(0));
                if items.is_empty() {
                    self.doc.blocks.remove(line.block);
                }
            }
            _ => {
                self.doc.blocks.remove(line.block);
            }
        }
        if self.doc.blocks.is_empty() {
            self.doc = FormattedDocument::empty();
        }
    }

    fn caret_for_line_index(&self, index: usize, offset: usize) -> Caret {
        let lines = self.lines();
        let line = lines[index.min(lines.len() - 1)];
        Caret {
            block: line.block,
            item: line.item,
            offset: offset.min(self.line_text(line).chars().count()),
        }
    }

    // --- Formatting ---

    pub fn toggle_bold(&mut self) {
        self.toggle_style(InlineStyle::Bold);
    }

    pub fn toggle_italic(&mut self) {
        self.toggle_style(InlineStyle::Italic);
    }

    fn toggle_style(&mut self, style: InlineStyle) {
        if let Some((start, end)) = self.selection {
            self.snapshot();
            let line = self.caret_line();
            restyle_range(self.line_runs_mut(line), start, end, style);
            self.dirty = true;
            return;
        }
        // No selection: arm the style for the next insertion
        let active = self.style_at_caret();
        self.pending_style = if active == style {
            Some(InlineStyle::Plain)
        } else {
            Some(style)
        };
    }

    /// Selection inside the caret line, as char offsets.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.line_text(self.caret_line()).chars().count();
        let (a, b) = if start <= end { (start, end) } else { (end, start) };
        if a < b && b <= len {
            self.selection = Some((a, b));
        } else {
            self.selection = None;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn set_block_style(&mut self, style: BlockStyle) {
        self.snapshot();
        self.dirty = true;
        let caret = self.caret;
        if let Block::List { .. } = self.doc.blocks[caret.block] {
            // Lift the item out of its container first
            self.unwrap_caret_item();
        }
        let caret = self.caret;
        let block = &mut self.doc.blocks[caret.block];
        let runs = match block {
            Block::Heading { runs, .. } | Block::Paragraph { runs } => std::mem::take(runs),
            Block::List { .. } => unreachable!("item was unwrapped above"),
        };
        *block = match style {
            BlockStyle::Paragraph => Block::Paragraph { runs },
            BlockStyle::Heading(level) => Block::Heading {
                level: level.clamp(1, 3),
                runs,
            },
        };
    }

    pub fn toggle_bullet_list(&mut self) {
        self.toggle_list(false);
    }

    pub fn toggle_numbered_list(&mut self) {
        self.toggle_list(true);
    }

    fn toggle_list(&mut self, ordered: bool) {
        self.snapshot();
        self.dirty = true;
        let caret = self.caret;
        match &self.doc.blocks[caret.block] {
            Block::List {
                ordered: current, ..
            } => {
                let same = *current == ordered;
                self.unwrap_caret_item();
                if !same {
                    self.wrap_caret_line(ordered);
                }
            }
            _ => self.wrap_caret_line(ordered),
        }
    }

    /// Replace the caret's list item with a standalone paragraph, splitting
    /// the container around it.
    fn unwrap_caret_item(&mut self) {
        let caret = self.caret;
        let (ordered, mut items) = match self.doc.blocks.remove(caret.block) {
            Block::List { ordered, items } => (ordered, items),
            other => {
                self.doc.blocks.insert(caret.block, other);
                return;
            }
        };
        let idx = caret.item.unwrap_or(0).min(items.len().saturating_sub(1));
        let after: Vec<ListItem> = items.split_off(idx + 1);
        let item = items.pop().unwrap_or_default();

        let mut insert_at = caret.block;
        if !items.is_empty() {
            self.doc
                .blocks
                .insert(insert_at, Block::List { ordered, items });
            insert_at += 1;
        }
        self.doc
            .blocks
            .insert(insert_at, Block::Paragraph { runs: item.runs });
        if !after.is_empty() {
            self.doc.blocks.insert(
                insert_at + 1,
                Block::List {
                    ordered,
                    items: after,
                },
            );
        }
        self.caret = Caret {
            block: insert_at,
            item: None,
            offset: caret.offset,
        };
        self.clamp_caret();
    }

    /// Turn the caret's paragraph/heading into a list item, joining an
    /// adjacent container of the same type when there is one.
    fn wrap_caret_line(&mut self, ordered: bool) {
        let caret = self.caret;
        let runs = match &mut self.doc.blocks[caret.block] {
            Block::Heading { runs, .. } | Block::Paragraph { runs } => std::mem::take(runs),
            Block::List { .. } => return,
        };
        let item = ListItem::new(runs);

        // Prefer merging into the previous container, then the next
        if caret.block > 0 {
            if let Block::List {
                ordered: prev_ordered,
                items,
            } = &mut self.doc.blocks[caret.block - 1]
            {
                if *prev_ordered == ordered {
                    items.push(item);
                    let idx = items.len() - 1;
                    self.doc.blocks.remove(caret.block);
                    self.caret = Caret {
                        block: caret.block - 1,
                        item: Some(idx),
                        offset: caret.offset,
                    };
                    return;
                }
            }
        }
        if caret.block + 1 < self.doc.blocks.len() {
            if let Block::List {
                ordered: next_ordered,
                items,
            } = &mut self.doc.blocks[caret.block + 1]
            {
                if *next_ordered == ordered {
                    items.insert(0, item);
                    self.doc.blocks.remove(caret.block);
                    self.caret = Caret {
                        block: caret.block,
                        item: Some(0),
                        offset: caret.offset,
                    };
                    return;
                }
            }
        }
        self.doc.blocks[caret.block] = Block::List {
            ordered,
            items: vec![item],
        };
        self.caret = Caret {
            block: caret.block,
            item: Some(0),
            offset: caret.offset,
        };
    }

    // --- Deferred sweep ---

    /// True once per scheduled sweep; the view drains this after the key
    /// event that set it has fully settled (next event-loop turn), so the
    /// sweep never races the widget's own selection update.
    pub fn take_pending_sweep(&mut self) -> bool {
        std::mem::take(&mut self.pending_sweep)
    }

    /// Remove list items whose text is empty, and containers emptied by
    /// that, keeping the caret on its line.
    pub fn sweep_empty_list_items(&mut self) {
        let caret_block = self.caret.block;
        let mut removed_before = 0;
        let mut blocks = Vec::with_capacity(self.doc.blocks.len());
        for (i, block) in std::mem::take(&mut self.doc.blocks).into_iter().enumerate() {
            match block {
                Block::List { ordered, items } => {
                    let kept: Vec<ListItem> = items
                        .into_iter()
                        .filter(|item| !item.text().trim().is_empty())
                        .collect();
                    if kept.is_empty() {
                        if i < caret_block {
                            removed_before += 1;
                        }
                    } else {
                        blocks.push(Block::List {
                            ordered,
                            items: kept,
                        });
                    }
                }
                other => blocks.push(other),
            }
        }
        self.doc.blocks = blocks;
        self.caret.block = self.caret.block.saturating_sub(removed_before);
        self.clamp_caret();
    }

    // --- Undo ---

    pub fn undo(&mut self) {
        if let Some((doc, caret)) = self.undo_stack.pop() {
            self.redo_stack.push((self.doc.clone(), self.caret));
            self.doc = doc;
            self.caret = caret;
            self.dirty = true;
            self.clamp_caret();
        }
    }

    pub fn redo(&mut self) {
        if let Some((doc, caret)) = self.redo_stack.pop() {
            self.undo_stack.push((self.doc.clone(), self.caret));
            self.doc = doc;
            self.caret = caret;
            self.dirty = true;
            self.clamp_caret();
        }
    }

    fn snapshot(&mut self) {
        self.undo_stack.push((self.doc.clone(), self.caret));
        if self.undo_stack.len() > UNDO_DEPTH {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    // --- Format state ---

    /// Style the next typed character would get.
    fn style_at_caret(&self) -> InlineStyle {
        if let Some(style) = self.pending_style {
            return style;
        }
        let runs = self.line_runs(self.caret_line());
        let at = self.caret.offset.saturating_sub(1).min(
            runs_text(runs).chars().count().saturating_sub(1),
        );
        style_at(runs, at)
    }

    /// Recompute toolbar state from the caret position.
    pub fn format_state(&self) -> FormatState {
        let (bullet, numbered) = match &self.doc.blocks[self.caret.block] {
            Block::List { ordered, .. } => (!ordered, *ordered),
            _ => (false, false),
        };
        let block = match &self.doc.blocks[self.caret.block] {
            Block::Heading { level, .. } => BlockStyle::Heading(*level),
            _ => BlockStyle::Paragraph,
        };
        let style = self.style_at_caret();
        FormatState {
            block,
            bold: style == InlineStyle::Bold,
            italic: style == InlineStyle::Italic,
            bullet_list: bullet,
            numbered_list: numbered,
        }
    }

    // --- Caret maintenance ---

    pub fn set_caret(&mut self, caret: Caret) {
        self.caret = caret;
        self.pending_style = None;
        self.selection = None;
        self.clamp_caret();
    }

    fn clamp_caret(&mut self) {
        if self.doc.blocks.is_empty() {
            self.doc = FormattedDocument::empty();
        }
        self.caret.block = self.caret.block.min(self.doc.blocks.len() - 1);
        match &self.doc.blocks[self.caret.block] {
            Block::List { items, .. } => {
                let idx = self
                    .caret
                    .item
                    .unwrap_or(0)
                    .min(items.len().saturating_sub(1));
                self.caret.item = Some(idx);
            }
            _ => self.caret.item = None,
        }
        let len = self.line_text(self.caret_line()).chars().count();
        self.caret.offset = self.caret.offset.min(len);
    }
}

// --- Run surgery helpers ---

fn style_at(runs: &[InlineRun], char_idx: usize) -> InlineStyle {
    let mut seen = 0;
    for run in runs {
        let len = run.text.chars().count();
        if char_idx < seen + len {
            return run.style;
        }
        seen += len;
    }
    InlineStyle::Plain
}

fn insert_runs_at(runs: &mut Vec<InlineRun>, offset: usize, text: &str, style: InlineStyle) {
    let (mut left, right) = split_runs_at(std::mem::take(runs), offset);
    match left.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => left.push(InlineRun {
            style,
            text: text.to_string(),
        }),
    }
    left.extend(right);
    *runs = merge_adjacent(left);
}

fn remove_char_at(runs: &mut Vec<InlineRun>, char_idx: usize) {
    let mut seen = 0;
    for run in runs.iter_mut() {
        let len = run.text.chars().count();
        if char_idx < seen + len {
            let local = char_idx - seen;
            let byte = char_to_byte(&run.text, local);
            run.text.remove(byte);
            break;
        }
        seen += len;
    }
    runs.retain(|r| !r.text.is_empty());
}

/// Split a run sequence at a char offset, preserving styles on both sides.
fn split_runs_at(runs: Vec<InlineRun>, offset: usize) -> (Vec<InlineRun>, Vec<InlineRun>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut seen = 0;
    for run in runs {
        let len = run.text.chars().count();
        if seen + len <= offset {
            left.push(run);
        } else if seen >= offset {
            right.push(run);
        } else {
            let byte = char_to_byte(&run.text, offset - seen);
            left.push(InlineRun {
                style: run.style,
                text: run.text[..byte].to_string(),
            });
            right.push(InlineRun {
                style: run.style,
                text: run.text[byte..].to_string(),
            });
        }
        seen += len;
    }
    (left, right)
}

/// Apply `style` to [start, end); if the whole range already carries it the
/// toggle clears it back to plain.
fn restyle_range(runs: &mut Vec<InlineRun>, start: usize, end: usize, style: InlineStyle) {
    if start >= end {
        return;
    }
    let (left, rest) = split_runs_at(std::mem::take(runs), start);
    let (mid, right) = split_runs_at(rest, end - start);
    let already = mid.iter().all(|r| r.style == style);
    let target = if already { InlineStyle::Plain } else { style };
    let mid_text: String = runs_text(&mid);
    let mut out = left;
    if !mid_text.is_empty() {
        out.push(InlineRun {
            style: target,
            text: mid_text,
        });
    }
    out.extend(right);
    *runs = merge_adjacent(out);
}

fn merge_adjacent(runs: Vec<InlineRun>) -> Vec<InlineRun> {
    let mut out: Vec<InlineRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.style == run.style => last.text.push_str(&run.text),
            _ => out.push(run),
        }
    }
    out
}

fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caret(block: usize, item: Option<usize>, offset: usize) -> Caret {
        Caret {
            block,
            item,
            offset,
        }
    }

    #[test]
    fn test_open_places_caret_at_start() {
        let session = EditorSession::open("hello");
        assert_eq!(session.caret(), caret(0, None, 0));
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_insert_text_extends_line() {
        let mut session = EditorSession::open("hello");
        session.set_caret(caret(0, None, 5));
        session.insert_text("!");
        assert_eq!(session.to_markdown(), "hello!");
        assert!(session.is_dirty());
    }

    #[test]
    fn test_space_inserts_nbsp_and_serializes_as_space() {
        let mut session = EditorSession::open("ab");
        session.set_caret(caret(0, None, 1));
        session.handle_space();
        assert_eq!(session.line_text(LineRef { block: 0, item: None }), "a\u{a0}b");
        assert_eq!(session.to_markdown(), "a b");
    }

    #[test]
    fn test_enter_splits_paragraph_at_caret() {
        let mut session = EditorSession::open("hello world");
        session.set_caret(caret(0, None, 5));
        session.handle_enter();
        assert_eq!(session.to_markdown(), "hello\n world");
        assert_eq!(session.caret(), caret(1, None, 0));
    }

    #[test]
    fn test_enter_in_nonempty_item_creates_empty_sibling() {
        let mut session = EditorSession::open("- Buy milk");
        session.set_caret(caret(0, Some(0), 8));
        session.handle_enter();

        let lines = session.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(session.line_text(lines[0]), "Buy milk");
        assert_eq!(session.line_text(lines[1]), "");
        assert_eq!(session.caret(), caret(0, Some(1), 0));
        assert!(!session.take_pending_sweep());
    }

    #[test]
    fn test_enter_in_empty_item_exits_list() {
        let mut session = EditorSession::open("- Buy milk");
        session.set_caret(caret(0, Some(0), 8));
        session.handle_enter(); // new empty sibling
        session.handle_enter(); // empty item: exit the list

        assert!(session.take_pending_sweep());
        session.sweep_empty_list_items();

        assert_eq!(session.to_markdown(), "- Buy milk");
        // caret sits on the paragraph after the list
        assert_eq!(session.caret(), caret(1, None, 0));
        match &session.document().blocks[1] {
            Block::Paragraph { runs } => assert!(runs.is_empty()),
            other => panic!("expected paragraph after list, got {:?}", other),
        }
    }

    #[test]
    fn test_enter_in_lone_empty_item_removes_list_entirely() {
        let mut session = EditorSession::open("");
        session.toggle_bullet_list();
        assert_eq!(session.caret().item, Some(0));

        session.handle_enter();
        assert!(session.take_pending_sweep());
        session.sweep_empty_list_items();

        let blocks = &session.document().blocks;
        assert!(
            blocks.iter().all(|b| matches!(b, Block::Paragraph { .. })),
            "list should be gone: {:?}",
            blocks
        );
    }

    #[test]
    fn test_sweep_keeps_filled_items() {
        let mut session = EditorSession::open("- a\n- b");
        session.set_caret(caret(0, Some(1), 1));
        session.handle_enter(); // empty sibling after "b"
        session.handle_enter(); // exit
        assert!(session.take_pending_sweep());
        session.sweep_empty_list_items();
        assert_eq!(session.to_markdown(), "- a\n- b");
    }

    #[test]
    fn test_backspace_merges_lines() {
        let mut session = EditorSession::open("ab\ncd");
        session.set_caret(caret(1, None, 0));
        session.backspace();
        assert_eq!(session.to_markdown(), "abcd");
        assert_eq!(session.caret().offset, 2);
    }

    #[test]
    fn test_backspace_removes_char() {
        let mut session = EditorSession::open("abc");
        session.set_caret(caret(0, None, 2));
        session.backspace();
        assert_eq!(session.to_markdown(), "ac");
        assert_eq!(session.caret().offset, 1);
    }

    #[test]
    fn test_toggle_bold_with_selection() {
        let mut session = EditorSession::open("make this bold");
        session.set_caret(caret(0, None, 0));
        session.set_selection(5, 9);
        session.toggle_bold();
        assert_eq!(session.to_markdown(), "make **this** bold");
    }

    #[test]
    fn test_toggle_bold_twice_clears_it() {
        let mut session = EditorSession::open("**word** more");
        session.set_caret(caret(0, None, 0));
        session.set_selection(0, 4);
        session.toggle_bold();
        assert_eq!(session.to_markdown(), "word more");
    }

    #[test]
    fn test_pending_style_applies_to_next_insert() {
        let mut session = EditorSession::open("x");
        session.set_caret(caret(0, None, 1));
        session.toggle_italic();
        session.insert_text("y");
        assert_eq!(session.to_markdown(), "x*y*");
    }

    #[test]
    fn test_set_block_style_heading() {
        let mut session = EditorSession::open("title");
        session.set_block_style(BlockStyle::Heading(2));
        assert_eq!(session.to_markdown(), "## title");
        assert_eq!(
            session.format_state().block,
            BlockStyle::Heading(2)
        );
    }

    #[test]
    fn test_heading_on_list_item_unwraps_it() {
        let mut session = EditorSession::open("- a\n- b\n- c");
        session.set_caret(caret(0, Some(1), 0));
        session.set_block_style(BlockStyle::Heading(1));
        assert_eq!(session.to_markdown(), "- a\n# b\n\n- c");
    }

    #[test]
    fn test_toggle_bullet_on_paragraph() {
        let mut session = EditorSession::open("item");
        session.toggle_bullet_list();
        assert_eq!(session.to_markdown(), "- item");
        assert!(session.format_state().bullet_list);
    }

    #[test]
    fn test_toggle_bullet_on_bullet_item_unwraps() {
        let mut session = EditorSession::open("- item");
        session.set_caret(caret(0, Some(0), 2));
        session.toggle_bullet_list();
        assert_eq!(session.to_markdown(), "item");
        assert!(!session.format_state().bullet_list);
    }

    #[test]
    fn test_toggle_numbered_on_bullet_switches_type() {
        let mut session = EditorSession::open("- item");
        session.set_caret(caret(0, Some(0), 0));
        session.toggle_numbered_list();
        assert_eq!(session.to_markdown(), "1. item");
        assert!(session.format_state().numbered_list);
    }

    #[test]
    fn test_wrap_merges_with_previous_container() {
        let mut session = EditorSession::open("- a\nb");
        session.set_caret(caret(1, None, 0));
        session.toggle_bullet_list();
        assert_eq!(session.to_markdown(), "- a\n- b");
        assert_eq!(session.caret(), caret(0, Some(1), 0));
    }

    #[test]
    fn test_format_state_in_lists() {
        let mut session = EditorSession::open("- a\n1. b");
        session.set_caret(caret(0, Some(0), 0));
        let state = session.format_state();
        assert!(state.bullet_list);
        assert!(!state.numbered_list);

        session.set_caret(caret(1, Some(0), 0));
        let state = session.format_state();
        assert!(state.numbered_list);
    }

    #[test]
    fn test_format_state_bold_at_caret() {
        let mut session = EditorSession::open("**bold** plain");
        session.set_caret(caret(0, None, 2));
        assert!(session.format_state().bold);
        session.set_caret(caret(0, None, 10));
        assert!(!session.format_state().bold);
    }

    #[test]
    fn test_undo_redo() {
        let mut session = EditorSession::open("a");
        session.set_caret(caret(0, None, 1));
        session.insert_text("b");
        assert_eq!(session.to_markdown(), "ab");
        session.undo();
        assert_eq!(session.to_markdown(), "a");
        session.redo();
        assert_eq!(session.to_markdown(), "ab");
    }

    #[test]
    fn test_enter_outside_list_keeps_single_newline_semantics() {
        let mut session = EditorSession::open("line");
        session.set_caret(caret(0, None, 4));
        session.handle_enter();
        session.insert_text("next");
        assert_eq!(session.to_markdown(), "line\nnext");
    }
}
