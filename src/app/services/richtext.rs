//! Markdown -> formatted document conversion.
//!
//! Parses the restricted Markdown dialect (headings 1-3, bold, italic,
//! bullet/numbered lists, paragraphs, blank-line-as-paragraph-break) into a
//! `FormattedDocument` for the editing surface. The parser is total: any
//! line that matches no construct is a plain paragraph.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::app::domain::document::{Block, FormattedDocument, InlineRun, ListItem};

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").unwrap())
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.*?)\*").unwrap())
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s+").unwrap())
}

/// Parse a Markdown string into the live editing representation.
pub fn markdown_to_rich_text(markdown: &str) -> FormattedDocument {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let structural = structural_blanks(&lines);

    let mut builder = Builder::default();
    let mut pending_blanks = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if structural.contains(&i) {
            // Implied by heading spacing, not a user-intentional blank
            pending_blanks = 0;
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            pending_blanks += 1;
            continue;
        }

        // A blank line terminates any open list. "- a / blank / - b" is two
        // containers with a placeholder between, never one merged list.
        if pending_blanks > 0 {
            builder.close_list();
            for _ in 0..pending_blanks {
                builder.push(Block::blank());
            }
            pending_blanks = 0;
        }

        // Classification precedence: bullet > numbered > heading > paragraph
        if let Some(content) = trimmed.strip_prefix("- ") {
            builder.list_item(false, parse_inline(content));
        } else if let Some(m) = numbered_re().find(trimmed) {
            builder.list_item(true, parse_inline(&trimmed[m.end()..]));
        } else if let Some(rest) = heading_text(line) {
            builder.close_list();
            builder.push(Block::Heading {
                level: heading_level(line),
                runs: parse_inline(rest),
            });
        } else {
            builder.close_list();
            builder.push(Block::Paragraph {
                runs: parse_inline(line),
            });
        }
    }

    builder.close_list();

    if builder.blocks.is_empty() {
        // A fully blank document still renders as one editable empty line
        return FormattedDocument::empty();
    }
    FormattedDocument::new(builder.blocks)
}

/// Indices of blank lines implied by heading spacing: the first blank line
/// directly after a heading. Further blanks stay user-intentional.
fn structural_blanks(lines: &[&str]) -> std::collections::HashSet<usize> {
    let mut structural = std::collections::HashSet::new();
    for (i, line) in lines.iter().enumerate() {
        if heading_text(line).is_some() {
            if let Some(next) = lines.get(i + 1) {
                if next.trim().is_empty() {
                    structural.insert(i + 1);
                }
            }
        }
    }
    structural
}

/// Heading body if the line is `# `/`## `/`### ` + non-blank text.
fn heading_text(line: &str) -> Option<&str> {
    for prefix in ["# ", "## ", "### "] {
        if let Some(rest) = line.strip_prefix(prefix) {
            if !rest.trim().is_empty() {
                return Some(rest);
            }
        }
    }
    None
}

fn heading_level(line: &str) -> u8 {
    line.bytes().take_while(|&b| b == b'#').count() as u8
}

/// Resolve `**bold**` and `*italic*` markers into style runs. Bold is
/// matched first so `**x**` is never read as two italic markers.
pub fn parse_inline(text: &str) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut last = 0;
    for caps in bold_re().captures_iter(text) {
        let whole = caps.get(0).unwrap();
        parse_italic(&text[last..whole.start()], &mut runs);
        push_run(&mut runs, InlineRun::bold(&caps[1]));
        last = whole.end();
    }
    parse_italic(&text[last..], &mut runs);
    runs
}

fn parse_italic(text: &str, runs: &mut Vec<InlineRun>) {
    let mut last = 0;
    for caps in italic_re().captures_iter(text) {
        let whole = caps.get(0).unwrap();
        push_run(runs, InlineRun::plain(&text[last..whole.start()]));
        push_run(runs, InlineRun::italic(&caps[1]));
        last = whole.end();
    }
    push_run(runs, InlineRun::plain(&text[last..]));
}

fn push_run(runs: &mut Vec<InlineRun>, run: InlineRun) {
    if !run.text.is_empty() {
        runs.push(run);
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    list: Option<(bool, Vec<ListItem>)>,
}

impl Builder {
    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn list_item(&mut self, ordered: bool, runs: Vec<InlineRun>) {
        match &mut self.list {
            Some((open_ordered, items)) if *open_ordered == ordered => {
                items.push(ListItem::new(runs));
            }
            _ => {
                // Opposite list type: close the open container first
                self.close_list();
                self.list = Some((ordered, vec![ListItem::new(runs)]));
            }
        }
    }

    fn close_list(&mut self) {
        if let Some((ordered, items)) = self.list.take() {
            if !items.is_empty() {
                self.blocks.push(Block::List { ordered, items });
            }
        }
    }
}
