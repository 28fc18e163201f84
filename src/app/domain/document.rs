//! The live editing representation of a note.
//!
//! A `FormattedDocument` is an ordered sequence of block nodes: headings,
//! paragraphs (an empty paragraph stands for an intentional blank line) and
//! list containers grouping consecutive items of one kind. It is the value
//! the editor session mutates; converters bridge it to the Markdown dialect.
//!
//! The document has a canonical serialized markup form (the tag dialect the
//! editing surface works in: `<h1>`..`<h3>`, `<p>`, `<ul>`/`<ol>`/`<li>`,
//! `<strong>`, `<em>`, `<br>`, plus `&nbsp;`/`&amp;`/`&lt;`/`&gt;` escapes).
//! `to_markup` emits it; `parse_markup` reads it back tolerantly, flattening
//! anything it does not recognize to plain text.

/// Inline style of a text run. Styles are flat: a run is bold or italic or
/// plain, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineStyle {
    Plain,
    Bold,
    Italic,
}

/// A span of text with one style. Runs concatenate to reconstruct a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRun {
    pub style: InlineStyle,
    pub text: String,
}

impl InlineRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            style: InlineStyle::Plain,
            text: text.into(),
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            style: InlineStyle::Bold,
            text: text.into(),
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            style: InlineStyle::Italic,
            text: text.into(),
        }
    }
}

/// One item of a list container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItem {
    pub runs: Vec<InlineRun>,
}

impl ListItem {
    pub fn new(runs: Vec<InlineRun>) -> Self {
        Self { runs }
    }

    pub fn text(&self) -> String {
        runs_text(&self.runs)
    }
}

/// A block-level node. Consecutive list items of one kind are nested under a
/// single `List` container; a container never mixes ordered and unordered
/// items and is never empty in a well-formed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Level is always 1, 2 or 3.
    Heading { level: u8, runs: Vec<InlineRun> },
    /// An empty run list is a blank-line placeholder.
    Paragraph { runs: Vec<InlineRun> },
    List { ordered: bool, items: Vec<ListItem> },
}

impl Block {
    /// Blank-line placeholder.
    pub fn blank() -> Self {
        Block::Paragraph { runs: Vec::new() }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Block::Paragraph { runs } => runs_text(runs).trim().is_empty(),
            _ => false,
        }
    }
}

/// Concatenate run texts into the line's flat text.
pub fn runs_text(runs: &[InlineRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedDocument {
    pub blocks: Vec<Block>,
}

impl FormattedDocument {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// A document holding a single blank paragraph (the "empty note" shape).
    pub fn empty() -> Self {
        Self {
            blocks: vec![Block::blank()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.is_blank())
    }

    /// Serialize into the editing-surface markup dialect.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Heading { level, runs } => {
                    out.push_str(&format!("<h{0}>{1}</h{0}>", level, inline_markup(runs)));
                }
                Block::Paragraph { runs } => {
                    if runs_text(runs).is_empty() {
                        out.push_str("<p><br></p>");
                    } else {
                        out.push_str(&format!("<p>{}</p>", inline_markup(runs)));
                    }
                }
                Block::List { ordered, items } => {
                    out.push_str(if *ordered { "<ol>" } else { "<ul>" });
                    for item in items {
                        out.push_str(&format!("<li>{}</li>", inline_markup(&item.runs)));
                    }
                    out.push_str(if *ordered { "</ol>" } else { "</ul>" });
                }
            }
        }
        out
    }

    /// Parse surface markup back into a document.
    ///
    /// Never fails: unknown tags are dropped and their content flattened to
    /// plain text; stray text and list items outside a container get wrapped
    /// in an implicit paragraph / bullet container.
    pub fn parse_markup(markup: &str) -> Self {
        Parser::default().run(markup)
    }
}

fn inline_markup(runs: &[InlineRun]) -> String {
    let mut out = String::new();
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        let escaped = escape_text(&run.text);
        match run.style {
            InlineStyle::Plain => out.push_str(&escaped),
            InlineStyle::Bold => out.push_str(&format!("<strong>{}</strong>", escaped)),
            InlineStyle::Italic => out.push_str(&format!("<em>{}</em>", escaped)),
        }
    }
    out
}

/// Escape text for embedding in markup. Non-breaking spaces (inserted by the
/// editor's Space handling) become `&nbsp;` so they survive the surface.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// What block the parser is currently filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    None,
    Paragraph,
    Heading(u8),
    Item,
}

#[derive(Default)]
struct Parser {
    blocks: Vec<Block>,
    list: Option<(bool, Vec<ListItem>)>,
    context: Context,
    runs: Vec<InlineRun>,
    bold: u32,
    italic: u32,
}

impl Default for Context {
    fn default() -> Self {
        Context::None
    }
}

impl Parser {
    fn run(mut self, markup: &str) -> FormattedDocument {
        let mut rest = markup;
        while let Some(lt) = rest.find('<') {
            let (text, after) = rest.split_at(lt);
            self.text(text);
            match after[1..].find('>') {
                Some(gt) => {
                    self.tag(&after[1..1 + gt]);
                    rest = &after[gt + 2..];
                }
                None => {
                    // Unterminated tag: keep the raw text, nothing else to do
                    self.text(after);
                    rest = "";
                }
            }
        }
        self.text(rest);

        self.close_block();
        self.close_list();
        if self.blocks.is_empty() {
            return FormattedDocument::empty();
        }
        FormattedDocument::new(self.blocks)
    }

    fn current_style(&self) -> InlineStyle {
        if self.bold > 0 {
            InlineStyle::Bold
        } else if self.italic > 0 {
            InlineStyle::Italic
        } else {
            InlineStyle::Plain
        }
    }

    fn text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let decoded = decode_entities(raw);
        // Newlines in markup are structural whitespace, not content
        let decoded = decoded.replace(['\n', '\r'], "");
        if decoded.is_empty() {
            return;
        }
        if self.context == Context::None {
            // Stray text outside any block: open an implicit paragraph
            self.context = Context::Paragraph;
        }
        let style = self.current_style();
        match self.runs.last_mut() {
            Some(last) if last.style == style => last.text.push_str(&decoded),
            _ => self.runs.push(InlineRun {
                style,
                text: decoded,
            }),
        }
    }

    fn tag(&mut self, body: &str) {
        let name = body
            .trim_start_matches('/')
            .trim_end_matches('/')
            .trim()
            .to_ascii_lowercase();
        let closing = body.starts_with('/');
        match (name.as_str(), closing) {
            ("p" | "div", false) => {
                self.close_block();
                self.context = Context::Paragraph;
            }
            ("p" | "div", true) => self.close_block(),
            ("h1", false) | ("h2", false) | ("h3", false) => {
                self.close_block();
                let level = name.as_bytes()[1] - b'0';
                self.context = Context::Heading(level);
            }
            ("h1" | "h2" | "h3", true) => self.close_block(),
            ("ul" | "ol", false) => {
                self.close_block();
                self.close_list();
                self.list = Some((name == "ol", Vec::new()));
            }
            ("ul" | "ol", true) => {
                self.close_block();
                self.close_list();
            }
            ("li", false) => {
                self.close_block();
                if self.list.is_none() {
                    // Item outside a container: adopt an implicit bullet list
                    self.list = Some((false, Vec::new()));
                }
                self.context = Context::Item;
            }
            ("li", true) => self.close_block(),
            ("strong" | "b", false) => self.bold += 1,
            ("strong" | "b", true) => self.bold = self.bold.saturating_sub(1),
            ("em" | "i", false) => self.italic += 1,
            ("em" | "i", true) => self.italic = self.italic.saturating_sub(1),
            ("br", _) => self.line_break(),
            // Anything else (editor artifacts, spans, ...) is stripped;
            // its text content falls through to the enclosing block
            _ => {}
        }
    }

    fn line_break(&mut self) {
        match self.context {
            // <br> inside a filled paragraph splits it in two
            Context::Paragraph if !self.runs.is_empty() => {
                self.close_block();
                self.context = Context::Paragraph;
            }
            // the <p><br></p> blank-line shape: the close_block call will
            // emit the placeholder, nothing to do here
            Context::Paragraph | Context::Heading(_) | Context::Item => {}
            Context::None => self.blocks.push(Block::blank()),
        }
    }

    fn close_block(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        match self.context {
            Context::None => {}
            Context::Paragraph => self.blocks.push(Block::Paragraph { runs }),
            Context::Heading(level) => self.blocks.push(Block::Heading { level, runs }),
            Context::Item => {
                if let Some((_, items)) = self.list.as_mut() {
                    items.push(ListItem::new(runs));
                }
            }
        }
        self.context = Context::None;
    }

    fn close_list(&mut self) {
        if let Some((ordered, items)) = self.list.take() {
            if !items.is_empty() {
                self.blocks.push(Block::List { ordered, items });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str) -> Block {
        Block::Paragraph {
            runs: vec![InlineRun::plain(text)],
        }
    }

    #[test]
    fn test_markup_paragraphs_and_blanks() {
        let doc = FormattedDocument::new(vec![para("one"), Block::blank(), para("two")]);
        assert_eq!(doc.to_markup(), "<p>one</p><p><br></p><p>two</p>");
    }

    #[test]
    fn test_markup_heading_levels() {
        let doc = FormattedDocument::new(vec![
            Block::Heading {
                level: 2,
                runs: vec![InlineRun::plain("Title")],
            },
        ]);
        assert_eq!(doc.to_markup(), "<h2>Title</h2>");
    }

    #[test]
    fn test_markup_inline_styles() {
        let doc = FormattedDocument::new(vec![Block::Paragraph {
            runs: vec![
                InlineRun::bold("bold"),
                InlineRun::plain(" and "),
                InlineRun::italic("italic"),
            ],
        }]);
        assert_eq!(
            doc.to_markup(),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn test_markup_lists() {
        let doc = FormattedDocument::new(vec![
            Block::List {
                ordered: false,
                items: vec![
                    ListItem::new(vec![InlineRun::plain("a")]),
                    ListItem::new(vec![InlineRun::plain("b")]),
                ],
            },
            Block::List {
                ordered: true,
                items: vec![ListItem::new(vec![InlineRun::plain("c")])],
            },
        ]);
        assert_eq!(
            doc.to_markup(),
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol>"
        );
    }

    #[test]
    fn test_markup_escapes_specials() {
        let doc = FormattedDocument::new(vec![para("a & b <c> d\u{a0}e")]);
        assert_eq!(doc.to_markup(), "<p>a &amp; b &lt;c&gt; d&nbsp;e</p>");
    }

    #[test]
    fn test_parse_round_trips_canonical_markup() {
        let doc = FormattedDocument::new(vec![
            Block::Heading {
                level: 1,
                runs: vec![InlineRun::plain("Title")],
            },
            para("body"),
            Block::blank(),
            Block::List {
                ordered: true,
                items: vec![
                    ListItem::new(vec![InlineRun::plain("first")]),
                    ListItem::new(vec![InlineRun::bold("second")]),
                ],
            },
        ]);
        let reparsed = FormattedDocument::parse_markup(&doc.to_markup());
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_parse_strips_unknown_tags() {
        let doc = FormattedDocument::parse_markup("<p><span style=\"x\">hi</span> there</p>");
        assert_eq!(doc, FormattedDocument::new(vec![para("hi there")]));
    }

    #[test]
    fn test_parse_stray_text_becomes_paragraph() {
        let doc = FormattedDocument::parse_markup("just text");
        assert_eq!(doc, FormattedDocument::new(vec![para("just text")]));
    }

    #[test]
    fn test_parse_item_outside_container_gets_bullet_list() {
        let doc = FormattedDocument::parse_markup("<li>orphan</li>");
        assert_eq!(
            doc,
            FormattedDocument::new(vec![Block::List {
                ordered: false,
                items: vec![ListItem::new(vec![InlineRun::plain("orphan")])],
            }])
        );
    }

    #[test]
    fn test_parse_empty_input_yields_blank_paragraph() {
        assert_eq!(FormattedDocument::parse_markup(""), FormattedDocument::empty());
        assert!(FormattedDocument::parse_markup("").is_empty());
    }

    #[test]
    fn test_parse_br_splits_filled_paragraph() {
        let doc = FormattedDocument::parse_markup("<p>a<br>b</p>");
        assert_eq!(doc, FormattedDocument::new(vec![para("a"), para("b")]));
    }

    #[test]
    fn test_parse_empty_container_dropped() {
        let doc = FormattedDocument::parse_markup("<ul></ul><p>x</p>");
        assert_eq!(doc, FormattedDocument::new(vec![para("x")]));
    }

    #[test]
    fn test_parse_decodes_entities() {
        let doc = FormattedDocument::parse_markup("<p>a &amp; b&nbsp;&lt;ok&gt;</p>");
        assert_eq!(doc, FormattedDocument::new(vec![para("a & b\u{a0}<ok>")]));
    }

    #[test]
    fn test_nested_styles_stay_flat() {
        // bold wins over italic when the surface nests them
        let doc = FormattedDocument::parse_markup("<p><strong><em>x</em></strong></p>");
        assert_eq!(
            doc,
            FormattedDocument::new(vec![Block::Paragraph {
                runs: vec![InlineRun::bold("x")],
            }])
        );
    }
}
