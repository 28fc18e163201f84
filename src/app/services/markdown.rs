//! Formatted document -> Markdown serialization.
//!
//! Works on the editing-surface markup string through ordered rewrite
//! passes; the order is load-bearing, later passes assume the normalization
//! done by earlier ones. The serializer is total: structures it does not
//! recognize (artifacts a live surface can introduce) are flattened to
//! plain text rather than rejected.

use std::sync::OnceLock;

use regex_lite::{Captures, Regex};

use crate::app::domain::document::FormattedDocument;

/// Placeholder for block-structural newlines. Distinct from real newlines so
/// whitespace handling cannot merge block boundaries with content breaks;
/// substituted with `\n` in the final passes.
const BLOCK_BREAK: char = '\u{e000}';

fn br_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").unwrap())
}

fn div_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<div>(.*?)</div>").unwrap())
}

fn p_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<p>(.*?)</p>").unwrap())
}

fn heading_res() -> &'static [(Regex, &'static str); 3] {
    static RES: OnceLock<[(Regex, &'static str); 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            (Regex::new(r"(?i)<h1>(.*?)</h1>").unwrap(), "# $1\n\n"),
            (Regex::new(r"(?i)<h2>(.*?)</h2>").unwrap(), "## $1\n\n"),
            (Regex::new(r"(?i)<h3>(.*?)</h3>").unwrap(), "### $1\n\n"),
        ]
    })
}

fn inline_res() -> &'static [(Regex, &'static str); 4] {
    static RES: OnceLock<[(Regex, &'static str); 4]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            (Regex::new(r"(?i)<strong>(.*?)</strong>").unwrap(), "**$1**"),
            (Regex::new(r"(?i)<b>(.*?)</b>").unwrap(), "**$1**"),
            (Regex::new(r"(?i)<em>(.*?)</em>").unwrap(), "*$1*"),
            (Regex::new(r"(?i)<i>(.*?)</i>").unwrap(), "*$1*"),
        ]
    })
}

fn list_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<li>(.*?)</li>|<(ul|ol)>|</(ul|ol)>").unwrap())
}

fn list_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</?ul>|</?ol>").unwrap())
}

fn any_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

/// Serialize surface markup to the Markdown dialect.
pub fn rich_text_to_markdown(markup: &str) -> String {
    // 1. Line-break nodes become single newlines
    let md = br_re().replace_all(markup, "\n").into_owned();

    // 2. Block containers become content + one block placeholder; empty
    //    containers still contribute one, preserving blank-line count
    let md = div_re().replace_all(&md, block_content).into_owned();
    let md = p_re().replace_all(&md, block_content).into_owned();

    // 3. Headings: marker + text + exactly one visible blank line after,
    //    regardless of source spacing
    let mut md = md;
    for (re, replacement) in heading_res() {
        md = re.replace_all(&md, *replacement).into_owned();
    }

    // 4. Inline styles
    for (re, replacement) in inline_res() {
        md = re.replace_all(&md, *replacement).into_owned();
    }

    // 5. List items, attributed to their enclosing container type
    let md = convert_list_items(&md);

    // 6. Container wrappers carry no text of their own
    let md = list_tag_re().replace_all(&md, "").into_owned();

    // 7. Strip whatever tags remain (surface artifacts)
    let md = any_tag_re().replace_all(&md, "").into_owned();

    // 8. Decode text escapes
    let md = md
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    // 9. Block placeholders become real newlines
    let md = md.replace(BLOCK_BREAK, "\n");

    // 10. One leading/trailing trim over the whole document
    md.trim().to_string()
}

/// Serialize a formatted document to Markdown.
pub fn document_to_markdown(doc: &FormattedDocument) -> String {
    rich_text_to_markdown(&doc.to_markup())
}

fn block_content(caps: &Captures) -> String {
    let content = &caps[1];
    if content.trim().is_empty() {
        BLOCK_BREAK.to_string()
    } else {
        format!("{}{}", content, BLOCK_BREAK)
    }
}

/// Rewrite `<li>` elements to `- ` / `n. ` lines. Container type is not
/// visible from the item itself, so the pass walks the string start to end
/// and tracks which container each item sits in; ordered items number by
/// position within their container. Items outside any container fall back
/// to bullets.
fn convert_list_items(input: &str) -> String {
    let mut stack: Vec<(bool, usize)> = Vec::new();
    list_token_re()
        .replace_all(input, |caps: &Captures| {
            if let Some(content) = caps.get(1) {
                match stack.last_mut() {
                    Some((true, count)) => {
                        *count += 1;
                        format!("{}. {}\n", count, content.as_str())
                    }
                    _ => format!("- {}\n", content.as_str()),
                }
            } else if let Some(open) = caps.get(2) {
                stack.push((open.as_str().eq_ignore_ascii_case("ol"), 0));
                caps[0].to_string()
            } else {
                stack.pop();
                caps[0].to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::richtext::markdown_to_rich_text;

    fn round_trip(md: &str) -> String {
        document_to_markdown(&markdown_to_rich_text(md))
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(rich_text_to_markdown("<p>one</p><p>two</p>"), "one\ntwo");
    }

    #[test]
    fn test_divs_behave_like_paragraphs() {
        assert_eq!(rich_text_to_markdown("<div>one</div><div>two</div>"), "one\ntwo");
    }

    #[test]
    fn test_heading_followed_by_exactly_one_blank_line() {
        assert_eq!(rich_text_to_markdown("<h1>Title</h1><p>Body</p>"), "# Title\n\nBody");
        assert_eq!(rich_text_to_markdown("<h3>Small</h3><p>x</p>"), "### Small\n\nx");
    }

    #[test]
    fn test_inline_styles() {
        assert_eq!(
            rich_text_to_markdown("<p><strong>bold</strong> and <em>italic</em></p>"),
            "**bold** and *italic*"
        );
        // legacy tag spellings from the surface
        assert_eq!(
            rich_text_to_markdown("<p><b>b</b> <i>i</i></p>"),
            "**b** *i*"
        );
    }

    #[test]
    fn test_bullet_list() {
        assert_eq!(
            rich_text_to_markdown("<ul><li>a</li><li>b</li></ul>"),
            "- a\n- b"
        );
    }

    #[test]
    fn test_ordered_list_numbers_by_position() {
        assert_eq!(
            rich_text_to_markdown("<ol><li>a</li><li>b</li><li>c</li></ol>"),
            "1. a\n2. b\n3. c"
        );
    }

    #[test]
    fn test_alternating_lists_keep_their_markers() {
        let markup = "<ul><li>u1</li></ul><ol><li>o1</li><li>o2</li></ol><ul><li>u2</li></ul>";
        assert_eq!(
            rich_text_to_markdown(markup),
            "- u1\n1. o1\n2. o2\n- u2"
        );
    }

    #[test]
    fn test_item_outside_container_defaults_to_bullet() {
        assert_eq!(rich_text_to_markdown("<li>orphan</li>"), "- orphan");
    }

    #[test]
    fn test_blank_paragraph_placeholders_restore_blank_lines() {
        assert_eq!(
            rich_text_to_markdown("<p>a</p><p><br></p><p><br></p><p>b</p>"),
            "a\n\n\nb"
        );
    }

    #[test]
    fn test_empty_container_still_breaks_blocks() {
        assert_eq!(rich_text_to_markdown("<p>a</p><p></p><p>b</p>"), "a\n\nb");
    }

    #[test]
    fn test_unknown_tags_are_flattened() {
        assert_eq!(
            rich_text_to_markdown("<p><span style=\"color: red\">hi</span> there</p>"),
            "hi there"
        );
        assert_eq!(
            rich_text_to_markdown("<ul><li>a<blockquote>q</blockquote></li></ul>"),
            "- aq"
        );
    }

    #[test]
    fn test_entity_decoding() {
        assert_eq!(
            rich_text_to_markdown("<p>a&nbsp;&amp;&nbsp;b &lt;tag&gt;</p>"),
            "a & b <tag>"
        );
    }

    #[test]
    fn test_whole_document_trim() {
        assert_eq!(rich_text_to_markdown("<p><br></p><p>x</p><p><br></p>"), "x");
    }

    // Round-trip properties over the supported construct set

    #[test]
    fn test_round_trip_identity() {
        for md in [
            "plain line",
            "one\ntwo",
            "# Title\n\nBody",
            "Line1\n\n\nLine2",
            "**bold** and *italic*",
            "- a\n- b",
            "1. a\n2. b",
            "- u\n1. o",
            "# H\n\n- item\n\npara",
        ] {
            assert_eq!(round_trip(md), md, "round trip changed {:?}", md);
        }
    }

    #[test]
    fn test_heading_spacing_normalization_is_the_one_non_identity() {
        assert_eq!(round_trip("# Title\nBody"), "# Title\n\nBody");
    }

    #[test]
    fn test_serialization_is_idempotent() {
        for md in [
            "# Title\nBody",
            "- a\n1. b\n- c",
            "a\n\n\n\nb",
            "## H\n\n\ntail",
        ] {
            let once = round_trip(md);
            let twice = round_trip(&once);
            assert_eq!(once, twice, "not a fixed point for {:?}", md);
        }
    }

    #[test]
    fn test_list_type_fidelity_across_adjacent_lists() {
        let md = "- u1\n- u2\n1. o1\n2. o2";
        assert_eq!(round_trip(md), md);
    }

    #[test]
    fn test_nbsp_from_editor_space_key_becomes_plain_space() {
        use crate::app::domain::document::{Block, FormattedDocument, InlineRun};
        let doc = FormattedDocument::new(vec![Block::Paragraph {
            runs: vec![InlineRun::plain("a\u{a0}b")],
        }]);
        assert_eq!(document_to_markdown(&doc), "a b");
    }
}
