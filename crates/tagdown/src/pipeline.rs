//! Block-stream plumbing.
//!
//! Splits source text into a stream of [`Block`]s with 1-indexed line
//! numbers, classifying bracket-tag marker lines and ATX headings as
//! standalone blocks so the matchers can consume them individually. Prose
//! blocks between markers are rendered through `pulldown-cmark`.

use pulldown_cmark::{Options, Parser, html};
use regex::Regex;
use std::sync::LazyLock;

/// One unit of the block stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
    /// Block text without trailing newline. Marker and heading blocks hold
    /// exactly their one line; prose blocks may span several.
    pub(crate) text: String,
    /// 1-indexed source line of the block's first line.
    pub(crate) line: usize,
}

/// A classified bracket-tag marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Marker {
    /// `{kind ...}` with the raw argument text (possibly empty).
    Open { kind: String, raw_args: String },
    /// `{kind end}`.
    Close { kind: String },
}

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{([a-z][a-z0-9-]*)(?:[ \t]+([^}]*))?\}$").unwrap()
});

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.*?)[ \t]*#*[ \t]*$").unwrap());

static INLINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{comment[ \t]+([^}]*)\}").unwrap());

/// Remove inline `{comment text}` occurrences from a line.
///
/// The container close marker `{comment end}` shares this shape and must
/// survive, so matches whose content is exactly `end` are kept.
fn strip_inline_comments(line: &str) -> std::borrow::Cow<'_, str> {
    INLINE_COMMENT_RE.replace_all(line, |captures: &regex::Captures<'_>| {
        if captures[1].trim() == "end" {
            captures[0].to_owned()
        } else {
            String::new()
        }
    })
}

impl Marker {
    /// Classify a line as a tag marker, if it is one.
    ///
    /// A marker line contains nothing but the bracket tag (surrounding
    /// whitespace allowed). `{kind end}` classifies as a close for any
    /// kind; everything else inside the braces is raw argument text.
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let captures = MARKER_RE.captures(line.trim())?;
        let kind = captures[1].to_owned();
        let raw_args = captures.get(2).map_or("", |m| m.as_str());
        if raw_args.trim() == "end" {
            Some(Self::Close { kind })
        } else {
            Some(Self::Open {
                kind,
                raw_args: raw_args.to_owned(),
            })
        }
    }

    pub(crate) fn kind(&self) -> &str {
        match self {
            Self::Open { kind, .. } | Self::Close { kind } => kind,
        }
    }
}

/// Parse an ATX heading line into (level, text).
pub(crate) fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let captures = HEADING_RE.captures(line)?;
    let level = u8::try_from(captures.get(1)?.len()).ok()?;
    Some((level, captures.get(2)?.as_str()))
}

/// Tracks fenced code block state during line-by-line scanning.
///
/// Marker and heading syntax inside a fence is literal code, not markup.
/// Closing fences must reuse the opening character and be at least as long.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn in_fence(&self) -> bool {
        self.fence.is_some()
    }

    pub(crate) fn update(&mut self, line: &str) {
        let trimmed = line.trim_start();
        match self.fence {
            Some((open_char, open_len)) => {
                let count = trimmed.chars().take_while(|&c| c == open_char).count();
                if count >= open_len && trimmed[count..].trim().is_empty() {
                    self.fence = None;
                }
            }
            None => {
                if let Some(first @ ('`' | '~')) = trimmed.chars().next() {
                    let count = trimmed.chars().take_while(|&c| c == first).count();
                    if count >= 3 {
                        self.fence = Some((first, count));
                    }
                }
            }
        }
    }
}

/// Split source text into the block stream.
///
/// Blank lines outside fences separate prose blocks. Marker lines and
/// heading lines become standalone single-line blocks; inline `{comment
/// ...}` occurrences are stripped from prose before splitting. Fenced code
/// lines always join the surrounding prose block verbatim.
pub(crate) fn split_blocks(source: &str) -> Vec<Block> {
    fn flush(blocks: &mut Vec<Block>, prose: &mut String, prose_line: usize) {
        if prose.trim().is_empty() {
            prose.clear();
        } else {
            blocks.push(Block {
                text: std::mem::take(prose),
                line: prose_line,
            });
        }
    }

    let mut blocks = Vec::new();
    let mut prose = String::new();
    let mut prose_line = 0;
    let mut fences = FenceTracker::default();

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;

        if fences.in_fence() {
            fences.update(raw_line);
            prose.push_str(raw_line);
            prose.push('\n');
            continue;
        }
        fences.update(raw_line);
        if fences.in_fence() {
            if prose.trim().is_empty() {
                prose.clear();
                prose_line = line_no;
            }
            prose.push_str(raw_line);
            prose.push('\n');
            continue;
        }

        let line = strip_inline_comments(raw_line);

        if line.trim().is_empty() {
            flush(&mut blocks, &mut prose, prose_line);
        } else if Marker::parse(&line).is_some() || parse_heading(&line).is_some() {
            flush(&mut blocks, &mut prose, prose_line);
            blocks.push(Block {
                text: line.trim().to_owned(),
                line: line_no,
            });
        } else {
            if prose.trim().is_empty() {
                prose.clear();
                prose_line = line_no;
            }
            prose.push_str(&line);
            prose.push('\n');
        }
    }
    flush(&mut blocks, &mut prose, prose_line);

    blocks
}

/// Map configured extension names to `pulldown-cmark` options.
///
/// An empty list enables every supported extension; unknown names are
/// ignored.
pub(crate) fn markdown_options(extensions: &[String]) -> Options {
    let supported = [
        ("tables", Options::ENABLE_TABLES),
        ("strikethrough", Options::ENABLE_STRIKETHROUGH),
        ("tasklists", Options::ENABLE_TASKLISTS),
        ("footnotes", Options::ENABLE_FOOTNOTES),
    ];

    let mut options = Options::empty();
    for (name, flag) in supported {
        if extensions.is_empty() || extensions.iter().any(|e| e == name) {
            options.insert(flag);
        }
    }
    options
}

/// Render one prose chunk to HTML.
pub(crate) fn render_markdown(text: &str, options: Options) -> String {
    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() * 2);
    html::push_html(&mut out, parser);
    out
}

/// Normalize output whitespace: strip trailing spaces and collapse blank
/// lines, leaving `<pre>` regions untouched.
pub(crate) fn beautify(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_pre = false;

    for line in fragment.lines() {
        if in_pre {
            out.push_str(line);
            out.push('\n');
            if line.contains("</pre>") {
                in_pre = false;
            }
            continue;
        }

        if line.contains("<pre") && !line.contains("</pre>") {
            in_pre = true;
            out.push_str(line.trim_end());
            out.push('\n');
            continue;
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        out.push_str(trimmed);
        out.push('\n');
    }

    out.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn marker_parse_open_with_args() {
        let marker = Marker::parse(r#"{image file-path="a.png"}"#).unwrap();
        assert_eq!(
            marker,
            Marker::Open {
                kind: "image".to_owned(),
                raw_args: r#"file-path="a.png""#.to_owned(),
            }
        );
    }

    #[test]
    fn marker_parse_bare_open() {
        let marker = Marker::parse("{comment}").unwrap();
        assert_eq!(
            marker,
            Marker::Open {
                kind: "comment".to_owned(),
                raw_args: String::new(),
            }
        );
    }

    #[test]
    fn marker_parse_close() {
        let marker = Marker::parse("{panel end}").unwrap();
        assert_eq!(
            marker,
            Marker::Close {
                kind: "panel".to_owned()
            }
        );
    }

    #[test]
    fn marker_requires_whole_line() {
        assert!(Marker::parse("before {panel end}").is_none());
        assert!(Marker::parse("{panel end} after").is_none());
    }

    #[test]
    fn marker_rejects_uppercase_kind() {
        assert!(Marker::parse("{Panel}").is_none());
    }

    #[test]
    fn heading_parse_levels_and_text() {
        assert_eq!(parse_heading("# Title"), Some((1, "Title")));
        assert_eq!(parse_heading("### Deep   "), Some((3, "Deep")));
        assert_eq!(parse_heading("## Closed ##"), Some((2, "Closed")));
        assert_eq!(parse_heading("#NoSpace"), None);
        assert_eq!(parse_heading("plain text"), None);
    }

    #[test]
    fn split_isolates_markers_and_headings() {
        let source = "# Title\n\nSome prose\nmore prose\n\n{panel type=\"note\"}\n\ninside\n\n{panel end}\n";
        let blocks = split_blocks(source);
        assert_eq!(
            texts(&blocks),
            vec![
                "# Title",
                "Some prose\nmore prose\n",
                "{panel type=\"note\"}",
                "inside\n",
                "{panel end}",
            ]
        );
        assert_eq!(blocks[2].line, 6);
        assert_eq!(blocks[4].line, 10);
    }

    #[test]
    fn split_isolates_adjacent_marker_without_blank_line() {
        let source = "{panel type=\"note\"}\nbody text\n{panel end}\n";
        let blocks = split_blocks(source);
        assert_eq!(
            texts(&blocks),
            vec!["{panel type=\"note\"}", "body text\n", "{panel end}"]
        );
    }

    #[test]
    fn split_leaves_fenced_markers_as_prose() {
        let source = "```\n{panel type=\"note\"}\n# not a heading\n```\n";
        let blocks = split_blocks(source);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].text.contains("{panel type=\"note\"}"));
    }

    #[test]
    fn split_strips_inline_comments() {
        let source = "Text {comment fix me later} more\n";
        let blocks = split_blocks(source);
        assert_eq!(texts(&blocks), vec!["Text  more\n"]);
    }

    #[test]
    fn split_drops_comment_only_lines() {
        let source = "before\n{comment internal note}\nafter\n";
        let blocks = split_blocks(source);
        // The comment line becomes blank and splits the prose block.
        assert_eq!(texts(&blocks), vec!["before\n", "after\n"]);
    }

    #[test]
    fn split_keeps_comment_close_marker() {
        let source = "{comment}\n\nhidden\n\n{comment end}\n";
        let blocks = split_blocks(source);
        assert_eq!(texts(&blocks), vec!["{comment}", "hidden\n", "{comment end}"]);
    }

    #[test]
    fn split_keeps_loose_lists_in_one_block_when_contiguous() {
        let source = "- one\n- two\n- three\n";
        let blocks = split_blocks(source);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn line_numbers_are_one_indexed() {
        let blocks = split_blocks("{video url=\"x\"}\n");
        assert_eq!(blocks[0].line, 1);
    }

    #[test]
    fn render_markdown_paragraph() {
        let html = render_markdown("hello *world*", markdown_options(&[]));
        assert_eq!(html.trim(), "<p>hello <em>world</em></p>");
    }

    #[test]
    fn render_markdown_table_extension_enabled() {
        let html = render_markdown(
            "| a | b |\n|---|---|\n| 1 | 2 |\n",
            markdown_options(&[]),
        );
        assert!(html.contains("<table>"));
    }

    #[test]
    fn extension_selection_disables_unlisted() {
        let options = markdown_options(&["tables".to_owned()]);
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(!options.contains(Options::ENABLE_STRIKETHROUGH));
    }

    #[test]
    fn beautify_collapses_blank_lines() {
        let input = "<p>a</p>\n\n\n<p>b</p>  \n";
        assert_eq!(beautify(input), "<p>a</p>\n<p>b</p>");
    }

    #[test]
    fn beautify_preserves_pre_content() {
        let input = "<pre><code>line one\n\nline three\n</code></pre>\n";
        let out = beautify(input);
        assert!(out.contains("line one\n\nline three"));
    }
}
