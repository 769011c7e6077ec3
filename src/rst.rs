// ABOUTME: reStructuredText support for the slidedeck compiler
// ABOUTME: Converts the commonly used subset of reST into flat HTML fragments

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::{Captures, Regex};
use std::sync::OnceLock;

const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Convert a reStructuredText document to HTML.
///
/// Section titles become flat `<hN>` elements (levels are assigned in order of
/// first appearance of each adornment style) and transitions become `<hr />`,
/// which is what the slide splitter expects.
pub fn to_html(source: &str) -> String {
    let lines: Vec<String> = source
        .replace("\r\n", "\n")
        .lines()
        .map(|l| l.replace('\t', "        ").trim_end().to_string())
        .collect();

    let mut converter = Converter::default();
    let mut out = String::new();
    converter.blocks(&lines, &mut out);
    out
}

#[derive(Default)]
struct Converter {
    styles: Vec<(char, bool)>,
}

impl Converter {
    fn heading_level(&mut self, style: (char, bool)) -> usize {
        match self.styles.iter().position(|s| *s == style) {
            Some(index) => index + 1,
            None => {
                self.styles.push(style);
                self.styles.len()
            }
        }
    }

    fn blocks(&mut self, lines: &[String], out: &mut String) {
        let mut i = 0;
        let mut literal_next = false;

        while i < lines.len() {
            let line = &lines[i];
            if line.is_empty() {
                i += 1;
                continue;
            }

            if literal_next && indent(line) > 0 {
                let (block, next) = indented_block(lines, i);
                out.push_str("<pre class=\"literal-block\">");
                out.push_str(&encode_text(&block.join("\n")));
                out.push_str("</pre>\n");
                literal_next = false;
                i = next;
                continue;
            }
            literal_next = false;

            // Overlined title
            if is_adornment(line, 2) && i + 2 < lines.len() {
                let title = lines[i + 1].trim();
                let under = &lines[i + 2];
                if !title.is_empty() && is_adornment(under, 2) && under == line {
                    let level = self.heading_level((adornment_char(line), true));
                    push_heading(out, level, title);
                    i += 3;
                    continue;
                }
            }

            // Underlined title
            if indent(line) == 0 && !is_adornment(line, 2) && i + 1 < lines.len() {
                let under = &lines[i + 1];
                if is_adornment(under, 2) && under.chars().count() >= line.chars().count() {
                    let level = self.heading_level((adornment_char(under), false));
                    push_heading(out, level, line.trim());
                    i += 2;
                    continue;
                }
            }

            // Transition
            if is_adornment(line, 4)
                && (i == 0 || lines[i - 1].is_empty())
                && (i + 1 == lines.len() || lines[i + 1].is_empty())
            {
                out.push_str("<hr />\n");
                i += 1;
                continue;
            }

            if let Some(rest) = line.strip_prefix(".. ") {
                let (body, next) = indented_block(lines, i + 1);
                self.explicit_markup(rest, &body, out);
                i = next;
                continue;
            }

            if indent(line) > 0 {
                let (block, next) = indented_block(lines, i);
                out.push_str("<blockquote>\n");
                self.blocks(&block, out);
                out.push_str("</blockquote>\n");
                i = next;
                continue;
            }

            if let Some(marker) = list_marker(line) {
                i = self.list(lines, i, marker, out);
                continue;
            }

            // Paragraph
            let start = i;
            while i < lines.len() && !lines[i].is_empty() {
                i += 1;
            }
            let mut text = lines[start..i]
                .iter()
                .map(|l| l.trim())
                .collect::<Vec<_>>()
                .join("\n");
            if text.ends_with("::") {
                literal_next = true;
                text.truncate(text.len() - 2);
                let trimmed_len = text.trim_end().len();
                if trimmed_len < text.len() {
                    text.truncate(trimmed_len);
                } else {
                    text.push(':');
                }
            }
            if !text.is_empty() {
                out.push_str("<p>");
                out.push_str(&inline(&text));
                out.push_str("</p>\n");
            }
        }
    }

    fn list(&mut self, lines: &[String], mut i: usize, marker: ListMarker, out: &mut String) -> usize {
        let (open, close) = if marker.ordered {
            ("<ol>\n", "</ol>\n")
        } else {
            ("<ul>\n", "</ul>\n")
        };
        out.push_str(open);

        while i < lines.len() {
            let Some(current) = list_marker(&lines[i]) else {
                break;
            };
            if current.ordered != marker.ordered || current.bullet != marker.bullet {
                break;
            }

            let mut item = vec![lines[i][current.width..].to_string()];
            i += 1;
            while i < lines.len() {
                let line = &lines[i];
                if line.is_empty() {
                    let continues = lines[i..]
                        .iter()
                        .find(|l| !l.is_empty())
                        .map_or(false, |l| indent(l) >= current.width);
                    if !continues {
                        break;
                    }
                    item.push(String::new());
                } else if indent(line) >= current.width {
                    item.push(line[current.width..].to_string());
                } else {
                    break;
                }
                i += 1;
            }

            let mut body = String::new();
            self.blocks(&item, &mut body);
            out.push_str("<li>");
            out.push_str(unwrap_single_paragraph(&body));
            out.push_str("</li>\n");

            while i < lines.len() && lines[i].is_empty() {
                i += 1;
            }
        }

        out.push_str(close);
        i
    }

    fn explicit_markup(&mut self, markup: &str, body: &[String], out: &mut String) {
        static DIRECTIVE_RE: OnceLock<Regex> = OnceLock::new();
        let directive_re = DIRECTIVE_RE
            .get_or_init(|| Regex::new(r"^([a-zA-Z][\w-]*)::\s*(.*)$").expect("valid regex"));

        // Comments and hyperlink targets produce no output
        let Some(caps) = directive_re.captures(markup) else {
            return;
        };
        let name = caps[1].to_lowercase();
        let argument = caps[2].trim();

        let mut options = Vec::new();
        let mut content_start = 0;
        for line in body {
            match parse_option(line) {
                Some(option) => {
                    options.push(option);
                    content_start += 1;
                }
                None => break,
            }
        }
        let content: Vec<String> = body[content_start..]
            .iter()
            .skip_while(|l| l.is_empty())
            .cloned()
            .collect();

        match name.as_str() {
            "image" | "figure" => {
                let alt = options
                    .iter()
                    .find(|(k, _)| k == "alt")
                    .map(|(_, v)| v.as_str())
                    .unwrap_or(argument);
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" />\n",
                    encode_double_quoted_attribute(argument),
                    encode_double_quoted_attribute(alt)
                ));
            }
            "code" | "code-block" | "sourcecode" => {
                let class = if argument.is_empty() {
                    String::new()
                } else {
                    format!(
                        " class=\"language-{}\"",
                        encode_double_quoted_attribute(argument)
                    )
                };
                out.push_str(&format!(
                    "<pre><code{}>{}\n</code></pre>\n",
                    class,
                    encode_text(&content.join("\n"))
                ));
            }
            "note" | "warning" | "tip" | "important" | "attention" | "caution" | "hint" => {
                out.push_str(&format!(
                    "<div class=\"admonition {}\">\n<p class=\"admonition-title\">{}</p>\n",
                    name,
                    capitalize(&name)
                ));
                let mut inner = Vec::new();
                if !argument.is_empty() {
                    inner.push(argument.to_string());
                }
                inner.extend(content);
                self.blocks(&inner, out);
                out.push_str("</div>\n");
            }
            _ => {
                out.push_str(&format!("<div class=\"{}\">\n", encode_double_quoted_attribute(&name)));
                self.blocks(&content, out);
                out.push_str("</div>\n");
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ListMarker {
    ordered: bool,
    bullet: char,
    width: usize,
}

fn list_marker(line: &str) -> Option<ListMarker> {
    static ENUM_RE: OnceLock<Regex> = OnceLock::new();
    let enum_re = ENUM_RE.get_or_init(|| Regex::new(r"^(\d+|#)\.( +)\S").expect("valid regex"));

    let mut chars = line.chars();
    let first = chars.next()?;
    if matches!(first, '-' | '*' | '+') && chars.next() == Some(' ') {
        let spaces = line[1..].chars().take_while(|c| *c == ' ').count();
        if line.len() > 1 + spaces {
            return Some(ListMarker {
                ordered: false,
                bullet: first,
                width: 1 + spaces,
            });
        }
    }

    enum_re.captures(line).map(|caps| ListMarker {
        ordered: true,
        bullet: '.',
        width: caps[1].len() + 1 + caps[2].len(),
    })
}

fn parse_option(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix(':')?;
    let end = rest.find(':')?;
    let key = rest[..end].trim();
    if key.is_empty() || key.contains(' ') {
        return None;
    }
    Some((key.to_string(), rest[end + 1..].trim().to_string()))
}

/// Leading spaces; tabs are expanded before this runs
fn indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_adornment(line: &str, min_len: usize) -> bool {
    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    ADORNMENT_CHARS.contains(first)
        && line.chars().count() >= min_len
        && chars.all(|c| c == first)
}

fn adornment_char(line: &str) -> char {
    line.chars().next().unwrap_or('=')
}

/// Collect an indented block starting at `start`, dedented by its smallest indent
fn indented_block(lines: &[String], start: usize) -> (Vec<String>, usize) {
    let mut end = start;
    while end < lines.len() && (lines[end].is_empty() || indent(&lines[end]) > 0) {
        end += 1;
    }
    let mut last = end;
    while last > start && lines[last - 1].is_empty() {
        last -= 1;
    }

    let block = &lines[start..last];
    let min_indent = block
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| indent(l))
        .min()
        .unwrap_or(0);
    let dedented = block
        .iter()
        .map(|l| if l.is_empty() { String::new() } else { l[min_indent..].to_string() })
        .collect();
    (dedented, end)
}

fn push_heading(out: &mut String, level: usize, title: &str) {
    let level = level.min(6);
    out.push_str(&format!("<h{level}>{}</h{level}>\n", inline(title)));
}

fn unwrap_single_paragraph(body: &str) -> &str {
    let trimmed = body.trim_end();
    match trimmed
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
    {
        Some(inner) if !inner.contains("<p>") => inner,
        _ => trimmed,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Inline markup: literals, strong, emphasis and hyperlink references
fn inline(text: &str) -> String {
    static INLINE_RE: OnceLock<Regex> = OnceLock::new();
    let inline_re = INLINE_RE.get_or_init(|| {
        Regex::new(concat!(
            r"``(?P<literal>.+?)``",
            r"|\*\*(?P<strong>[^\s*](?:.*?[^\s*])?)\*\*",
            r"|\*(?P<emphasis>[^\s*](?:[^*]*?[^\s*])?)\*",
            r"|`(?P<label>[^`<]+?)\s*<(?P<target>[^>`]+)>`__?",
            r"|`(?P<interpreted>[^`]+)`",
        ))
        .expect("valid regex")
    });

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in inline_re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&encode_text(&text[last..whole.start()]));
        out.push_str(&inline_element(&caps));
        last = whole.end();
    }
    out.push_str(&encode_text(&text[last..]));
    out
}

fn inline_element(caps: &Captures<'_>) -> String {
    if let Some(m) = caps.name("literal") {
        format!("<code>{}</code>", encode_text(m.as_str()))
    } else if let Some(m) = caps.name("strong") {
        format!("<strong>{}</strong>", encode_text(m.as_str()))
    } else if let Some(m) = caps.name("emphasis") {
        format!("<em>{}</em>", encode_text(m.as_str()))
    } else if let (Some(label), Some(target)) = (caps.name("label"), caps.name("target")) {
        format!(
            "<a href=\"{}\">{}</a>",
            encode_double_quoted_attribute(target.as_str().trim()),
            encode_text(label.as_str())
        )
    } else if let Some(m) = caps.name("interpreted") {
        format!("<cite>{}</cite>", encode_text(m.as_str()))
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_levels_follow_first_appearance() {
        let html = to_html("Title\n=====\n\nSub\n---\n\nOther\n=====\n");
        assert_eq!(html, "<h1>Title</h1>\n<h2>Sub</h2>\n<h1>Other</h1>\n");
    }

    #[test]
    fn test_overlined_title_is_its_own_style() {
        let html = to_html("=====\nTop\n=====\n\nNext\n====\n");
        assert_eq!(html, "<h1>Top</h1>\n<h2>Next</h2>\n");
    }

    #[test]
    fn test_transition_and_paragraphs() {
        let html = to_html("First\n=====\n\nfoo\nbar\n\n----\n\nSecond\n======\n");
        assert_eq!(
            html,
            "<h1>First</h1>\n<p>foo\nbar</p>\n<hr />\n<h1>Second</h1>\n"
        );
    }

    #[test]
    fn test_lists() {
        let html = to_html("- one\n- two\n  continued\n\n1. first\n2. second\n");
        assert_eq!(
            html,
            "<ul>\n<li>one</li>\n<li>two\ncontinued</li>\n</ul>\n<ol>\n<li>first</li>\n<li>second</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_literal_block() {
        let html = to_html("Example::\n\n    x < 1\n    y\n\nafter\n");
        assert_eq!(
            html,
            "<p>Example:</p>\n<pre class=\"literal-block\">x &lt; 1\ny</pre>\n<p>after</p>\n"
        );
    }

    #[test]
    fn test_directives() {
        let html = to_html(".. image:: pics/cat.png\n   :alt: a cat\n\n.. code-block:: python\n\n    print(1)\n\n.. a comment\n");
        assert_eq!(
            html,
            "<img src=\"pics/cat.png\" alt=\"a cat\" />\n<pre><code class=\"language-python\">print(1)\n</code></pre>\n"
        );
    }

    #[test]
    fn test_inline_markup() {
        let html = to_html("**bold** and *it* with ``a<b`` and `site <http://example.com>`_\n");
        assert_eq!(
            html,
            "<p><strong>bold</strong> and <em>it</em> with <code>a&lt;b</code> and <a href=\"http://example.com\">site</a></p>\n"
        );
    }

    #[test]
    fn test_macro_directives_survive() {
        let html = to_html(".notes: remember this\n\n.fx: blah blob\n");
        assert_eq!(html, "<p>.notes: remember this</p>\n<p>.fx: blah blob</p>\n");
    }

    #[test]
    fn test_blockquote() {
        let html = to_html("text\n\n    quoted\n");
        assert_eq!(html, "<p>text</p>\n<blockquote>\n<p>quoted</p>\n</blockquote>\n");
    }

    #[test]
    fn test_unicode_whitespace_indent() {
        let html = to_html("text\n\n  a\n\u{3000}b\n");
        assert!(html.starts_with("<p>text</p>\n"));
        assert!(html.contains('a'));
        assert!(html.contains("b</p>"));

        let html = to_html("- item\n  \u{a0}more\n");
        assert!(html.contains("<li>"));
    }

    #[test]
    fn test_non_ascii_title() {
        let html = to_html("Заголовок\n=========\n\nрусский текст\n");
        assert_eq!(html, "<h1>Заголовок</h1>\n<p>русский текст</p>\n");
    }
}
