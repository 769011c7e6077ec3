// ABOUTME: Slide segmentation for the slidedeck compiler
// ABOUTME: Splits rendered HTML into slides and derives title, header, content and presenter notes

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// One presentation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Slide {
    /// 1-based position in the deck, assigned once empty fragments are dropped
    pub number: usize,
    /// Inner markup of the first heading, if the slide has one
    pub title: Option<String>,
    pub level: Option<u32>,
    /// The full heading element
    pub header: Option<String>,
    pub content: String,
    pub presenter_notes: Option<String>,
    pub classes: Vec<String>,
    pub source: BTreeMap<String, String>,
    /// Notes markup cut out of the slide, kept even when presenter notes are off
    #[serde(skip)]
    pub raw_notes: Option<String>,
}

impl Slide {
    /// Title if present and not blank
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Append classes, skipping ones already present
    pub fn add_classes<I, S>(&mut self, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for class in classes {
            let class = class.into();
            if !class.is_empty() && !self.classes.contains(&class) {
                self.classes.push(class);
            }
        }
    }
}

fn tag_re() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^>]*?(/?)>").expect("valid regex")
    })
}

fn notes_heading_re() -> &'static Regex {
    static NOTES_RE: OnceLock<Regex> = OnceLock::new();
    NOTES_RE.get_or_init(|| {
        Regex::new(r"(?is)<h[1-6][^>]*>\s*presenter\s+notes\s*</h[1-6]>").expect("valid regex")
    })
}

/// Whitespace or comments only
fn is_blank(fragment: &str) -> bool {
    static COMMENT_RE: OnceLock<Regex> = OnceLock::new();
    let comment_re = COMMENT_RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
    comment_re.replace_all(fragment, "").trim().is_empty()
}

fn heading_level(tag: &str) -> Option<u32> {
    let digits = tag.strip_prefix('h').or_else(|| tag.strip_prefix('H'))?;
    match digits.parse::<u32>() {
        Ok(level @ 1..=6) => Some(level),
        _ => None,
    }
}

/// Split a parsed HTML document into slide fragments.
///
/// A new slide starts at every horizontal rule and at every top-level heading
/// whose level is at most `split_level`. Presenter notes headings never start
/// a slide. Tags inside comments are ignored, and a fragment holding only
/// comments stays with the slide that follows it. Blank fragments are dropped.
pub fn split_slides(html: &str, split_level: u32) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for caps in tag_re().captures_iter(html) {
        // Comments match without a tag name and never change depth
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let closing = caps.get(1).map_or(false, |m| !m.as_str().is_empty());
        let self_closing = caps.get(3).map_or(false, |m| !m.as_str().is_empty());
        let name = name.as_str().to_lowercase();

        if closing {
            depth = depth.saturating_sub(1);
            continue;
        }

        if depth == 0 {
            if name == "hr" {
                fragments.push(&html[start..whole.start()]);
                start = whole.end();
            } else if heading_level(&name).map_or(false, |level| level <= split_level)
                && notes_heading_re()
                    .find_at(html, whole.start())
                    .map_or(true, |m| m.start() != whole.start())
            {
                let pending = &html[start..whole.start()];
                if !is_blank(pending) {
                    fragments.push(pending);
                    start = whole.start();
                }
            }
        }

        if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            depth += 1;
        }
    }
    fragments.push(&html[start..]);

    fragments
        .into_iter()
        .filter(|f| !is_blank(f))
        .map(str::trim)
        .map(str::to_string)
        .collect()
}

/// Derive slide fields from one fragment.
///
/// The first heading gives title, level and header; a presenter notes heading
/// and everything after it is cut out of the content. With `presenter_notes`
/// off the notes are still cut out but only kept in `raw_notes`.
pub fn slide_vars(fragment: &str, presenter_notes: bool) -> Slide {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    let title_re = TITLE_RE
        .get_or_init(|| Regex::new(r"(?s)<h([1-6])\b[^>]*>(.*?)</h[1-6]>").expect("valid regex"));

    let mut body = fragment;
    let mut raw_notes = None;
    if let Some(found) = notes_heading_re().find(fragment) {
        raw_notes = Some(fragment[found.end()..].trim().to_string());
        body = &fragment[..found.start()];
    }

    let mut slide = Slide {
        presenter_notes: if presenter_notes { raw_notes.clone() } else { None },
        raw_notes,
        ..Slide::default()
    };

    match title_re.captures(body) {
        Some(caps) => {
            let (Some(whole), Some(title)) = (caps.get(0), caps.get(2)) else {
                slide.content = body.trim().to_string();
                return slide;
            };
            slide.header = Some(whole.as_str().to_string());
            slide.title = Some(title.as_str().trim().to_string());
            slide.level = caps[1].parse().ok();

            let before = body[..whole.start()].trim();
            let after = body[whole.end()..].trim();
            slide.content = match (before.is_empty(), after.is_empty()) {
                (true, _) => after.to_string(),
                (false, true) => before.to_string(),
                (false, false) => format!("{}\n{}", before, after),
            };
        }
        None => slide.content = body.trim().to_string(),
    }

    slide
}
