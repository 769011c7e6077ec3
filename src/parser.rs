// ABOUTME: Source format resolution for the slidedeck compiler
// ABOUTME: Maps file extensions to markup dialects and converts sources to HTML

use crate::errors::{DeckError, Result};
use crate::rst;
use comrak::{markdown_to_html, ComrakOptions};
use log::debug;
use std::fmt;
use std::path::Path;

/// Markup syntax of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Markdown,
    RestructuredText,
}

impl Dialect {
    /// Resolve a dialect from an extension such as `.md`
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            ".md" | ".markdown" => Ok(Dialect::Markdown),
            ".rst" => Ok(Dialect::RestructuredText),
            _ => Err(DeckError::UnsupportedFormat(extension.to_string())),
        }
    }

    /// Resolve a dialect from a file path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        Self::from_extension(&extension)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Markdown => "markdown",
            Dialect::RestructuredText => "restructuredtext",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts source text of one dialect to HTML
pub struct Parser {
    dialect: Dialect,
    markdown_options: ComrakOptions,
}

impl Parser {
    /// Create a parser for the given extension (`.md`, `.markdown`, `.rst`)
    pub fn new(extension: &str) -> Result<Self> {
        let dialect = Dialect::from_extension(extension)?;
        Ok(Self::for_dialect(dialect))
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        let mut markdown_options = ComrakOptions::default();
        markdown_options.render.unsafe_ = true; // Allow raw HTML
        Self {
            dialect,
            markdown_options,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Enable optional Markdown extensions by name.
    ///
    /// Returns the names that were not recognised so the caller can report them.
    pub fn enable_extensions(&mut self, names: &[String]) -> Vec<String> {
        let mut unknown = Vec::new();
        for name in names {
            let extension = &mut self.markdown_options.extension;
            match name.trim().to_lowercase().as_str() {
                "tables" | "table" => extension.table = true,
                "strikethrough" => extension.strikethrough = true,
                "autolink" => extension.autolink = true,
                "tasklist" => extension.tasklist = true,
                "footnotes" => extension.footnotes = true,
                "superscript" => extension.superscript = true,
                "description_lists" => extension.description_lists = true,
                "header_ids" => extension.header_ids = Some(String::new()),
                "" => {}
                _ => unknown.push(name.clone()),
            }
        }
        unknown
    }

    /// Convert source text to an HTML document fragment
    pub fn parse(&self, text: &str) -> String {
        debug!("Parsing {} bytes of {}", text.len(), self.dialect);
        match self.dialect {
            Dialect::Markdown => markdown_to_html(text, &self.markdown_options),
            Dialect::RestructuredText => rst::to_html(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(Parser::new(".md").unwrap().dialect().name(), "markdown");
        assert_eq!(Parser::new(".markdown").unwrap().dialect().name(), "markdown");
        assert_eq!(
            Parser::new(".rst").unwrap().dialect().name(),
            "restructuredtext"
        );
        assert!(matches!(
            Parser::new(".txt"),
            Err(DeckError::UnsupportedFormat(ref ext)) if ext == ".txt"
        ));
    }

    #[test]
    fn test_extension_case_and_paths() {
        assert_eq!(Dialect::from_extension(".MD").unwrap(), Dialect::Markdown);
        assert_eq!(
            Dialect::from_path(Path::new("talk/slides.rst")).unwrap(),
            Dialect::RestructuredText
        );
        assert!(Dialect::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_markdown_keeps_raw_html() {
        let parser = Parser::new(".md").unwrap();
        let html = parser.parse("# Title\n\n<div class=\"x\">raw</div>\n\n---\n\nnext\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<div class=\"x\">raw</div>"));
        assert!(html.contains("<hr />"));
    }

    #[test]
    fn test_unknown_extensions_reported() {
        let mut parser = Parser::new(".md").unwrap();
        let unknown = parser.enable_extensions(&["tables".to_string(), "smarty".to_string()]);
        assert_eq!(unknown, vec!["smarty".to_string()]);

        let html = parser.parse("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }
}
