// ABOUTME: Content macros for the slidedeck compiler
// ABOUTME: Registry of ordered HTML rewriting units that also extract per-slide side data

use crate::config::{Config, Severity};
use crate::errors::{DeckError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use url::Url;

/// Names of the built-in macros, in their default execution order
pub const DEFAULT_MACROS: &[&str] = &["code", "embed_images", "fix_image_paths", "fx", "notes", "qr"];

/// What a macro sees besides the content it rewrites
pub struct MacroContext<'a> {
    /// Source document the content came from, used to resolve relative paths
    pub source: Option<&'a Path>,
    /// Options and user logger of the running compilation
    pub config: &'a Config,
}

impl<'a> MacroContext<'a> {
    pub fn new(source: Option<&'a Path>, config: &'a Config) -> Self {
        Self { source, config }
    }

    fn source_dir(&self) -> Option<PathBuf> {
        let source = self.source?;
        let absolute = fs::canonicalize(source).ok().or_else(|| {
            std::env::current_dir().ok().map(|cwd| cwd.join(source))
        })?;
        absolute.parent().map(Path::to_path_buf)
    }
}

/// Rewritten content plus whatever the macro extracted from it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroOutput {
    pub content: String,
    pub side_data: Vec<String>,
}

impl MacroOutput {
    pub fn unchanged(content: &str) -> Self {
        Self {
            content: content.to_string(),
            side_data: Vec::new(),
        }
    }
}

/// A content rewriting unit applied to every slide
pub trait Macro: Send + Sync {
    /// Unique name used for registration and lookup
    fn name(&self) -> &str;

    fn process(&self, content: &str, ctx: &MacroContext<'_>) -> Result<MacroOutput>;
}

/// Ordered set of macros applied to slide content
#[derive(Default)]
pub struct MacroRegistry {
    macros: Vec<Box<dyn Macro>>,
}

impl MacroRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in macro in default order
    pub fn with_defaults(config: &Config) -> Self {
        let macros = DEFAULT_MACROS
            .iter()
            .filter_map(|name| builtin(name, config))
            .collect();
        Self { macros }
    }

    /// Registry holding the named built-in macros in the given order
    pub fn from_names<S: AsRef<str>>(names: &[S], config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        for name in names {
            registry.register_named(name.as_ref(), config)?;
        }
        Ok(registry)
    }

    /// Append a macro; names must be unique
    pub fn register(&mut self, item: Box<dyn Macro>) -> Result<()> {
        if self.contains(item.name()) {
            return Err(DeckError::DuplicateMacro(item.name().to_string()));
        }
        debug!("Registering macro '{}'", item.name());
        self.macros.push(item);
        Ok(())
    }

    /// Append a built-in macro by name
    pub fn register_named(&mut self, name: &str, config: &Config) -> Result<()> {
        let item = builtin(name, config).ok_or_else(|| {
            DeckError::InvalidExtension(format!("'{}' is not a known macro", name))
        })?;
        self.register(item)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.iter().any(|m| m.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.macros.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Thread content through every macro in registration order,
    /// concatenating their side data.
    pub fn process(&self, content: &str, ctx: &MacroContext<'_>) -> Result<MacroOutput> {
        let mut result = MacroOutput::unchanged(content);
        for item in &self.macros {
            let output = item.process(&result.content, ctx)?;
            result.content = output.content;
            result.side_data.extend(output.side_data);
        }
        Ok(result)
    }
}

/// Instantiate a built-in macro by name
pub fn builtin(name: &str, config: &Config) -> Option<Box<dyn Macro>> {
    let item: Box<dyn Macro> = match name {
        "code" => Box::new(CodeMacro),
        "embed_images" => Box::new(EmbedImagesMacro::new(config.embed)),
        "fix_image_paths" => Box::new(FixImagePathsMacro::new(config.embed || config.relative)),
        "fx" => Box::new(FxMacro),
        "notes" => Box::new(NotesMacro),
        "qr" => Box::new(QrMacro),
        _ => return None,
    };
    Some(item)
}

fn img_src_re() -> &'static Regex {
    static IMG_SRC_RE: OnceLock<Regex> = OnceLock::new();
    IMG_SRC_RE.get_or_init(|| Regex::new(r#"(<img\b[^>]*?\bsrc=")([^"]*)(")"#).expect("valid regex"))
}

fn has_scheme(src: &str) -> bool {
    Url::parse(src).is_ok()
}

/// Rewrites `.notes:` paragraphs into styled notes paragraphs
pub struct NotesMacro;

impl Macro for NotesMacro {
    fn name(&self) -> &str {
        "notes"
    }

    fn process(&self, content: &str, _ctx: &MacroContext<'_>) -> Result<MacroOutput> {
        static NOTES_RE: OnceLock<Regex> = OnceLock::new();
        let notes_re = NOTES_RE
            .get_or_init(|| Regex::new(r"<p>\.notes:\s?(.*?)</p>").expect("valid regex"));

        if !notes_re.is_match(content) {
            return Ok(MacroOutput::unchanged(content));
        }
        Ok(MacroOutput {
            content: notes_re
                .replace_all(content, r#"<p class="notes">${1}</p>"#)
                .into_owned(),
            side_data: vec!["has_notes".to_string()],
        })
    }
}

/// Removes `.fx:` paragraphs and yields their tokens as slide classes
pub struct FxMacro;

impl Macro for FxMacro {
    fn name(&self) -> &str {
        "fx"
    }

    fn process(&self, content: &str, _ctx: &MacroContext<'_>) -> Result<MacroOutput> {
        static FX_RE: OnceLock<Regex> = OnceLock::new();
        let fx_re =
            FX_RE.get_or_init(|| Regex::new(r"(?s)<p>\.fx:\s?(.*?)</p>\n?").expect("valid regex"));

        let side_data = fx_re
            .captures_iter(content)
            .flat_map(|caps| {
                caps[1]
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(MacroOutput {
            content: fx_re.replace_all(content, "").into_owned(),
            side_data,
        })
    }
}

/// Turns `.qr: SIZE|DATA` paragraphs into QR code images
pub struct QrMacro;

impl Macro for QrMacro {
    fn name(&self) -> &str {
        "qr"
    }

    fn process(&self, content: &str, _ctx: &MacroContext<'_>) -> Result<MacroOutput> {
        static QR_RE: OnceLock<Regex> = OnceLock::new();
        let qr_re =
            QR_RE.get_or_init(|| Regex::new(r"<p>\.qr:\s?(\d*?)\|(.*?)</p>").expect("valid regex"));

        if !qr_re.is_match(content) {
            return Ok(MacroOutput::unchanged(content));
        }

        let content = qr_re.replace_all(content, |caps: &Captures<'_>| {
            let size = if caps[1].is_empty() { "200" } else { &caps[1] };
            let data: String = url::form_urlencoded::byte_serialize(caps[2].as_bytes()).collect();
            format!(
                "<p class=\"qr\"><img src=\"https://chart.googleapis.com/chart?chs={size}x{size}&amp;cht=qr&amp;chl={data}&amp;chf=bg,s,00000000&amp;choe=UTF-8\" alt=\"{}\" /></p>",
                &caps[2]
            )
        });

        Ok(MacroOutput {
            content: content.into_owned(),
            side_data: vec!["has_qr".to_string()],
        })
    }
}

/// Marks code blocks with their language.
///
/// A block whose first line is `!lang` loses the marker line and gets a
/// `language-lang` class instead.
pub struct CodeMacro;

impl Macro for CodeMacro {
    fn name(&self) -> &str {
        "code"
    }

    fn process(&self, content: &str, _ctx: &MacroContext<'_>) -> Result<MacroOutput> {
        static MARKER_RE: OnceLock<Regex> = OnceLock::new();
        let marker_re = MARKER_RE
            .get_or_init(|| Regex::new(r"<pre><code>\s?!([\w+#.-]+)[^\n]*\n").expect("valid regex"));

        if !content.contains("<pre") {
            return Ok(MacroOutput::unchanged(content));
        }

        let content = marker_re.replace_all(content, r#"<pre><code class="language-${1}">"#);
        let side_data = if content.contains("<pre><code") {
            vec!["has_code".to_string()]
        } else {
            Vec::new()
        };

        Ok(MacroOutput {
            content: content.into_owned(),
            side_data,
        })
    }
}

/// Rewrites relative image paths into `file://` URLs anchored at the source directory
pub struct FixImagePathsMacro {
    skip: bool,
}

impl FixImagePathsMacro {
    /// `skip` leaves every path untouched (embedded or relative output)
    pub fn new(skip: bool) -> Self {
        Self { skip }
    }
}

impl Macro for FixImagePathsMacro {
    fn name(&self) -> &str {
        "fix_image_paths"
    }

    fn process(&self, content: &str, ctx: &MacroContext<'_>) -> Result<MacroOutput> {
        if self.skip {
            return Ok(MacroOutput::unchanged(content));
        }
        let Some(base) = ctx
            .source_dir()
            .and_then(|dir| Url::from_directory_path(dir).ok())
        else {
            return Ok(MacroOutput::unchanged(content));
        };

        let content = img_src_re().replace_all(content, |caps: &Captures<'_>| {
            let src = &caps[2];
            if src.is_empty() || src.starts_with('#') || has_scheme(src) {
                return caps[0].to_string();
            }
            match base.join(src) {
                Ok(url) => format!("{}{}{}", &caps[1], url, &caps[3]),
                Err(_) => caps[0].to_string(),
            }
        });

        Ok(MacroOutput::unchanged(&content))
    }
}

/// Inlines local images as base64 data URIs when embedding is on
pub struct EmbedImagesMacro {
    embed: bool,
}

impl EmbedImagesMacro {
    pub fn new(embed: bool) -> Self {
        Self { embed }
    }
}

fn image_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_string_lossy().to_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => return None,
    };
    Some(mime)
}

impl Macro for EmbedImagesMacro {
    fn name(&self) -> &str {
        "embed_images"
    }

    fn process(&self, content: &str, ctx: &MacroContext<'_>) -> Result<MacroOutput> {
        if !self.embed {
            return Ok(MacroOutput::unchanged(content));
        }

        let base = ctx.source_dir().unwrap_or_default();
        let mut result = String::with_capacity(content.len());
        let mut last = 0;

        for caps in img_src_re().captures_iter(content) {
            let (Some(whole), Some(src)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let src = src.as_str();
            if src.is_empty() || has_scheme(src) {
                continue;
            }

            let path = base.join(src);
            let Some(mime) = image_mime_type(&path) else {
                ctx.config.log(
                    &format!("Unknown image type, not embedding: {}", src),
                    Severity::Warning,
                )?;
                continue;
            };
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(_) => {
                    ctx.config
                        .log(&format!("Image not found: {}", path.display()), Severity::Warning)?;
                    continue;
                }
            };

            result.push_str(&content[last..whole.start()]);
            result.push_str(&caps[1]);
            result.push_str(&format!("data:{};base64,{}", mime, STANDARD.encode(bytes)));
            result.push_str(&caps[3]);
            last = whole.end();
        }
        result.push_str(&content[last..]);

        Ok(MacroOutput::unchanged(&result))
    }
}
