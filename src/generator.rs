// ABOUTME: Deck generation pipeline for the slidedeck compiler
// ABOUTME: Reads and decodes a source, slices it into slides, applies macros, builds the TOC and renders

use crate::assets::{Asset, Assets};
use crate::config::{Config, Severity};
use crate::encoding::{decode_source, encode_output, resolve_encoding};
use crate::errors::Result;
use crate::macros::{Macro, MacroContext, MacroOutput, MacroRegistry};
use crate::parser::{Dialect, Parser};
use crate::render::{head_title, render_template, TemplateVars, DEFAULT_TEMPLATE};
use crate::slides::{slide_vars, split_slides, Slide};
use crate::toc::{TocBuilder, TocNode};
use crate::utils;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Compiles one source document into a presentation
pub struct Generator {
    source: PathBuf,
    config: Config,
    parser: Parser,
    text: String,
    macros: MacroRegistry,
    assets: Assets,
}

impl Generator {
    /// Load and decode a source document.
    ///
    /// Fails on a missing or unreadable source, an unsupported extension, an
    /// unknown encoding label or an unknown macro name, before any parsing.
    pub fn new(source: impl AsRef<Path>, config: Config) -> Result<Self> {
        let source = source.as_ref().to_path_buf();
        info!("Loading presentation source: {:?}", source);

        utils::validate_file_exists(&source)?;
        let dialect = Dialect::from_path(&source)?;
        let encoding = config
            .encoding
            .as_deref()
            .map(resolve_encoding)
            .transpose()?;

        let macros = match &config.macros {
            Some(names) => MacroRegistry::from_names(names.as_slice(), &config)?,
            None => MacroRegistry::with_defaults(&config),
        };

        let mut parser = Parser::for_dialect(dialect);
        for unknown in parser.enable_extensions(&config.markdown_extensions) {
            config.log(
                &format!("Ignoring unknown markdown extension '{}'", unknown),
                Severity::Warning,
            )?;
        }

        let bytes = fs::read(&source)?;
        let decoded = decode_source(&bytes, encoding);
        if decoded.malformed {
            config.log(
                &format!(
                    "{:?} is not valid in its source encoding, decoded as {}",
                    source,
                    decoded.encoding.name()
                ),
                Severity::Warning,
            )?;
        }
        let text = decoded.text.into_owned();

        config.log(
            &format!("Adding   {:?} ({})", source, dialect),
            Severity::Notice,
        )?;

        Ok(Self {
            source,
            config,
            parser,
            text,
            macros,
            assets: Assets::new(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dialect(&self) -> Dialect {
        self.parser.dialect()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decoded source text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn destination_file(&self) -> &Path {
        &self.config.destination_file
    }

    pub fn macros(&self) -> &MacroRegistry {
        &self.macros
    }

    /// Add a macro after the already registered ones
    pub fn register_macro(&mut self, item: Box<dyn Macro>) -> Result<()> {
        self.macros.register(item)
    }

    /// Add a built-in macro by name
    pub fn register_named_macro(&mut self, name: &str) -> Result<()> {
        self.macros.register_named(name, &self.config)
    }

    /// Run every registered macro over a piece of content
    pub fn process_macros(&self, content: &str) -> Result<MacroOutput> {
        self.process_macros_for(content, None)
    }

    fn process_macros_for(&self, content: &str, source: Option<&Path>) -> Result<MacroOutput> {
        let ctx = MacroContext::new(source, &self.config);
        self.macros.process(content, &ctx)
    }

    pub fn add_user_css(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.assets.add_user_css(path.as_ref())
    }

    pub fn add_user_js(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.assets.add_user_js(path.as_ref())
    }

    pub fn user_css(&self) -> &[Asset] {
        &self.assets.user_css
    }

    pub fn user_js(&self) -> &[Asset] {
        &self.assets.user_js
    }

    /// Build one slide from an HTML fragment.
    ///
    /// Header and content go through the macros; only the content's side data
    /// becomes slide classes, after the configured default classes.
    pub fn get_slide_vars(&self, fragment: &str, source: Option<&Path>) -> Result<Slide> {
        let mut slide = slide_vars(fragment, self.config.presenter_notes);

        if let Some(header) = slide.header.take() {
            slide.header = Some(self.process_macros_for(&header, source)?.content);
        }

        slide.add_classes(self.config.default_classes.iter().cloned());
        if !slide.content.is_empty() {
            let output = self.process_macros_for(&slide.content, source)?;
            slide.content = output.content;
            slide.add_classes(output.side_data);
        }

        if let Some(source) = source {
            slide.source.insert(
                "rel_path".to_string(),
                source.to_string_lossy().into_owned(),
            );
            slide.source.insert(
                "abs_path".to_string(),
                utils::get_absolute_path(source).to_string_lossy().into_owned(),
            );
        }

        Ok(slide)
    }

    /// Parse the source and build the numbered slide sequence
    pub fn slides(&self) -> Result<Vec<Slide>> {
        let html = self.parser.parse(&self.text);
        let mut slides = Vec::new();

        for fragment in split_slides(&html, self.config.split_level) {
            let mut slide = self.get_slide_vars(&fragment, Some(&self.source))?;
            if slide.header.is_none() && slide.content.is_empty() && slide.raw_notes.is_none() {
                continue;
            }
            slide.number = slides.len() + 1;
            slides.push(slide);
        }

        if slides.is_empty() {
            self.config
                .log(&format!("No slides found in {:?}", self.source), Severity::Warning)?;
        }
        Ok(slides)
    }

    /// Outline of the deck.
    ///
    /// Slides with a heading no deeper than `max_toc_level` add their title;
    /// every other slide adds a `-` placeholder at level 1.
    pub fn build_toc(&self, slides: &[Slide]) -> Vec<TocNode> {
        let mut builder = TocBuilder::new();
        for slide in slides {
            match (slide.display_title(), slide.level) {
                (Some(title), Some(level)) if level <= self.config.max_toc_level => {
                    builder.add_entry(title, level, slide.number)
                }
                _ => builder.add_entry("-", 1, slide.number),
            }
        }
        builder.into_toc()
    }

    /// Assemble template variables from a slide sequence
    pub fn get_template_vars(&self, slides: Vec<Slide>) -> TemplateVars {
        let embed = self.config.embed;
        let relative = self.config.relative;
        let tags = |assets: &[Asset]| -> Vec<String> {
            assets.iter().map(|a| a.tag(embed, relative)).collect()
        };

        TemplateVars {
            head_title: head_title(&slides),
            num_slides: slides.len(),
            toc: self.build_toc(&slides),
            slides,
            embed,
            math_output: self.config.math_output,
            css: tags(&self.assets.theme_css),
            user_css: tags(&self.assets.user_css),
            js: tags(&self.assets.theme_js),
            user_js: tags(&self.assets.user_js),
        }
    }

    /// Render the whole deck as a UTF-8 string
    pub fn render(&self) -> Result<String> {
        let vars = self.get_template_vars(self.slides()?);
        let template = self.config.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);
        render_template(template, &vars)
    }

    /// Render the deck and write it to the destination file
    pub fn execute(&self) -> Result<PathBuf> {
        let html = self.render()?;
        let destination = self.destination_file().to_path_buf();
        utils::write_file(&destination, &encode_output(&html))?;
        self.config.log(
            &format!("Generated file: {:?}", destination),
            Severity::Notice,
        )?;
        Ok(destination)
    }
}
