// ABOUTME: Template rendering for the slidedeck compiler
// ABOUTME: Assembles template variables from slides and renders them through tera

use crate::errors::Result;
use crate::slides::Slide;
use crate::toc::TocNode;
use log::debug;
use serde::Serialize;
use tera::Tera;

/// Template used when the caller does not supply one
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/deck.html");

/// Everything a deck template can refer to
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateVars {
    pub head_title: Option<String>,
    pub num_slides: usize,
    pub slides: Vec<Slide>,
    pub toc: Vec<TocNode>,
    pub embed: bool,
    pub math_output: bool,
    /// Ready-made `<style>`/`<link>` tags
    pub css: Vec<String>,
    pub user_css: Vec<String>,
    /// Ready-made `<script>` tags
    pub js: Vec<String>,
    pub user_js: Vec<String>,
}

/// Title of the first slide carrying a non-blank title
pub fn head_title(slides: &[Slide]) -> Option<String> {
    slides
        .iter()
        .find_map(|slide| slide.display_title())
        .map(str::to_string)
}

/// Render template variables through a tera template
pub fn render_template(template: &str, vars: &TemplateVars) -> Result<String> {
    debug!("Rendering {} slides", vars.num_slides);
    let mut tera = Tera::default();
    tera.add_raw_template("deck", template)?;
    let context = tera::Context::from_serialize(vars)?;
    Ok(tera.render("deck", &context)?)
}
