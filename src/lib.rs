// ABOUTME: Library module for the slidedeck compiler.
// ABOUTME: Turns Markdown or reStructuredText documents into single-file HTML presentations.

// Reexport modules
pub mod assets;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod generator;
pub mod macros;
pub mod parser;
pub mod render;
pub mod rst;
pub mod slides;
pub mod toc;
pub mod utils;

// Reexport common types and functions
pub use assets::{Asset, AssetKind, Assets};
pub use config::{Config, Logger, Severity};
pub use errors::{DeckError, Result};
pub use generator::Generator;
pub use macros::{Macro, MacroContext, MacroOutput, MacroRegistry};
pub use parser::{Dialect, Parser};
pub use render::TemplateVars;
pub use slides::Slide;
pub use toc::{TocBuilder, TocNode};
