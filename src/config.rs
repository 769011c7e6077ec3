// ABOUTME: Configuration module for the slidedeck compiler
// ABOUTME: Provides the option bundle, user logger callback and environment variable handling

use crate::errors::{DeckError, Result};
use log::{error, info, warn};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Severity of a message reported through the user logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

/// Callback receiving user-facing messages
pub type Logger = Arc<dyn Fn(&str, Severity) + Send + Sync>;

/// Options controlling a single compilation
#[derive(Clone)]
pub struct Config {
    pub encoding: Option<String>,
    pub presenter_notes: bool,
    pub logger: Option<Logger>,
    pub default_classes: Vec<String>,
    pub destination_file: PathBuf,
    pub embed: bool,
    pub relative: bool,
    pub max_toc_level: u32,
    pub split_level: u32,
    pub markdown_extensions: Vec<String>,
    pub math_output: bool,
    pub template: Option<String>,
    pub macros: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoding: None,
            presenter_notes: true,
            logger: None,
            default_classes: Vec::new(),
            destination_file: PathBuf::from("presentation.html"),
            embed: false,
            relative: false,
            max_toc_level: 2,
            split_level: 1,
            markdown_extensions: Vec::new(),
            math_output: false,
            template: None,
            macros: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("encoding", &self.encoding)
            .field("presenter_notes", &self.presenter_notes)
            .field("logger", &self.logger.as_ref().map(|_| "<callback>"))
            .field("default_classes", &self.default_classes)
            .field("destination_file", &self.destination_file)
            .field("embed", &self.embed)
            .field("relative", &self.relative)
            .field("max_toc_level", &self.max_toc_level)
            .field("split_level", &self.split_level)
            .field("markdown_extensions", &self.markdown_extensions)
            .field("math_output", &self.math_output)
            .field("template", &self.template.as_ref().map(|t| t.len()))
            .field("macros", &self.macros)
            .finish()
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let encoding = env::var("SLIDEDECK_ENCODING").ok().filter(|s| !s.is_empty());
        let presenter_notes = env::var("SLIDEDECK_PRESENTER_NOTES")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.presenter_notes);
        let embed = env::var("SLIDEDECK_EMBED")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(defaults.embed);
        let relative = env::var("SLIDEDECK_RELATIVE")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(defaults.relative);
        let max_toc_level = env::var("SLIDEDECK_MAX_TOC_LEVEL")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_toc_level);
        let destination_file = env::var("SLIDEDECK_DESTINATION")
            .ok()
            .map(PathBuf::from)
            .unwrap_or(defaults.destination_file.clone());

        Self {
            encoding,
            presenter_notes,
            embed,
            relative,
            max_toc_level,
            destination_file,
            ..defaults
        }
    }

    /// Attach a user logger callback
    pub fn with_logger<F>(mut self, logger: F) -> Self
    where
        F: Fn(&str, Severity) + Send + Sync + 'static,
    {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Report a message to the user logger and the `log` facade.
    ///
    /// Messages of `Severity::Error` halt processing: the callback still sees
    /// them, then the caller gets a `DeckError::UserMessage`.
    pub fn log(&self, message: &str, severity: Severity) -> Result<()> {
        match severity {
            Severity::Notice => info!("{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Error => error!("{}", message),
        }

        if let Some(logger) = &self.logger {
            logger(message, severity);
        }

        if severity == Severity::Error {
            return Err(DeckError::UserMessage(message.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert!(config.presenter_notes);
        assert!(!config.embed);
        assert_eq!(config.max_toc_level, 2);
        assert_eq!(config.split_level, 1);
        assert_eq!(config.destination_file, PathBuf::from("presentation.html"));
        assert!(config.macros.is_none());
    }

    #[test]
    fn test_log_forwards_to_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = Config::new().with_logger(move |msg, severity| {
            sink.lock().unwrap().push((msg.to_string(), severity));
        });

        assert!(config.log("hello", Severity::Notice).is_ok());
        assert!(config.log("careful", Severity::Warning).is_ok());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], ("careful".to_string(), Severity::Warning));
    }

    #[test]
    fn test_error_severity_halts() {
        let config = Config::new();
        let result = config.log("fatal", Severity::Error);
        assert!(matches!(result, Err(DeckError::UserMessage(ref m)) if m == "fatal"));
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Notice.to_string(), "notice");
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
