use slidedeck::{Config, DeckError, Generator, Macro, MacroContext, MacroOutput, Severity};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct BannerMacro;

impl Macro for BannerMacro {
    fn name(&self) -> &str {
        "banner"
    }

    fn process(&self, content: &str, _ctx: &MacroContext<'_>) -> slidedeck::Result<MacroOutput> {
        if !content.contains("{company}") {
            return Ok(MacroOutput::unchanged(content));
        }
        Ok(MacroOutput {
            content: content.replace("{company}", "<b>ACME</b>"),
            side_data: vec!["branded".to_string()],
        })
    }
}

#[test]
fn test_custom_macro_reaches_rendered_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("deck.md");
    fs::write(&source, "# One\n\nby {company}\n\n# Two\n\nplain\n").unwrap();

    let config = Config {
        destination_file: temp_dir.path().join("deck.html"),
        ..Config::new()
    };
    let mut generator = Generator::new(&source, config).unwrap();
    generator.register_macro(Box::new(BannerMacro)).unwrap();

    let html = generator.render().unwrap();
    assert_eq!(html.matches("<b>ACME</b>").count(), 1);
    assert!(html.contains("<section class=\"slide branded\" id=\"slide-1\">"));
    assert!(html.contains("<section class=\"slide\" id=\"slide-2\">"));
}

#[test]
fn test_restricted_macro_set() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("deck.md");
    fs::write(&source, "# One\n\n.notes: hi\n\n.fx: fade\n").unwrap();

    let config = Config {
        macros: Some(vec!["notes".to_string()]),
        ..Config::new()
    };
    let generator = Generator::new(&source, config).unwrap();
    assert_eq!(generator.macros().names(), vec!["notes"]);

    let slides = generator.slides().unwrap();
    assert_eq!(slides[0].classes, vec!["has_notes".to_string()]);
    assert!(slides[0].content.contains("<p>.fx: fade</p>"));
}

#[test]
fn test_unknown_markdown_extension_is_a_warning() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("deck.md");
    fs::write(&source, "# One\n").unwrap();

    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&warnings);
    let config = Config {
        markdown_extensions: vec!["tables".to_string(), "wikilinks".to_string()],
        ..Config::new()
    }
    .with_logger(move |msg, severity| {
        if severity == Severity::Warning {
            sink.lock().unwrap().push(msg.to_string());
        }
    });

    assert!(Generator::new(&source, config).is_ok());
    let warnings = warnings.lock().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("wikilinks"));
}

#[test]
fn test_custom_template() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("deck.md");
    fs::write(&source, "# One\n\n---\n\n# Two\n").unwrap();

    let config = Config {
        template: Some(
            "{{ head_title }}|{% for slide in slides %}{{ slide.number }}:{{ slide.title }};{% endfor %}"
                .to_string(),
        ),
        ..Config::new()
    };
    let generator = Generator::new(&source, config).unwrap();
    assert_eq!(generator.render().unwrap(), "One|1:One;2:Two;");
}

#[test]
fn test_unwritable_destination_is_an_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("deck.md");
    fs::write(&source, "# One\n").unwrap();

    // A regular file where a directory is expected
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let config = Config {
        destination_file: blocker.join("deck.html"),
        ..Config::new()
    };
    let generator = Generator::new(&source, config).unwrap();
    let err = generator.execute().unwrap_err();
    assert!(err.is_io());
    assert!(matches!(err, DeckError::FileWriteError { .. }));
}
