// ABOUTME: Main entry point for the slidedeck program.
// ABOUTME: Provides the CLI interface and runs the generator from the library.

use clap::Parser;
use log::LevelFilter;
use slidedeck::{Config, Generator, Severity};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Markdown (.md, .markdown) or reStructuredText (.rst) source file
    source: PathBuf,

    /// Path to output HTML file [default: presentation.html]
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Encoding of the source file (e.g. koi8_r, latin1)
    #[arg(short, long)]
    encoding: Option<String>,

    /// Write the rendered presentation to stdout instead of a file
    #[arg(short = 'o', long)]
    direct: bool,

    /// Embed images, stylesheets and scripts in the output
    #[arg(short = 'i', long)]
    embed: bool,

    /// Keep image and asset paths relative
    #[arg(short, long)]
    relative: bool,

    /// Do not render presenter notes
    #[arg(short = 'P', long)]
    no_presenter_notes: bool,

    /// Load MathJax for math rendering
    #[arg(short, long)]
    math_output: bool,

    /// CSS files to include
    #[arg(short, long)]
    css: Vec<PathBuf>,

    /// JavaScript files to include
    #[arg(short, long)]
    js: Vec<PathBuf>,

    /// Markdown extensions to enable (e.g. tables,footnotes)
    #[arg(short = 'x', long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// Deepest heading level listed in the table of contents [default: 2]
    #[arg(long)]
    max_toc_level: Option<u32>,

    /// Template file used instead of the built-in one
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Print progress messages
    #[arg(short, long)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let template = match &cli.template {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };

    let verbose = cli.verbose;
    let quiet = cli.quiet;
    let base = Config::from_env();
    let config = Config {
        encoding: cli.encoding.clone().or_else(|| base.encoding.clone()),
        presenter_notes: base.presenter_notes && !cli.no_presenter_notes,
        destination_file: cli
            .destination
            .clone()
            .unwrap_or_else(|| base.destination_file.clone()),
        embed: base.embed || cli.embed,
        relative: base.relative || cli.relative,
        max_toc_level: cli.max_toc_level.unwrap_or(base.max_toc_level),
        markdown_extensions: cli.extensions.clone(),
        math_output: cli.math_output,
        template,
        ..base
    }
    .with_logger(move |message, severity| match severity {
        Severity::Notice if verbose => eprintln!("{}", message),
        Severity::Warning if !quiet => eprintln!("Warning: {}", message),
        Severity::Error => eprintln!("Error: {}", message),
        _ => {}
    });

    let result = run(&cli, config);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: &Cli, config: Config) -> slidedeck::Result<()> {
    let mut generator = Generator::new(&cli.source, config)?;
    for css in &cli.css {
        generator.add_user_css(css)?;
    }
    for js in &cli.js {
        generator.add_user_js(js)?;
    }

    if cli.direct {
        let html = generator.render()?;
        std::io::stdout().write_all(&slidedeck::encoding::encode_output(&html))?;
    } else {
        let destination = generator.execute()?;
        if !cli.quiet {
            println!("Presentation generated: {:?}", destination);
        }
    }
    Ok(())
}
