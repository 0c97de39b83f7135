//! Command-line front end: style and export one cell
//!
//! Supports:
//! - Reading the cell text from a file or stdin
//! - Choosing the cell kind and wrap width
//! - Measuring with a real font or a fixed char width
//! - Exporting as plain text, HTML, XML, RTF markup, TeX or display runs

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::EditorConfig;
use crate::controller::CellEditor;
use crate::focus::FocusContext;
use crate::style::metrics::{FontMetrics, MonospaceMetrics, TextMetrics};
use crate::style::CellKind;

/// Style and export a worksheet cell
#[derive(Parser, Debug)]
#[command(name = "cell-editor", version, about = "Style and export a worksheet cell")]
pub struct CliArgs {
    /// File holding the cell text; stdin when absent or `-`
    #[arg(value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Kind of cell the text belongs to
    #[arg(short, long, value_enum, default_value_t = KindArg::Code)]
    pub kind: KindArg,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Wrap width in pixels (0 disables wrapping)
    #[arg(short, long, value_name = "PX")]
    pub width: Option<f32>,

    /// TTF/OTF font used to measure text
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Font size in pixels (used with --font)
    #[arg(long, value_name = "PX", default_value_t = 16.0)]
    pub font_size: f32,

    /// Advance width of every char when no font is given
    #[arg(long, value_name = "PX", default_value_t = 8.0)]
    pub char_width: f32,

    /// Append a statement terminator to code that lacks one
    #[arg(long)]
    pub add_ending: bool,

    /// Show only the first line
    #[arg(long)]
    pub fold: bool,

    /// Configuration file to use instead of the default one
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Cell kinds accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Code,
    Text,
    Title,
    Section,
    Subsection,
    Subsubsection,
    Heading5,
    Heading6,
}

impl From<KindArg> for CellKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Code => CellKind::Code,
            KindArg::Text => CellKind::Text,
            KindArg::Title => CellKind::Title,
            KindArg::Section => CellKind::Section,
            KindArg::Subsection => CellKind::Subsection,
            KindArg::Subsubsection => CellKind::Subsubsection,
            KindArg::Heading5 => CellKind::Heading5,
            KindArg::Heading6 => CellKind::Heading6,
        }
    }
}

/// What the cell is printed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
    Xml,
    Markup,
    Tex,
    /// Display runs and soft breaks as JSON
    Runs,
}

impl CliArgs {
    /// Read the cell text from the input file or stdin
    pub fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display())),
            _ => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("reading stdin")?;
                Ok(text)
            }
        }
    }

    /// Load the configuration and apply command-line overrides
    pub fn editor_config(&self) -> Result<EditorConfig> {
        let mut config = match &self.config {
            Some(path) => EditorConfig::load_from(path)?,
            None => EditorConfig::load(),
        };
        if let Some(width) = self.width {
            config.wrap_width = width;
        }
        Ok(config)
    }

    /// Metrics provider: the given font, else fixed-width chars
    pub fn metrics(&self) -> Result<Rc<dyn TextMetrics>> {
        match &self.font {
            Some(path) => Ok(Rc::new(FontMetrics::load(path, self.font_size)?)),
            None => Ok(Rc::new(MonospaceMetrics::new(
                self.char_width,
                self.char_width * 2.0,
            ))),
        }
    }
}

/// Style `text` as one cell and render it in the requested format
pub fn run(args: &CliArgs, config: EditorConfig, text: &str) -> Result<String> {
    let mut cell = CellEditor::new(args.kind.into(), text, FocusContext::shared(), config)
        .with_metrics(args.metrics()?);
    if args.add_ending && cell.add_ending() {
        tracing::debug!("appended statement terminator");
    }
    cell.set_first_line_only(args.fold);

    let out = match args.format {
        OutputFormat::Text => cell.to_plain_text(true),
        OutputFormat::Html => cell.to_html(),
        OutputFormat::Xml => cell.to_xml(),
        OutputFormat::Markup => cell.to_markup(),
        OutputFormat::Tex => cell.to_tex(),
        OutputFormat::Runs => {
            serde_json::to_string_pretty(cell.styled()).context("serializing display runs")?
        }
    };
    Ok(out)
}
