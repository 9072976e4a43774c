use crate::io::output::{JsonWriter, MarkdownWriter, OutputWriter, TerminalWriter};
use crate::{analyzers, cli, config, io};
use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub format: cli::OutputFormat,
    pub output: Option<PathBuf>,
}

pub fn handle_analyze(config: AnalyzeConfig) -> Result<()> {
    let tables = io::loader::load_tables(&config.path)
        .with_context(|| format!("Failed to load datasets from {}", config.path.display()))?;

    let report = analyzers::analyze_posture(&tables, config::get_config())?;

    let mut writer = create_writer(config.format, config.output.as_ref())?;
    writer.write_report(&report)
}

fn create_writer(
    format: cli::OutputFormat,
    output: Option<&PathBuf>,
) -> Result<Box<dyn OutputWriter>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(match format {
                cli::OutputFormat::Json => Box::new(JsonWriter::new(file)),
                cli::OutputFormat::Markdown => Box::new(MarkdownWriter::new(file)),
                // The colored summary has no file form; fall back to
                // the report document.
                cli::OutputFormat::Terminal => Box::new(MarkdownWriter::new(file)),
            })
        }
        None => Ok(match format {
            cli::OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
            cli::OutputFormat::Markdown => Box::new(MarkdownWriter::new(std::io::stdout())),
            cli::OutputFormat::Terminal => Box::new(TerminalWriter::new()),
        }),
    }
}
