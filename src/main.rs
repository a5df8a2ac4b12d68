mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use xsd_codegen::{
    generator::{self, Config, ConfigOption, Logger, TracingLogger},
    xsd,
};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1..=3 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::default();
    config.option(
        std::iter::once(ConfigOption::ErrorLog(
            Some(Arc::new(TracingLogger) as Arc<dyn Logger>),
            cli.verbose,
        ))
        .chain(cli.options()),
    );

    let source = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let options = roxmltree::ParsingOptions {
        allow_dtd: cli.allow_dtd,
        ..Default::default()
    };
    let document = roxmltree::Document::parse_with_options(&source, options)
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;
    let schema = xsd::read_schema(&document)
        .with_context(|| format!("failed to read the schema in {}", cli.input.display()))?;
    tracing::info!(
        types = schema.declared_types().count(),
        "loaded {}",
        cli.input.display()
    );

    let code = generator::generate(&config, &schema)?;
    match &cli.output {
        Some(path) => std::fs::write(path, code)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{code}"),
    }
    Ok(())
}
