use anyhow::{Context, Result};
use clap::Parser;
use racebar::cli::{Cli, OutputFormat};
use racebar::csv_output::CsvRenderer;
use racebar::json_output::JsonRenderer;
use racebar::loader::{CsvEventSource, MalformedPolicy};
use racebar::pipeline::{Pipeline, PipelineConfig, RollingSeries};
use racebar::render::{Renderer, TextRenderer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` forces TRACE
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file (if any) and apply command-line overrides
fn build_config(args: &Cli) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if args.skip_malformed {
        config.loader.on_malformed = MalformedPolicy::Skip;
    }
    if let Some(expr) = &args.entities {
        config.entities = Some(expr.clone());
    }
    if let Some(bars) = args.bars {
        config.render.bar_count = bars;
    }

    Ok(config)
}

/// Pick the requested series, or the last configured one
fn select_series<'a>(rolling: &'a [RollingSeries], name: Option<&str>) -> Result<&'a RollingSeries> {
    match name {
        Some(name) => rolling.iter().find(|s| s.spec.name == name).with_context(|| {
            let known: Vec<&str> = rolling.iter().map(|s| s.spec.name.as_str()).collect();
            format!("Unknown window '{}' (configured: {})", name, known.join(", "))
        }),
        None => rolling
            .last()
            .context("No rolling windows configured; add a [[window]] section"),
    }
}

fn render_to<W: Write>(out: W, args: &Cli, series: &RollingSeries, config: &PipelineConfig) -> Result<()> {
    match args.format {
        OutputFormat::Text => {
            TextRenderer::new(out)
                .final_only(args.final_only)
                .render(&series.table, &config.render)?;
        }
        OutputFormat::Json => {
            JsonRenderer::new(out).render(&series.table, &config.render)?;
        }
        OutputFormat::Csv => {
            CsvRenderer::new(out).render(&series.table, &config.render)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = build_config(&args)?;
    let pipeline = Pipeline::new(config)?;

    let mut source = CsvEventSource::from_path(&args.input, pipeline.config().loader.clone())
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let output = pipeline.run_source(&mut source)?;

    // Summary mode replaces rendering
    if args.summary {
        output.summary.print_summary();
        return Ok(());
    }

    let series = select_series(&output.rolling, args.window.as_deref())?;
    tracing::debug!(
        "Rendering window '{}' as {:?}",
        series.spec.name,
        args.format
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            render_to(BufWriter::new(file), &args, series, pipeline.config())?;
        }
        None => {
            let stdout = io::stdout();
            render_to(stdout.lock(), &args, series, pipeline.config())?;
        }
    }

    Ok(())
}
