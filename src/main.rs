//! ETL Designer - command line entry point
//!
//! Drives the designer core without a canvas view: infer field trees from
//! samples, assemble saved canvases into pipeline configurations, and talk to
//! the pipeline and extract backends.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use etl_designer::{
    config::DesignerSettings,
    schema::{build_field_tree, simplify_structure},
    service::{
        ensure_structured, ExtractService, HeaderRow, HttpTransport, PipelineService,
        SampleRequest, SampleSource, SchemaFetcher, ServiceClient,
    },
    CanvasDocument, EditorSession,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Design and run ETL pipelines from the command line
#[derive(Parser, Debug)]
#[command(name = "etl-designer", version, about, long_about = None)]
struct Cli {
    /// Settings file to use instead of the platform default
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Infer a field tree from a sample file or URL
    Infer {
        /// Path to a JSON file, or an http(s) URL
        source: String,
        /// Request header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Print the simplified structure instead of the field tree
        #[arg(long)]
        structure: bool,
    },
    /// Assemble a saved canvas into a pipeline configuration
    Assemble {
        /// Canvas document to read
        canvas: PathBuf,
        /// Pipeline id (defaults to the one stored in the canvas)
        #[arg(long)]
        id: Option<String>,
        /// Write the configuration here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also save the configuration to the pipeline backend
        #[arg(long)]
        save: bool,
    },
    /// List saved pipelines
    List,
    /// Show one saved pipeline
    Show {
        id: String,
        /// Lay the pipeline out on a canvas and save it here
        #[arg(long)]
        canvas: Option<PathBuf>,
    },
    /// Start a saved pipeline
    Run { id: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,etl_designer=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => DesignerSettings::load_from(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => DesignerSettings::load_or_default(),
    };

    match cli.command {
        Command::Infer {
            source,
            headers,
            structure,
        } => infer(&settings, &source, &headers, structure),
        Command::Assemble {
            canvas,
            id,
            output,
            save,
        } => assemble(&settings, &canvas, id, output.as_deref(), save),
        Command::List => list(&settings),
        Command::Show { id, canvas } => show(&settings, &id, canvas.as_deref()),
        Command::Run { id } => run(&settings, &id),
    }
}

fn client(base_url: &str, settings: &DesignerSettings) -> anyhow::Result<ServiceClient<HttpTransport>> {
    Ok(ServiceClient::new(base_url, HttpTransport::new()?).with_timeout(settings.services.timeout()))
}

fn pipeline_service(settings: &DesignerSettings) -> anyhow::Result<PipelineService<HttpTransport>> {
    Ok(PipelineService::new(client(
        &settings.services.pipeline_base_url,
        settings,
    )?))
}

fn parse_header(raw: &str) -> anyhow::Result<HeaderRow> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Header '{}' is not in \"Name: value\" form", raw))?;
    Ok(HeaderRow::new(key.trim(), value.trim()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn infer(
    settings: &DesignerSettings,
    source: &str,
    headers: &[String],
    structure: bool,
) -> anyhow::Result<()> {
    let sample = if source.starts_with("http://") || source.starts_with("https://") {
        let rows = headers
            .iter()
            .map(|h| parse_header(h))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let fetcher = SchemaFetcher::new(client("", settings)?);
        let request = SampleRequest::new(source).with_headers(rows);
        fetcher
            .fetch_sample(&request)
            .map_err(|e| anyhow!(e.user_message()))?
    } else {
        let content = std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read sample {}", source))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Sample {} is not JSON", source))?;
        ensure_structured(value)?
    };

    if structure {
        print_json(&simplify_structure(&sample))
    } else {
        print_json(&build_field_tree(&sample))
    }
}

fn assemble(
    settings: &DesignerSettings,
    canvas: &Path,
    id: Option<String>,
    output: Option<&Path>,
    save: bool,
) -> anyhow::Result<()> {
    let document = CanvasDocument::load(canvas)?;
    let mut session = EditorSession::new(&settings.canvas);
    session.restore(&document)?;

    let id = id.unwrap_or_else(|| document.pipeline_id.clone());
    let config = session.build_config(&id)?;

    match output {
        Some(path) => {
            std::fs::write(path, serde_json::to_string_pretty(&config)?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote pipeline '{}' to {}", id, path.display());
        }
        None => print_json(&config)?,
    }

    if save {
        pipeline_service(settings)?
            .save(&config)
            .map_err(|e| anyhow!(e.user_message()))?;
    }
    Ok(())
}

fn list(settings: &DesignerSettings) -> anyhow::Result<()> {
    let pipelines = pipeline_service(settings)?
        .list()
        .map_err(|e| anyhow!(e.user_message()))?;
    for pipeline in &pipelines {
        println!(
            "{}\t{}\t{}",
            pipeline.id,
            pipeline.extract_config.source_info.url,
            pipeline.load_config.target_info.kind
        );
    }
    Ok(())
}

fn show(settings: &DesignerSettings, id: &str, canvas: Option<&Path>) -> anyhow::Result<()> {
    let config = pipeline_service(settings)?
        .get(id)
        .map_err(|e| anyhow!(e.user_message()))?;

    match canvas {
        Some(path) => {
            let mut session = EditorSession::new(&settings.canvas);
            session.load_config(&config)?;
            session.snapshot(&config.id).save(path)?;
            tracing::info!("Laid out pipeline '{}' in {}", id, path.display());
            Ok(())
        }
        None => print_json(&config),
    }
}

fn run(settings: &DesignerSettings, id: &str) -> anyhow::Result<()> {
    let service = ExtractService::new(client(&settings.services.extract_base_url, settings)?);
    service
        .start_pipeline(id)
        .map_err(|e| anyhow!(e.user_message()))?;
    println!("Started pipeline {}", id);
    Ok(())
}
