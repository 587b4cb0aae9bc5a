use clap::{Parser, ValueEnum};
use lookalike::{Catalog, ClassPrediction, PredictionRanker, RankLimit, RankedResult, WidgetConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Rank image classification output against a display catalog
#[derive(Parser, Debug)]
#[command(name = "lookalike-rank", version)]
struct Args {
    /// JSON array of `{"className" | "label", "probability"}` objects
    #[arg(required_unless_present = "schema")]
    predictions: Option<PathBuf>,

    /// Catalog file (.toml or .json); the built-in animal table if omitted
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Widget config file (.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of results, or `all`
    #[arg(short = 'k', long)]
    top_k: Option<RankLimit>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the JSON schema of the ranked output and exit
    #[arg(long)]
    schema: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    if args.schema {
        println!("{}", serde_json::to_string_pretty(&output_schema())?);
        return Ok(());
    }
    let Some(predictions_path) = &args.predictions else {
        return Err("a predictions file is required".into());
    };

    let mut config = match &args.config {
        Some(path) => WidgetConfig::load(path)?,
        None => WidgetConfig::default(),
    }
    .apply_env()?;
    if let Some(limit) = args.top_k {
        config = config.with_limit(limit);
    }

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };
    tracing::debug!("Using catalog with {} entries, limit {}", catalog.len(), config.limit);

    let raw = std::fs::read_to_string(predictions_path)?;
    let predictions: Vec<ClassPrediction> = serde_json::from_str(&raw)?;

    let ranker = PredictionRanker::new(Arc::new(catalog));
    let results = ranker.rank_with_limit(&predictions, config.limit)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => print!("{}", render_text(&results)),
    }

    Ok(())
}

fn output_schema() -> schemars::Schema {
    schemars::schema_for!(Vec<RankedResult>)
}

fn render_text(results: &[RankedResult]) -> String {
    let mut out = String::new();
    for result in results {
        let position = match result.badge() {
            Some(badge) => badge.to_string(),
            None => format!("#{}", result.rank),
        };
        let marker = if result.fallback { " (fallback)" } else { "" };
        out.push_str(&format!(
            "{position} {} / {} {:>3}%  {}{marker}\n",
            result.display_name, result.canonical_name, result.percentage, result.asset
        ));
    }
    out
}
