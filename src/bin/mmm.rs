//! mmm — command-line front end for the marketing-mix pipeline.
//!
//! `mmm fit --input data.csv [--config opts.toml] [--folds K] [--seed S]
//! [--spend CHANNEL=AMOUNT ...] [--json]` loads and cleans the table, fits
//! once, reports cross-validated RMSE, and answers one scenario query when
//! spends are given. Logging goes to stderr and is controlled by `RUST_LOG`.
use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use rust_mmm::{
    data::load_cleaned,
    model::{CvOptions, CvReport},
    pipeline::{FittedPipeline, PipelineOptions},
    simulation::{ScenarioOutcome, ScenarioSimulator, SpendAllocation},
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mmm", about = "Marketing mix modeling and what-if spend simulation", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fit the pipeline, cross-validate, and optionally simulate one scenario.
    Fit(FitArgs),
}

#[derive(Args, Debug)]
struct FitArgs {
    /// CSV with timestamp, channel_name, ad_cost, sales, homepage_visits,
    /// branded_searches, conversion_rate columns.
    #[arg(long)]
    input: PathBuf,
    /// TOML file with pipeline options.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the cross-validation fold count.
    #[arg(long)]
    folds: Option<usize>,
    /// Shuffle folds with this seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Scenario spend as CHANNEL=AMOUNT; repeatable.
    #[arg(long = "spend", value_parser = parse_spend)]
    spend: Vec<(String, f64)>,
    /// Print a JSON report instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct FitReport<'a> {
    rows_read: usize,
    rows_used: usize,
    rows_rejected: usize,
    channels: Vec<&'a str>,
    intercept: f64,
    coefficients: Vec<(&'static str, f64)>,
    training_rmse: f64,
    cross_validation: CvReport,
    mean_rmse: f64,
    scenario: Option<ScenarioOutcome>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Fit(args) => run_fit(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rust_mmm=info,warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn parse_spend(raw: &str) -> Result<(String, f64)> {
    let (channel, amount) =
        raw.split_once('=').ok_or_else(|| anyhow!("expected CHANNEL=AMOUNT, got '{raw}'"))?;
    let channel = channel.trim();
    if channel.is_empty() {
        bail!("channel name must not be empty in '{raw}'");
    }
    let amount: f64 =
        amount.trim().parse().with_context(|| format!("invalid spend amount in '{raw}'"))?;
    Ok((channel.to_string(), amount))
}

fn run_fit(args: FitArgs) -> Result<()> {
    let mut options = match &args.config {
        Some(path) => PipelineOptions::from_toml_file(path)?,
        None => PipelineOptions::default(),
    };
    if let Some(folds) = args.folds {
        options.cv.folds = folds;
    }
    if args.seed.is_some() {
        options.cv.seed = args.seed;
    }
    options.validate()?;

    let table = load_cleaned(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let pipeline = Arc::new(FittedPipeline::fit(&table, &options).context("fitting pipeline")?);
    let cv = pipeline.cross_validate(&options.cv).context("cross-validating")?;

    let simulator = ScenarioSimulator::new(Arc::clone(&pipeline));
    let scenario = if args.spend.is_empty() {
        None
    } else {
        let allocation: SpendAllocation =
            args.spend.iter().map(|(c, s)| (c.as_str(), *s)).collect();
        Some(simulator.simulate(&allocation).context("simulating scenario")?)
    };

    let report = FitReport {
        rows_read: table.rows_read,
        rows_used: table.len(),
        rows_rejected: table.rejected.len(),
        channels: pipeline.channels().collect(),
        intercept: pipeline.estimator().intercept(),
        coefficients: rust_mmm::features::Feature::ALL
            .iter()
            .map(|f| f.name())
            .zip(pipeline.estimator().coefficients().iter().copied())
            .collect(),
        training_rmse: pipeline.training_rmse(),
        mean_rmse: cv.mean_rmse(),
        cross_validation: cv,
        scenario,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report, &options.cv);
    }
    Ok(())
}

fn print_text(report: &FitReport<'_>, cv: &CvOptions) {
    println!(
        "rows: {} read, {} used, {} rejected",
        report.rows_read, report.rows_used, report.rows_rejected
    );
    println!("channels: {}", report.channels.join(", "));
    println!("intercept: {:.4}", report.intercept);
    for (name, coef) in &report.coefficients {
        println!("  {name:<18} {coef:>12.4}");
    }
    println!("training RMSE: {:.4}", report.training_rmse);
    let fold_rmse: Vec<String> =
        report.cross_validation.fold_rmse.iter().map(|r| format!("{r:.4}")).collect();
    println!("{}-fold RMSE: [{}] mean {:.4}", cv.folds, fold_rmse.join(", "), report.mean_rmse);

    if let Some(outcome) = &report.scenario {
        println!("scenario total spend: {:.2}", outcome.total_spend);
        for (channel, share) in &outcome.proportions {
            println!("  {channel:<18} {:>6.1}%", share * 100.0);
        }
        if outcome.used_fallback {
            println!("  (zero total spend: using the overall historical average)");
        }
        println!(
            "predicted sales at {}: {:.2}",
            outcome.predicted_at.format("%Y-%m-%d %H:%M"),
            outcome.predicted_sales
        );
    }
}
