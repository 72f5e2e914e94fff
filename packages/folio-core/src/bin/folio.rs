//! Folio CLI - backtests and fundamental scores as JSON.
//!
//! Every command prints a `{"ok": ..., "data": ..., "error": ...}` envelope on
//! stdout. Logs go to stderr.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use folio_core::{
    benchmark_for, builtin_policies, get_policy, load_price_table, ApiResponse, BacktestEngine,
    BacktestRequest, ProviderKind, Settings,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio backtesting and fundamental scoring")]
#[command(version)]
struct Cli {
    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a company's fundamentals
    Score {
        /// Stock symbol
        #[arg(short, long)]
        ticker: String,
        /// Scoring policy ID
        #[arg(short, long, default_value = "classic")]
        policy: String,
    },
    /// Backtest a weighted portfolio
    Backtest {
        /// Allocation as SYMBOL=WEIGHT (repeatable)
        #[arg(short, long = "asset", value_parser = parse_allocation, required = true)]
        assets: Vec<(String, f64)>,
        /// Benchmark symbol
        #[arg(short, long)]
        benchmark: Option<String>,
        /// Starting capital
        #[arg(short, long)]
        capital: Option<f64>,
        /// Annual risk-free rate (0.02 = 2%)
        #[arg(short, long)]
        risk_free: Option<f64>,
        /// Trailing years of history to use
        #[arg(short = 'y', long)]
        years: Option<u32>,
        /// Read prices from <DIR>/<SYMBOL>.csv instead of the configured provider
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// List scoring policies
    Policies,
    /// Show effective settings
    Config,
}

fn parse_allocation(s: &str) -> Result<(String, f64), String> {
    let (symbol, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=WEIGHT, got {:?}", s))?;
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(format!("missing symbol in {:?}", s));
    }
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("invalid weight in {:?}", s))?;
    Ok((symbol.to_uppercase(), weight))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Score { ticker, policy } => handle_score(&ticker, &policy),
        Commands::Backtest {
            assets,
            benchmark,
            capital,
            risk_free,
            years,
            data_dir,
        } => handle_backtest(assets, benchmark, capital, risk_free, years, data_dir),
        Commands::Policies => handle_policies(),
        Commands::Config => handle_config(),
    };

    let (response, code) = match result {
        Ok(data) => (ApiResponse::ok(data), ExitCode::SUCCESS),
        Err(e) => (ApiResponse::<Value>::err(format!("{:#}", e)), ExitCode::FAILURE),
    };

    match serde_json::to_string_pretty(&response) {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("failed to render response: {}", e);
            return ExitCode::FAILURE;
        }
    }
    code
}

fn load_settings() -> anyhow::Result<Settings> {
    Settings::load().with_context(|| {
        format!(
            "loading settings from {}",
            Settings::default_path().display()
        )
    })
}

fn handle_score(ticker: &str, policy_id: &str) -> anyhow::Result<Value> {
    let policy = get_policy(policy_id).ok_or_else(|| {
        let known: Vec<String> = builtin_policies().into_iter().map(|p| p.id).collect();
        anyhow!("Unknown policy '{}' (available: {})", policy_id, known.join(", "))
    })?;

    let settings = load_settings()?;
    let mut provider = settings.build_provider()?;
    let data = provider
        .fundamentals(ticker)
        .with_context(|| format!("fetching fundamentals for {}", ticker.to_uppercase()))?;

    let benchmark = benchmark_for(data.sector.as_deref());
    let card = policy.evaluate(&data, &benchmark);
    debug!(symbol = %card.symbol, score = card.score, "scored");

    Ok(json!({
        "symbol": card.symbol,
        "name": data.name,
        "sector": data.sector,
        "policy": card.policy,
        "score": card.score,
        "recommendation": card.recommendation,
        "label": card.recommendation.label(),
        "benchmark": card.benchmark,
        "checks": card.checks,
        "metrics": data.metrics,
    }))
}

fn handle_backtest(
    assets: Vec<(String, f64)>,
    benchmark: Option<String>,
    capital: Option<f64>,
    risk_free: Option<f64>,
    years: Option<u32>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<Value> {
    let mut settings = load_settings()?;
    if let Some(dir) = data_dir {
        settings.provider = ProviderKind::Csv;
        settings.data_dir = Some(dir);
    }

    let mut request = BacktestRequest::new(assets, capital.unwrap_or(settings.initial_capital))
        .with_risk_free_rate(risk_free.unwrap_or(settings.risk_free_rate));
    if let Some(symbol) = benchmark.as_deref() {
        request = request.with_benchmark(symbol);
    }

    let mut provider = settings.build_provider()?;
    let table = load_price_table(
        &mut provider,
        &request.required_symbols(),
        settings.missing_values,
        years.or(settings.lookback_years),
    )
    .context("loading prices")?;

    let report = BacktestEngine::new().run(&request, &table)?;
    Ok(serde_json::to_value(report)?)
}

fn handle_policies() -> anyhow::Result<Value> {
    let policies: Vec<Value> = builtin_policies()
        .into_iter()
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "description": p.description,
                "max_points": p.max_points(),
                "rules": p.rules.len(),
            })
        })
        .collect();

    Ok(json!({ "policies": policies }))
}

fn handle_config() -> anyhow::Result<Value> {
    let settings = load_settings()?;
    Ok(json!({
        "path": Settings::default_path(),
        "settings": settings.redacted(),
    }))
}
