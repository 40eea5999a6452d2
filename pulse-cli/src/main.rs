//! MarketPulse CLI — run one evaluation cycle against local stores.
//!
//! Commands:
//! - `gate` — staleness guard + regime gates, exit code 1 on NO-GO
//! - `context` — dump the loaded market context snapshot
//! - `preview` — render a sample signal card through the formatter

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use pulse_core::card::{
    tax_label_for_broker, validity_label_for_asset_class, SignalCard, SignalCardFormatter,
};
use pulse_core::config::PulseConfig;
use pulse_core::context::{MarketContext, MarketContextLoader};
use pulse_core::guard::{StalenessGuard, StalenessResult};
use pulse_core::orders::TrapOrderCalculator;
use pulse_core::store::{FsObjectStore, JsonFileRegistry};

#[derive(Parser)]
#[command(name = "pulse", about = "MarketPulse CLI — daily trade-decision pipeline")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "pulse.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the staleness guard and regime gates; exit 1 on NO-GO.
    Gate,
    /// Load and print the market context snapshot.
    Context,
    /// Render a sample signal card to stdout.
    Preview {
        /// Portfolio equity used for the sample sizing.
        #[arg(long, default_value_t = 10_000.0)]
        equity: f64,

        /// Risk per trade as a fraction (e.g. 0.02 = 2%).
        #[arg(long, default_value_t = 0.02)]
        risk_pct: f64,
    },
}

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = PulseConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    match cli.command {
        Commands::Gate => cmd_gate(&config),
        Commands::Context => {
            cmd_context(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Preview { equity, risk_pct } => {
            cmd_preview(equity, risk_pct)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn cmd_gate(config: &PulseConfig) -> Result<ExitCode> {
    let registry = JsonFileRegistry::new(&config.registry_path);
    let freshness = StalenessGuard::new(&registry).check();
    print_freshness(&freshness);

    let store = FsObjectStore::new(&config.data_dir);
    let loader =
        MarketContextLoader::new(&store, &config.benchmark_symbol, &config.dollar_symbol);
    let ctx = loader.load().context("loading market context")?;
    print_context(&ctx);

    let go = freshness.passed && ctx.gates_pass() == Some(true);
    println!();
    println!("Verdict: {}", if go { "GO" } else { "NO-GO" });

    if let Some(alert) = &freshness.alert_message {
        println!();
        println!("{alert}");
    }

    Ok(if go {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_context(config: &PulseConfig) -> Result<()> {
    let store = FsObjectStore::new(&config.data_dir);
    let loader =
        MarketContextLoader::new(&store, &config.benchmark_symbol, &config.dollar_symbol);
    let ctx = loader.load().context("loading market context")?;
    print_context(&ctx);
    Ok(())
}

fn cmd_preview(equity: f64, risk_pct: f64) -> Result<()> {
    let params = TrapOrderCalculator::new().calculate(100.0, 10.0, 30.0, equity, risk_pct)?;

    let broker = "PAPER".to_string();
    let card = SignalCard {
        ticker: "XAU/USD".to_string(),
        direction: "LONG".to_string(),
        signal_classification: "STRONG_BUY".to_string(),
        composite_score: 2.1,
        component_scores: vec![
            ("momentum".to_string(), 2.4),
            ("trend".to_string(), 1.6),
            ("rsi".to_string(), -0.5),
            ("volume".to_string(), 0.3),
        ],
        component_weights: BTreeMap::from([
            ("momentum".to_string(), 0.35),
            ("trend".to_string(), 0.30),
            ("rsi".to_string(), 0.20),
            ("volume".to_string(), 0.15),
        ]),
        entry_price: params.entry_price,
        entry_limit: params.entry_limit,
        stop_loss: params.stop_loss,
        take_profit: params.take_profit,
        position_size: params.position_size,
        risk_amount: params.risk_amount,
        risk_pct: params.risk_pct,
        reward_risk_ratio: params.reward_risk_ratio,
        tax_label: tax_label_for_broker(&broker),
        broker,
        validity_label: validity_label_for_asset_class("COMMODITY"),
        adx_value: 30.0,
        rsi_value: 62.0,
        ema_fan_aligned: true,
    };

    println!("{}", SignalCardFormatter.format(&card));
    Ok(())
}

fn print_freshness(result: &StalenessResult) {
    println!(
        "Freshness: {}",
        if result.passed { "PASS" } else { "FAIL" }
    );
    for src in &result.sources {
        let status = if src.is_stale { "STALE" } else { "fresh" };
        match src.age_hours {
            Some(age) => println!("  {:4} {status}  ({age:.1}h old)", src.label),
            None => println!("  {:4} {status}  (never updated)", src.label),
        }
    }
}

fn print_context(ctx: &MarketContext) {
    println!("Market context:");
    println!("  VIX close:        {}", fmt_value(ctx.vix_close));
    println!("  Benchmark close:  {}", fmt_value(ctx.benchmark_close));
    println!("  Benchmark SMA200: {}", fmt_value(ctx.benchmark_sma200));
    println!("  Dollar close:     {}", fmt_value(ctx.dollar_close));
    println!("  Dollar SMA200:    {}", fmt_value(ctx.dollar_sma200));
    println!("Gates:");
    println!(
        "  benchmark > SMA200: {}",
        fmt_gate(ctx.benchmark_above_sma200())
    );
    println!(
        "  dollar < SMA200:    {}",
        fmt_gate(ctx.dollar_below_sma200())
    );
    println!("  VIX below panic:    {}", fmt_gate(ctx.vix_below_panic()));
}

fn fmt_value(value: f64) -> String {
    if value.is_nan() {
        "unavailable".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn fmt_gate(gate: Option<bool>) -> &'static str {
    match gate {
        Some(true) => "pass",
        Some(false) => "fail",
        None => "undefined",
    }
}
