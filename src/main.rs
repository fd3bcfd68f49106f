use analytics::{monthly_net_flows, AnalyticsEngine};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use core_types::{
    BalanceSheetSnapshot, BudgetDefinition, IncomeStatementSnapshot, MonthKey, Transaction,
    TransactionType,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

mod render;

/// The main entry point for the Tally analytics application.
#[tokio::main]
async fn main() -> Result<()> {
    // A .env file is optional; it usually only carries RUST_LOG and TALLY__* overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let _guard = configuration::init_tracing(cli.log_dir.as_deref())?;

    let config = configuration::load_config(cli.config.as_deref())
        .context("Failed to load the analytics configuration")?;

    let engine = AnalyticsEngine::new(&config)?;
    tracing::info!(command = cli.command.name(), "Tally starting");

    // Execute the appropriate command
    match cli.command {
        Commands::Ratios(args) => report_ratios(&engine, args),
        Commands::Health(args) => report_health(&engine, args),
        Commands::Budgets(args) => report_budgets(&engine, args),
        Commands::Forecast(args) => report_forecast(&engine, args),
        Commands::Anomalies(args) => report_anomalies(&engine, args),
        Commands::Serve(args) => {
            let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
            web_server::run_server(addr, &config).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Financial analytics for small-business ledgers.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional TOML policy file (score tiers, rules, thresholds).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write daily-rolling log files into this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute financial ratios from a statements file.
    Ratios(StatementsArgs),
    /// Score financial health and list recommendations.
    Health(StatementsArgs),
    /// Show budget execution for one period.
    Budgets(BudgetArgs),
    /// Project monthly net cash flow forward.
    Forecast(ForecastArgs),
    /// Flag unusual transactions.
    Anomalies(AnomalyArgs),
    /// Run the HTTP API.
    Serve(ServeArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ratios(_) => "ratios",
            Commands::Health(_) => "health",
            Commands::Budgets(_) => "budgets",
            Commands::Forecast(_) => "forecast",
            Commands::Anomalies(_) => "anomalies",
            Commands::Serve(_) => "serve",
        }
    }
}

#[derive(Parser)]
struct StatementsArgs {
    /// JSON file with `balanceSheet` and `incomeStatement`.
    #[arg(long)]
    statements: PathBuf,
}

#[derive(Parser)]
struct BudgetArgs {
    /// JSON file with `budgets` and `transactions`.
    #[arg(long)]
    file: PathBuf,

    /// Period key (YYYY-MM or YYYY).
    #[arg(long)]
    period: String,
}

#[derive(Parser)]
struct ForecastArgs {
    /// JSON array of transactions.
    #[arg(long)]
    transactions: PathBuf,

    /// First month of history (YYYY-MM).
    #[arg(long)]
    from: MonthKey,

    /// Last month of history (YYYY-MM).
    #[arg(long)]
    to: MonthKey,

    /// Number of months to project.
    #[arg(long, default_value_t = 6)]
    horizon: i32,
}

#[derive(Parser)]
struct AnomalyArgs {
    /// JSON array of transactions.
    #[arg(long)]
    transactions: PathBuf,

    #[arg(long = "type", value_enum, default_value_t = Flow::Expense)]
    kind: Flow,

    /// Only assess the trailing window ending at this date (YYYY-MM-DD).
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

#[derive(Parser)]
struct ServeArgs {
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[derive(Clone, Copy, ValueEnum)]
enum Flow {
    Income,
    Expense,
}

impl From<Flow> for TransactionType {
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::Income => TransactionType::Income,
            Flow::Expense => TransactionType::Expense,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementsFile {
    balance_sheet: BalanceSheetSnapshot,
    income_statement: IncomeStatementSnapshot,
}

#[derive(Deserialize)]
struct BudgetFile {
    budgets: Vec<BudgetDefinition>,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

// ==============================================================================
// Report Commands
// ==============================================================================

fn report_ratios(engine: &AnalyticsEngine, args: StatementsArgs) -> Result<()> {
    let input: StatementsFile = read_json(&args.statements)?;
    let ratios = engine.ratios(&input.balance_sheet, &input.income_statement)?;
    println!("{}", render::ratios_table(&ratios));
    Ok(())
}

fn report_health(engine: &AnalyticsEngine, args: StatementsArgs) -> Result<()> {
    let input: StatementsFile = read_json(&args.statements)?;
    let assessment = engine.assess_health(&input.balance_sheet, &input.income_statement)?;
    println!("{}", render::health_table(&assessment));
    if assessment.recommendations.is_empty() {
        println!("No recommendations.");
    } else {
        println!("{}", render::recommendations_table(&assessment));
    }
    Ok(())
}

fn report_budgets(engine: &AnalyticsEngine, args: BudgetArgs) -> Result<()> {
    let input: BudgetFile = read_json(&args.file)?;
    let overview = engine.budget_overview(&args.period, &input.budgets, &input.transactions)?;
    println!("Budget execution for {}", overview.period);
    println!("{}", render::budget_table(&overview));
    Ok(())
}

fn report_forecast(engine: &AnalyticsEngine, args: ForecastArgs) -> Result<()> {
    let transactions: Vec<Transaction> = read_json(&args.transactions)?;
    tracing::info!(count = transactions.len(), "Loaded transactions");
    let history = monthly_net_flows(&transactions, args.from, args.to)?;
    let points = engine.forecast(&history, args.horizon)?;
    println!(
        "Forecast from {} months of history ({} to {})",
        history.len(),
        args.from,
        args.to
    );
    println!("{}", render::forecast_table(&points));
    Ok(())
}

fn report_anomalies(engine: &AnalyticsEngine, args: AnomalyArgs) -> Result<()> {
    let transactions: Vec<Transaction> = read_json(&args.transactions)?;
    tracing::info!(count = transactions.len(), "Loaded transactions");
    let kind = TransactionType::from(args.kind);
    let report = match args.as_of {
        Some(as_of) => engine.detect_recent_anomalies(&transactions, kind, as_of)?,
        None => {
            let population: Vec<Transaction> =
                transactions.into_iter().filter(|tx| tx.kind == kind).collect();
            engine.detect_anomalies(&population)?
        }
    };
    println!(
        "{} {} transactions, mean {:.2}, std dev {:.2}",
        report.sample_size, report.transaction_type, report.mean, report.std_dev
    );
    if report.anomalies.is_empty() {
        println!("No anomalies found.");
    } else {
        println!("{}", render::anomaly_table(&report));
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
