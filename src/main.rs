use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use prescreen::banner::{BannerInfo, print_banner, render_report};
use prescreen::collector::Collector;
use prescreen::collector::prompt::PromptCollector;
use prescreen::collector::text::TextCollector;
use prescreen::collector::values::ValueCollector;
use prescreen::config::{Config, Overrides, Settings};
use prescreen::consts::{SEARCH_API_KEY_ENV, default_db_path};
use prescreen::engine::Engine;
use prescreen::engine::screener::{LoanScreener, ScreenerConfig};
use prescreen::events::{Event, EventBus};
use prescreen::logging::{init_subscriber, level_for_verbosity};
use prescreen::pipeline::Screening;
use prescreen::rates::RateSource;
use prescreen::rates::fixed::FixedRate;
use prescreen::rates::search::WebSearchRates;

#[derive(Parser)]
#[command(
    name = "prescreen",
    version,
    about = "Debt-to-income, current rate, decision."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Gross monthly income
    #[arg(
        long,
        requires = "debt",
        conflicts_with = "input",
        allow_negative_numbers = true
    )]
    income: Option<f64>,

    /// Total monthly debt payments
    #[arg(
        long,
        requires = "income",
        conflicts_with = "input",
        allow_negative_numbers = true
    )]
    debt: Option<f64>,

    /// Income and debt as text, e.g. "income=5000 debt=1000" or "5000 1000"
    #[arg(short, long)]
    input: Option<String>,

    /// Use this rate text instead of searching the web (e.g. "6.5%")
    #[arg(long)]
    rate: Option<String>,

    /// Search query for the current rate
    #[arg(long)]
    query: Option<String>,

    /// DTI percentage at or above which approval is conditional
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the final session state as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Settings database path (default: ~/.prescreen/prescreen.db)
    #[arg(long)]
    db: Option<String>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Screen one "income debt" line after another until EOF or `quit`
    Repl,
    /// Read or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a stored value
    Get { key: String },
    /// Store a value
    Set { key: String, value: String },
    /// Remove a stored value
    Unset { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_subscriber(level_for_verbosity(cli.verbose));

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => {
            let path = default_db_path()?;
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            path.to_string_lossy().into_owned()
        }
    };
    let config = Config::open(&db_path)?;

    if let Some(Command::Config { action }) = &cli.command {
        return handle_config(&config, action);
    }

    let settings = Settings::resolve(
        &config,
        &Overrides {
            rate_query: cli.query.clone(),
            threshold: cli.threshold,
        },
    )?;

    let source: Arc<dyn RateSource> = match &cli.rate {
        Some(text) => Arc::new(FixedRate::new(text.clone())),
        None => {
            let Some(key) = settings.search_api_key.clone() else {
                bail!(
                    "no search API key. Set {SEARCH_API_KEY_ENV}, run \
                     `prescreen config set search.api_key <KEY>`, or pass --rate."
                );
            };
            Arc::new(WebSearchRates::new(key)?)
        }
    };

    let events = Arc::new(EventBus::default());
    let screener = LoanScreener::new(
        Arc::clone(&source),
        ScreenerConfig {
            rate_query: settings.rate_query.clone(),
            threshold: settings.threshold,
        },
    )
    .with_events(Arc::clone(&events));

    if !cli.json {
        spawn_progress(&events);
    }

    if matches!(cli.command, Some(Command::Repl)) {
        print_banner(&BannerInfo {
            rate_source: source.name(),
            rate_query: &settings.rate_query,
            threshold: settings.threshold,
            config: &db_path,
        });
        return repl(&screener, cli.json).await;
    }

    let collector: Box<dyn Collector> = match (&cli.input, cli.income, cli.debt) {
        (Some(text), _, _) => Box::new(TextCollector::new(text.clone())),
        (None, Some(income), Some(debt)) => Box::new(ValueCollector::new(income, debt)),
        _ => Box::new(PromptCollector),
    };

    let screening = screener.run(collector.as_ref()).await?;
    print_screening(&screening, cli.json)?;
    Ok(())
}

/// Echo phase changes to stderr while a run is in flight.
fn spawn_progress(events: &EventBus) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            let Event::PhaseChanged { to, .. } = event;
            eprintln!("  … {to}");
        }
    });
}

fn print_screening(screening: &Screening, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(screening)?);
    } else {
        println!("\n{}", render_report(screening));
    }
    Ok(())
}

async fn repl(screener: &LoanScreener, json: bool) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nincome debt> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        match screener.run(&TextCollector::new(line)).await {
            Ok(screening) => print_screening(&screening, json)?,
            Err(e) => eprintln!("\nerror: {}", e),
        }
    }

    println!("goodbye.");
    Ok(())
}

fn handle_config(config: &Config, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => match config.get(key)? {
            Some(value) => println!("{value}"),
            None => println!("{key} is not set"),
        },
        ConfigAction::Set { key, value } => {
            config.set(key, value)?;
            println!("✓ {key} saved");
        }
        ConfigAction::Unset { key } => {
            config.remove(key)?;
            println!("✓ {key} removed");
        }
    }
    Ok(())
}
