// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

use perfolio::api::ApiClient;
use perfolio::config::{self, Config};
use perfolio::exchange_rates;
use perfolio::logging;
use perfolio::models::{self, Catalogue, Currency};
use perfolio::positions;
use perfolio::route::{self, Route, RouteController};
use perfolio::session::{self, FileStore};

#[derive(Parser)]
#[command(name = "perfolio", version, about = "PerFolio gold savings toolkit")]
struct Cli {
    /// Config file (defaults to the per-user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported currencies
    Currencies {
        #[arg(long, conflicts_with = "additional")]
        popular: bool,
        #[arg(long)]
        additional: bool,
        /// Also export the listed currencies to CSV (default: output/currencies_<timestamp>.csv)
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        csv: Option<PathBuf>,
    },
    /// Convert an amount between two currencies
    Convert {
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
        #[arg(long, default_value = "USD")]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Format an amount in a currency
    Format {
        code: String,
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
    },
    /// Show the splash and print the initial route
    Start,
    /// Store a session after signing in
    Login {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        token: String,
    },
    /// Clear the stored session
    Logout,
    /// Refresh conversion rates from the rate feed
    Rates,
    /// Query Fluid positionsByUser for a wallet
    Positions {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        resolver: Option<String>,
        #[arg(long)]
        rpc_url: Option<String>,
        /// Skip TLS certificate verification for the RPC endpoint
        #[arg(long)]
        insecure: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    let mut catalogue = Catalogue::default();

    match cli.command {
        Commands::Currencies {
            popular,
            additional,
            csv,
        } => list_currencies(&catalogue, popular, additional, csv)?,
        Commands::Convert { amount, from, to } => {
            let converted = catalogue
                .convert(amount, &from, &to)
                .with_context(|| format!("Failed to convert {} {} to {}", amount, from, to))?;
            println!(
                "{} = {}",
                catalogue.format_code(&from, amount),
                catalogue.format_code(&to, converted)
            );
        }
        Commands::Format { code, amount } => println!("{}", catalogue.format_code(&code, amount)),
        Commands::Start => start(&config).await?,
        Commands::Login { wallet, token } => login(&config, &wallet, &token)?,
        Commands::Logout => logout(&config)?,
        Commands::Rates => {
            let client = ApiClient::new(&config.api)?;
            let update = exchange_rates::refresh_rates(&client, &mut catalogue)
                .await
                .context("Failed to refresh exchange rates")?;
            println!("✅ Updated {} rates", update.updated.len());
            if !update.rejected.is_empty() {
                println!("⚠️  Rejected non-positive rates for: {}", update.rejected.join(", "));
            }
            print_table(catalogue.all().iter());
        }
        Commands::Positions {
            wallet,
            resolver,
            rpc_url,
            insecure,
        } => {
            config.api.insecure |= insecure;
            let rpc_url = rpc_url
                .or_else(|| config.rpc.url.clone())
                .context("No RPC URL given (use --rpc-url or PERFOLIO_RPC_URL)")?;
            let resolver = resolver.unwrap_or_else(|| config.rpc.resolver.clone());
            query_positions(&config, &rpc_url, &resolver, &wallet).await?;
        }
    }

    Ok(())
}

fn list_currencies(
    catalogue: &Catalogue,
    popular: bool,
    additional: bool,
    csv: Option<PathBuf>,
) -> Result<()> {
    let selected: Vec<&Currency> = if popular {
        catalogue.popular().collect()
    } else if additional {
        catalogue.additional().collect()
    } else {
        catalogue.all().iter().collect()
    };

    print_table(selected.iter().copied());

    if let Some(path) = csv {
        let path = if path.as_os_str().is_empty() {
            exchange_rates::default_export_path()
        } else {
            path
        };
        let rows = exchange_rates::export_currencies_csv(selected.iter().copied(), &path)?;
        println!("📁 CSV file created: {} ({} rows)", path.display(), rows);
    }
    Ok(())
}

fn print_table<'a>(currencies: impl Iterator<Item = &'a Currency>) {
    for currency in currencies {
        println!(
            "{:<4} {:<22} {:<12} {:>12}  {}",
            currency.code,
            currency.name,
            currency.region,
            currency.conversion_rate,
            models::format(currency, Decimal::ONE_HUNDRED)
        );
    }
}

async fn start(config: &Config) -> Result<()> {
    let store = FileStore::open(&config.app.store_path)?;
    let mut controller = RouteController::new(Duration::from_millis(config.app.splash_ms));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message("Amigo Gold");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let route = controller.finish_splash(&store).await;
    spinner.finish_and_clear();

    match route {
        Route::Main => println!("✅ Signed in, opening main"),
        _ => println!("👋 No session, opening landing"),
    }
    Ok(())
}

fn login(config: &Config, wallet: &str, token: &str) -> Result<()> {
    let mut store = FileStore::open(&config.app.store_path)?;
    let mut controller = RouteController::new(Duration::ZERO);
    controller.handle(route::RouteEvent::SplashFinished {
        session_present: session::has_session(&store),
    });

    if controller.route() == Route::Main {
        println!("Already signed in");
        return Ok(());
    }
    controller.authenticated(&mut store, wallet, token)?;
    println!("✅ Session stored in {}", config.app.store_path.display());
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let mut store = FileStore::open(&config.app.store_path)?;
    let mut controller = RouteController::new(Duration::ZERO);
    controller.handle(route::RouteEvent::SplashFinished {
        session_present: session::has_session(&store),
    });

    if controller.route() == Route::Main {
        controller.logged_out(&mut store)?;
        println!("✅ Session cleared");
    } else if session::has_any_record(&store) {
        session::sign_out(&mut store)?;
        println!("🧹 Cleared an incomplete session");
    } else {
        println!("No session to clear");
    }
    Ok(())
}

async fn query_positions(config: &Config, rpc_url: &str, resolver: &str, wallet: &str) -> Result<()> {
    println!("→ RPC URL     : {}", rpc_url);
    println!("→ Resolver    : {}", resolver);
    println!("→ Wallet      : {}", wallet);
    println!("→ Calldata    : {}", positions::build_calldata(wallet)?);

    let client = ApiClient::new(&config.api)?;
    let response = positions::fetch_positions(&client, rpc_url, resolver, wallet)
        .await
        .context("positionsByUser call failed")?;

    println!("\nRPC response:\n{}", serde_json::to_string_pretty(&response.raw)?);

    if let Some(err) = &response.error {
        println!("\nRPC error {}: {}", err.code, err.message);
        if let Some(data) = err.data_str() {
            println!("Decoded error data: {}", data);
        }
    } else if response.result.is_none() {
        println!("\nRPC response carried no result");
    }
    Ok(())
}
