//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod convert;
pub mod rates;

use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cli::convert::run_convert;
use crate::cli::rates::{run_prompt, run_rates};
use crate::core::clock::SystemClock;
use crate::core::config::Config;
use crate::core::rate_source::HttpRateSource;
use crate::core::rates::RateStore;
use crate::core::session::PriceSession;
use crate::core::store::FileStore;
use crate::utils::logging::init_tracing;

#[derive(Parser)]
#[command(name = "pricefx")]
#[command(version, about = "Convert price listings in LLM responses into your base currency")]
#[command(
    long_about = "pricefx post-processes responses from a price-finding LLM agent. Lines shaped \
like `Label | amount CODE ::` get the base-currency equivalent appended, using live exchange \
rates cached for 12 hours.\n\n\
Environment Variables:\n\
  PRICEFX_CONFIG     Path to the configuration file\n\
  PRICEFX_DATA_DIR   Directory for the cached rate snapshot\n\
  RUST_LOG           Log filter (logs go to stderr)\n\n\
Configuration keys (pricefx set <key> <value>):\n\
  base-currency      Currency to convert into (EUR, USD, GBP, JPY, INR)\n\
  rates-url          Rate API root, base code is appended\n\
  cache-hours        Hours before cached rates are refreshed\n\
  refresh-minutes    Minutes between background staleness checks\n\
  agent-keyword      Agent names containing this get conversion"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Agent that produced the response; only price agents are converted
    #[arg(short = 'a', long, global = true, default_value = "price")]
    pub agent: String,

    /// Append raw and converted responses to this file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a response read from FILE or stdin (default)
    Convert {
        /// File holding the response; stdin when omitted
        file: Option<String>,
    },
    /// Show cached exchange rates
    Rates {
        /// Fetch fresh rates before printing
        #[arg(long)]
        refresh: bool,
        /// Currency codes to print individually
        codes: Vec<String>,
    },
    /// Print the live-rate block appended to price agent prompts
    Prompt,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(Commands::Convert { file: None }) {
        Commands::Convert { file } => {
            let mut session = build_session(&config);
            run_convert(&mut session, &config, file, &args.agent, args.log).await
        }
        Commands::Rates { refresh, codes } => {
            let rates = build_rate_store(&config);
            run_rates(&rates, refresh, &codes).await
        }
        Commands::Prompt => {
            let rates = build_rate_store(&config);
            run_prompt(&rates).await
        }
        Commands::Set { key, value } => {
            let mut config = config;
            match value {
                Some(ref val) if !val.is_empty() => {
                    let val = val.join(" ");
                    if let Err(e) = config.set_value(&key, &val) {
                        eprintln!("❌ {e}");
                        std::process::exit(1);
                    }
                    config.save()?;
                    println!("✅ Set {key} to: {val}");
                }
                _ => config.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = config;
            if let Err(e) = config.unset_value(&key) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
    }
}

fn settings_or_exit(config: &Config) -> crate::core::rates::RateSettings {
    match config.rate_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {e}");
            eprintln!("Fix it with: pricefx set base-currency EUR");
            std::process::exit(1);
        }
    }
}

fn build_rate_store(config: &Config) -> RateStore {
    let settings = settings_or_exit(config);
    RateStore::new(
        settings,
        Arc::new(FileStore::new(Config::get_data_dir())),
        Arc::new(HttpRateSource::new(reqwest::Client::new(), config.rates_url())),
        Arc::new(SystemClock),
    )
}

fn build_session(config: &Config) -> PriceSession {
    let settings = settings_or_exit(config);
    PriceSession::new(
        settings,
        Arc::new(FileStore::new(Config::get_data_dir())),
        Arc::new(HttpRateSource::new(reqwest::Client::new(), config.rates_url())),
        Arc::new(SystemClock),
        config.agent_keyword(),
    )
}
