//! `pricefx rates` and `pricefx prompt`.

use std::error::Error;

use crate::convert::prompt::rates_prompt_block;
use crate::core::rates::RateStore;

pub async fn run_rates(
    rates: &RateStore,
    refresh: bool,
    codes: &[String],
) -> Result<(), Box<dyn Error>> {
    let available = if refresh {
        rates.fetch_rates().await || rates.load_from_persistent()
    } else {
        rates.initialize().await
    };

    if !available {
        eprintln!("⚠️  No currency rates available. Check your connection or rates-url.");
        std::process::exit(1);
    }

    println!("{}", rates.rates_info());
    for line in describe_codes(rates, codes) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_prompt(rates: &RateStore) -> Result<(), Box<dyn Error>> {
    if !rates.initialize().await {
        eprintln!("⚠️  No currency rates available; prompt block is empty.");
    }
    print!(
        "{}",
        rates_prompt_block(rates.snapshot().as_deref(), chrono::Utc::now())
    );
    Ok(())
}

/// One display line per requested code.
pub fn describe_codes(rates: &RateStore, codes: &[String]) -> Vec<String> {
    let base = rates.base();
    codes
        .iter()
        .map(|code| code.trim().to_ascii_uppercase())
        .map(|code| match rates.get(&code) {
            Some(rate) => format!("1 {} = {rate:.4} {code}", base.code()),
            None if code == base.code() => format!("1 {0} = 1.0000 {0}", base.code()),
            None => format!("{code}: rate not found"),
        })
        .collect()
}
