//! Live-rate summary for system prompts.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

use crate::core::rates::RateTable;

/// Currencies listed in the prompt block, in display order.
pub const MAJOR_CURRENCIES: [&str; 10] = [
    "USD", "GBP", "JPY", "CNY", "INR", "AUD", "CAD", "CHF", "MXN", "BRL",
];

/// Render the rate block appended to a price agent's system prompt.
///
/// Returns an empty string when no table is loaded.
pub fn rates_prompt_block(table: Option<&RateTable>, now: DateTime<Utc>) -> String {
    let Some(table) = table else {
        return String::new();
    };

    let base = table.base().code();
    let age_minutes = table.age(now).as_secs() / 60;
    let mut block = format!("\n\n=== LIVE EXCHANGE RATES (Base: {base}) ===\n");
    let _ = writeln!(
        block,
        "Last updated: {} ({age_minutes} min ago)\n",
        table
            .fetched_at()
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    for code in MAJOR_CURRENCIES.iter().filter(|code| **code != base) {
        if let Some(rate) = table.get(code) {
            let _ = writeln!(block, "1 {base} = {rate:.4} {code}");
        }
    }

    let _ = writeln!(
        block,
        "\nAll {} currencies available. Use these live rates for accurate conversions.",
        table.len()
    );
    block.push_str("===================================\n");
    block
}
