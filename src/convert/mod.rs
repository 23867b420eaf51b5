//! Price-line conversion for model responses.
//!
//! [`PriceLineConverter`] rewrites recognised `Label | amount CODE ::` lines
//! with the base-currency equivalent appended, leaves everything else alone,
//! and flattens the result into a single ` :: `-separated string.

pub mod currency;
pub mod patterns;
pub mod prompt;

use tracing::{debug, error, info, warn};

use crate::convert::currency::{normalize_currency, BaseCurrency};
use crate::convert::patterns::{
    has_price_candidate, is_missing_currency, match_price_line, strip_terminator,
    LINE_TERMINATOR,
};
use crate::core::rates::{RateStore, RateTable};

/// Appended once to the whole response when no rate table is loaded.
pub const RATES_UNAVAILABLE_MARKER: &str =
    "[⚠️ Currency conversion unavailable - rates not loaded]";
/// Appended to a price line that has an amount but no currency.
pub const MISSING_CURRENCY_MARKER: &str = "[⚠️ Missing currency code - cannot convert]";
/// Shown after `€?` when the line's currency is absent from the table.
pub const RATE_NOT_FOUND_MARKER: &str = "(rate not found)";
/// Joins the processed lines of a response.
pub const OUTPUT_SEPARATOR: &str = " :: ";

/// What happened to a single input line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Already carries the base symbol.
    AlreadyConverted,
    /// Has an amount but no currency word.
    MissingCurrency,
    /// Not a price line.
    Unmatched,
    /// Priced in the base currency; no rate lookup needed.
    Base {
        label: String,
        amount: String,
        value: f64,
    },
    Converted {
        label: String,
        amount: String,
        currency: String,
        value: f64,
    },
    RateNotFound {
        label: String,
        amount: String,
        currency: String,
    },
}

impl LineOutcome {
    /// Render the outcome for `line`, the original untrimmed input line.
    pub fn render(&self, line: &str, base: BaseCurrency) -> String {
        match self {
            LineOutcome::AlreadyConverted | LineOutcome::Unmatched => line.to_string(),
            LineOutcome::MissingCurrency => format!("{line} {MISSING_CURRENCY_MARKER}"),
            LineOutcome::Base {
                label,
                amount,
                value,
            } => format!(
                "{label}| {amount} {} | {} {LINE_TERMINATOR}",
                base.code(),
                base.format_amount(*value)
            ),
            LineOutcome::Converted {
                label,
                amount,
                currency,
                value,
            } => format!(
                "{label}| {amount} {currency} | {} {LINE_TERMINATOR}",
                base.format_amount(*value)
            ),
            LineOutcome::RateNotFound {
                label,
                amount,
                currency,
            } => format!(
                "{label}| {amount} {currency} | {}? {RATE_NOT_FOUND_MARKER} {LINE_TERMINATOR}",
                base.symbol()
            ),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PriceLineConverter;

impl PriceLineConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert the price lines in `raw` using whatever rates `rates`
    /// currently holds. Never performs I/O.
    pub fn process(&self, raw: &str, rates: &RateStore) -> String {
        let table = rates.snapshot();
        self.process_with_table(raw, rates.base(), table.as_deref())
    }

    pub fn process_with_table(
        &self,
        raw: &str,
        base: BaseCurrency,
        table: Option<&RateTable>,
    ) -> String {
        let Some(table) = table else {
            error!("No rates available for conversion");
            return format!("{raw}\n\n{RATES_UNAVAILABLE_MARKER}");
        };

        if !has_price_candidate(raw) {
            debug!("No currency patterns detected, skipping conversion");
            return raw.to_string();
        }

        let lines: Vec<String> = raw
            .split('\n')
            .map(|line| self.convert_line(line, base, table).render(line, base))
            .collect();

        reassemble(&lines)
    }

    /// Classify and convert one line.
    pub fn convert_line(&self, line: &str, base: BaseCurrency, table: &RateTable) -> LineOutcome {
        let trimmed = line.trim();

        if trimmed.contains(base.symbol()) {
            debug!(line = trimmed, "Already converted");
            return LineOutcome::AlreadyConverted;
        }

        if is_missing_currency(trimmed) {
            warn!(line = trimmed, "No currency code found, cannot convert");
            return LineOutcome::MissingCurrency;
        }

        let Some((pattern, parsed)) = match_price_line(trimmed) else {
            debug!(line = trimmed, "No match for line");
            return LineOutcome::Unmatched;
        };

        let Some(value) = parsed.amount_value() else {
            warn!(amount = parsed.amount, "Unparseable amount");
            return LineOutcome::Unmatched;
        };

        let currency = normalize_currency(parsed.currency_token);
        let label = parsed.label.to_string();
        let amount = parsed.amount.to_string();

        debug!(
            pattern,
            label = parsed.label.trim(),
            amount = parsed.amount,
            token = parsed.currency_token,
            currency = %currency,
            "Found price line"
        );

        if currency == base.code() {
            return LineOutcome::Base {
                label,
                amount,
                value,
            };
        }

        match table.convert_to_base(value, &currency) {
            Some(converted) => {
                info!(
                    "Converted {amount} {currency} to {}",
                    base.format_amount(converted)
                );
                LineOutcome::Converted {
                    label,
                    amount,
                    currency,
                    value: converted,
                }
            }
            None => {
                error!("Failed to convert {currency}");
                LineOutcome::RateNotFound {
                    label,
                    amount,
                    currency,
                }
            }
        }
    }
}

/// Drop blank lines, strip trailing terminators and join with the separator.
pub fn reassemble<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .map(strip_terminator)
        .collect::<Vec<_>>()
        .join(OUTPUT_SEPARATOR)
}

#[cfg(test)]
mod tests;
