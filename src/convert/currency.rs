//! Currency codes, display symbols and common-name aliases.

use tracing::{debug, warn};

/// The reference currency every rate is expressed against.
///
/// Only currencies with an unambiguous display symbol can serve as the base,
/// since the symbol doubles as the "already converted" marker on output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseCurrency {
    code: &'static str,
    symbol: &'static str,
}

const SUPPORTED_BASES: &[BaseCurrency] = &[
    BaseCurrency::EUR,
    BaseCurrency {
        code: "USD",
        symbol: "$",
    },
    BaseCurrency {
        code: "GBP",
        symbol: "£",
    },
    BaseCurrency {
        code: "JPY",
        symbol: "¥",
    },
    BaseCurrency {
        code: "INR",
        symbol: "₹",
    },
];

impl BaseCurrency {
    pub const EUR: BaseCurrency = BaseCurrency {
        code: "EUR",
        symbol: "€",
    };

    /// Look up a supported base currency by code (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        SUPPORTED_BASES
            .iter()
            .find(|base| base.code.eq_ignore_ascii_case(code.trim()))
            .copied()
    }

    pub fn supported_codes() -> Vec<&'static str> {
        SUPPORTED_BASES.iter().map(|base| base.code).collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Render an amount in this currency with two fractional digits, e.g. `€4.55`
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{:.2}", self.symbol, amount)
    }
}

impl Default for BaseCurrency {
    fn default() -> Self {
        Self::EUR
    }
}

/// Map a lowercase currency name to its ISO code
pub fn currency_alias(name: &str) -> Option<&'static str> {
    let code = match name {
        "yen" | "jpy" => "JPY",
        "dollar" | "dollars" | "usd" => "USD",
        "peso" | "pesos" | "mxn" => "MXN",
        "pound" | "pounds" | "gbp" => "GBP",
        "euro" | "euros" | "eur" => "EUR",
        "yuan" | "cny" => "CNY",
        "rupee" | "rupees" | "inr" => "INR",
        "real" | "reais" | "brl" => "BRL",
        "franc" | "francs" | "chf" => "CHF",
        _ => return None,
    };
    Some(code)
}

/// Normalize a currency token from model output into an ISO code.
///
/// Three-letter tokens are trusted as ISO codes, except "yen" which is a name
/// that happens to be three letters long. Everything else goes through the
/// alias table and finally falls back to the uppercased token.
pub fn normalize_currency(name_or_code: &str) -> String {
    let trimmed = name_or_code.trim();
    let upper = trimmed.to_ascii_uppercase();

    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) && upper != "YEN" {
        return upper;
    }

    if let Some(code) = currency_alias(&trimmed.to_lowercase()) {
        debug!(token = %name_or_code, code, "Mapped currency name to code");
        return code.to_string();
    }

    warn!(token = %name_or_code, "Unknown currency, using token as-is");
    upper
}
