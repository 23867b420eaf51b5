//! Line patterns for price listings in model output.
//!
//! Price lines look like `Label | 1650 JPY ::`. The matchers below are tried
//! in order and the first hit wins; later ones are looser fallbacks.

use regex::Regex;
use std::sync::LazyLock;

/// Cheap pre-check: a number followed by whitespace and a short word.
static PRICE_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?\s+[A-Za-z]{3,6}").expect("valid regex"));

/// A pipe-delimited amount ending in the terminator, possibly without a code.
static AMOUNT_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\|(\s*\d+(?:\.\d+)?\s*(?:\([^)]+\))?\s*)::$").expect("valid regex")
});

static CURRENCY_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]{3,6}").expect("valid regex"));

static TRAILING_TERMINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*::\s*$").expect("valid regex"));

pub const LINE_TERMINATOR: &str = "::";

/// One parsed price line. Borrowed from the input, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLine<'a> {
    /// Everything before the first pipe, including trailing whitespace.
    pub label: &'a str,
    /// The amount exactly as written.
    pub amount: &'a str,
    pub currency_token: &'a str,
}

impl PriceLine<'_> {
    pub fn amount_value(&self) -> Option<f64> {
        self.amount.parse::<f64>().ok().filter(|value| value.is_finite())
    }
}

pub struct LinePattern {
    pub name: &'static str,
    regex: Regex,
}

impl LinePattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("valid regex"),
        }
    }

    pub fn parse<'a>(&self, line: &'a str) -> Option<PriceLine<'a>> {
        let caps = self.regex.captures(line)?;
        Some(PriceLine {
            label: caps.get(1)?.as_str(),
            amount: caps.get(2)?.as_str(),
            currency_token: caps.get(3)?.as_str(),
        })
    }
}

/// Matchers in priority order.
pub static PRICE_LINE_PATTERNS: LazyLock<[LinePattern; 3]> = LazyLock::new(|| {
    [
        // "Label | 1650 JPY ::", "Label | 5 USD (approx) | EUR ::"
        LinePattern::new(
            "terminated",
            r"^(.+?)\|\s*(\d+(?:\.\d+)?)\s+([A-Za-z]{3,6})\s*(?:\([^)]*\)\s*)?(?:\|\s*[A-Za-z]{3,6}\s*)?::$",
        ),
        // "Label | 1650 JPY"
        LinePattern::new(
            "unterminated",
            r"^(.+?)\|\s*(\d+(?:\.\d+)?)\s+([A-Za-z]{3,6})\s*$",
        ),
        // "Label | 1650 | JPY"
        LinePattern::new(
            "piped-code",
            r"^(.+?)\|\s*(\d+(?:\.\d+)?)\s*\|\s*([A-Za-z]{3,6})\s*$",
        ),
    ]
});

/// Parse a trimmed line with the first pattern that accepts it.
pub fn match_price_line(line: &str) -> Option<(&'static str, PriceLine<'_>)> {
    PRICE_LINE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.parse(line).map(|parsed| (pattern.name, parsed)))
}

/// Cheap check for whether `text` may hold price lines at all: an amount
/// followed by a word, or a `Label | 149 ::` line with no currency.
pub fn has_price_candidate(text: &str) -> bool {
    PRICE_CANDIDATE.is_match(text) || text.lines().any(|line| is_missing_currency(line.trim()))
}

/// True for lines like `Widget | 149 ::` that carry an amount but no
/// currency word after the label.
pub fn is_missing_currency(line: &str) -> bool {
    AMOUNT_ONLY
        .captures(line)
        .and_then(|caps| caps.get(2))
        .is_some_and(|segment| !CURRENCY_WORD.is_match(segment.as_str()))
}

/// Remove one trailing `::` terminator and surrounding whitespace.
pub fn strip_terminator(line: &str) -> &str {
    match TRAILING_TERMINATOR.find(line) {
        Some(found) => &line[..found.start()],
        None => line,
    }
}
