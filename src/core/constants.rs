//! Shared constants used across the application

use std::time::Duration;

/// How long a fetched rate table stays trustworthy before a refresh is due.
pub const CACHE_DURATION: Duration = Duration::from_secs(12 * 60 * 60);

/// Interval of the background refresh timer.
/// A tick only fetches when the cached table is missing or stale.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Key under which the rate snapshot is persisted.
pub const RATES_STORAGE_KEY: &str = "currencyRatesCache";

pub const DEFAULT_BASE_CURRENCY: &str = "EUR";

/// Rate API root; the base currency code is appended as the last path segment.
pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest";

/// Agents whose name contains this keyword get their responses converted.
pub const DEFAULT_AGENT_KEYWORD: &str = "price";
