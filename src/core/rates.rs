//! Exchange-rate cache with persistence and staleness policy.
//!
//! A [`RateStore`] owns the current [`RateTable`]. The table is only ever
//! replaced as a whole, either from the persisted snapshot at startup or from
//! a successful fetch. Readers take an `Arc` snapshot and never observe a
//! partially updated table.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::convert::currency::BaseCurrency;
use crate::core::clock::Clock;
use crate::core::constants::{CACHE_DURATION, RATES_STORAGE_KEY};
use crate::core::rate_source::{FetchError, RateSource};
use crate::core::store::KeyValueStore;

/// Violations of the rate table invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum RateTableError {
    /// No usable rates remained after validation.
    Empty,
    /// The base currency is present with a rate other than 1.0.
    BaseRate { base: String, rate: f64 },
}

impl fmt::Display for RateTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateTableError::Empty => write!(f, "rate table contains no usable rates"),
            RateTableError::BaseRate { base, rate } => {
                write!(f, "base currency {base} must have rate 1.0, got {rate}")
            }
        }
    }
}

impl StdError for RateTableError {}

/// Rates quoted against a base currency: `1 base = rate units of code`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: BaseCurrency,
    rates: BTreeMap<String, f64>,
    fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Build a table, uppercasing codes and dropping non-positive or
    /// non-finite rates.
    pub fn new(
        base: BaseCurrency,
        rates: BTreeMap<String, f64>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, RateTableError> {
        let mut cleaned = BTreeMap::new();
        for (code, rate) in rates {
            let code = code.trim().to_ascii_uppercase();
            if !rate.is_finite() || rate <= 0.0 {
                warn!(code = %code, rate, "Dropping unusable exchange rate");
                continue;
            }
            cleaned.insert(code, rate);
        }

        if let Some(&rate) = cleaned.get(base.code()) {
            if (rate - 1.0).abs() > f64::EPSILON {
                return Err(RateTableError::BaseRate {
                    base: base.code().to_string(),
                    rate,
                });
            }
        }

        if cleaned.is_empty() {
            return Err(RateTableError::Empty);
        }

        Ok(Self {
            base,
            rates: cleaned,
            fetched_at,
        })
    }

    pub fn base(&self) -> BaseCurrency {
        self.base
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn rates(&self) -> &BTreeMap<String, f64> {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Age relative to `now`; a timestamp in the future counts as zero age.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Convert `amount` units of `code` into the base currency.
    pub fn convert_to_base(&self, amount: f64, code: &str) -> Option<f64> {
        if code == self.base.code() {
            return Some(amount);
        }

        let Some(rate) = self.get(code) else {
            let sample: Vec<&str> = self.rates.keys().take(10).map(String::as_str).collect();
            error!(code, available = ?sample, "Currency not found in rates");
            return None;
        };

        let result = amount / rate;
        debug!(
            "Conversion: {amount} {code} / {rate} = {}",
            self.base.format_amount(result)
        );
        Some(result)
    }

    fn to_snapshot(&self) -> RateSnapshot {
        RateSnapshot {
            rates: self.rates.clone(),
            timestamp: self.fetched_at.timestamp_millis(),
        }
    }
}

/// Persisted form: `{"rates": {...}, "timestamp": <epoch-ms>}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub rates: BTreeMap<String, f64>,
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct RateSettings {
    pub base: BaseCurrency,
    pub cache_duration: Duration,
    pub storage_key: String,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            base: BaseCurrency::default(),
            cache_duration: CACHE_DURATION,
            storage_key: RATES_STORAGE_KEY.to_string(),
        }
    }
}

struct Inner {
    settings: RateSettings,
    table: RwLock<Option<Arc<RateTable>>>,
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn RateSource>,
    clock: Arc<dyn Clock>,
}

/// Shared handle to the rate cache. Clones refer to the same table.
#[derive(Clone)]
pub struct RateStore {
    inner: Arc<Inner>,
}

impl RateStore {
    pub fn new(
        settings: RateSettings,
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn RateSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                table: RwLock::new(None),
                store,
                source,
                clock,
            }),
        }
    }

    pub fn settings(&self) -> &RateSettings {
        &self.inner.settings
    }

    pub fn base(&self) -> BaseCurrency {
        self.inner.settings.base
    }

    /// Load the persisted snapshot, fetching fresh rates when it is missing
    /// or stale. Returns whether a table is available afterwards.
    pub async fn initialize(&self) -> bool {
        if self.load_from_persistent() {
            return true;
        }
        self.fetch_rates().await
    }

    /// Restore the persisted snapshot if it exists and is still fresh.
    ///
    /// Missing, unreadable, malformed and expired snapshots are all treated
    /// as a cache miss.
    pub fn load_from_persistent(&self) -> bool {
        let key = &self.inner.settings.storage_key;
        let raw = match self.inner.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No cached rates found");
                return false;
            }
            Err(err) => {
                error!("Error loading cached rates: {err}");
                return false;
            }
        };

        let snapshot: RateSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!("Error parsing cached rates: {err}");
                return false;
            }
        };

        let Some(fetched_at) = Utc.timestamp_millis_opt(snapshot.timestamp).single() else {
            error!(timestamp = snapshot.timestamp, "Cached rates have an invalid timestamp");
            return false;
        };

        let table = match RateTable::new(self.base(), snapshot.rates, fetched_at) {
            Ok(table) => table,
            Err(err) => {
                error!("Cached rates rejected: {err}");
                return false;
            }
        };

        let age = table.age(self.inner.clock.now());
        if age >= self.inner.settings.cache_duration {
            info!("Cached rates expired, will fetch fresh data");
            return false;
        }

        info!(
            "Loaded cached currency rates: {} currencies ({} minutes old)",
            table.len(),
            age.as_secs() / 60
        );
        self.install(table);
        true
    }

    /// Fetch fresh rates, replace the table and persist the snapshot.
    ///
    /// On any failure the current table is left untouched and `false` is
    /// returned.
    pub async fn fetch_rates(&self) -> bool {
        match self.try_fetch().await {
            Ok(count) => {
                info!("Currency rates fetched and cached: {count} currencies");
                true
            }
            Err(err) => {
                error!("Failed to fetch currency rates: {err}");
                false
            }
        }
    }

    async fn try_fetch(&self) -> Result<usize, FetchError> {
        let base = self.base();
        let rates = self.inner.source.fetch(base.code()).await?;
        let table = RateTable::new(base, rates, self.inner.clock.now())
            .map_err(|err| FetchError::InvalidTable(err.to_string()))?;
        let count = table.len();

        match serde_json::to_string(&table.to_snapshot()) {
            Ok(serialized) => {
                if let Err(err) = self
                    .inner
                    .store
                    .set(&self.inner.settings.storage_key, &serialized)
                {
                    warn!("Failed to persist currency rates: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize currency rates: {err}"),
        }

        self.install(table);
        Ok(count)
    }

    /// Schedule a background fetch when the table is missing or stale.
    ///
    /// Never blocks. The returned handle may be dropped; the task still runs
    /// and only logs its outcome. Returns `None` when no refresh was needed
    /// or no tokio runtime is available.
    pub fn check_and_refresh(&self) -> Option<JoinHandle<()>> {
        if !self.needs_refresh() {
            return None;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                warn!("Cannot refresh rates in background: {err}");
                return None;
            }
        };

        let store = self.clone();
        Some(runtime.spawn(async move {
            if !store.fetch_rates().await {
                error!("Background rate refresh failed");
            }
        }))
    }

    pub fn needs_refresh(&self) -> bool {
        match self.snapshot() {
            None => true,
            Some(table) => {
                table.age(self.inner.clock.now()) >= self.inner.settings.cache_duration
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Age of the current table in whole minutes, `None` when nothing is loaded.
    pub fn age_minutes(&self) -> Option<u64> {
        self.snapshot()
            .map(|table| table.age(self.inner.clock.now()).as_secs() / 60)
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.snapshot().and_then(|table| table.get(code))
    }

    pub fn convert_to_base(&self, amount: f64, code: &str) -> Option<f64> {
        match self.snapshot() {
            Some(table) => table.convert_to_base(amount, code),
            None => {
                error!("Currency rates not loaded");
                None
            }
        }
    }

    /// Current table, shared.
    pub fn snapshot(&self) -> Option<Arc<RateTable>> {
        self.inner
            .table
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Short human summary such as `"162 currencies (14 min old)"`.
    pub fn rates_info(&self) -> String {
        match (self.snapshot(), self.age_minutes()) {
            (Some(table), Some(age)) => format!("{} currencies ({} min old)", table.len(), age),
            _ => "No rates loaded".to_string(),
        }
    }

    pub(crate) fn install(&self, table: RateTable) {
        let mut slot = self
            .inner
            .table
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Arc::new(table));
    }
}

/// Periodically run [`RateStore::check_and_refresh`] on a detached task.
///
/// The first tick fires after one full interval.
pub fn spawn_refresh_timer(store: RateStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let every = every.max(Duration::from_secs(1));
        let now = tokio::time::Instant::now();
        let Some(start) = now.checked_add(every) else {
            warn!(?every, "Refresh interval out of range, timer disabled");
            return;
        };
        let mut ticker = tokio::time::interval_at(start, every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            debug!("Rate refresh timer tick");
            let _ = store.check_and_refresh();
        }
    })
}
