#[cfg(test)]
use crate::convert::currency::BaseCurrency;
#[cfg(test)]
use crate::core::clock::Clock;
#[cfg(test)]
use crate::core::rate_source::{FetchError, RateSource};
#[cfg(test)]
use crate::core::rates::{RateSettings, RateStore, RateTable};
#[cfg(test)]
use crate::core::store::MemoryStore;
#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use chrono::{DateTime, TimeZone, Utc};
#[cfg(test)]
use std::collections::BTreeMap;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Clock that only moves when told to.
#[cfg(test)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Rate source that answers with whatever rates it currently holds, or a
/// 503 when it holds none.
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedSource {
    rates: Mutex<Option<BTreeMap<String, f64>>>,
    calls: AtomicUsize,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn serving(rates: &[(&str, f64)]) -> Arc<Self> {
        let source = Self::default();
        source.set_rates(Some(rate_map(rates)));
        Arc::new(source)
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_rates(&self, rates: Option<BTreeMap<String, f64>>) {
        *self.rates.lock().unwrap() = rates;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl RateSource for ScriptedSource {
    async fn fetch(&self, _base: &str) -> Result<BTreeMap<String, f64>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.rates.lock().unwrap().clone() {
            Some(rates) => Ok(rates),
            None => Err(FetchError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "maintenance".to_string(),
            }),
        }
    }
}

#[cfg(test)]
pub fn rate_map(rates: &[(&str, f64)]) -> BTreeMap<String, f64> {
    rates
        .iter()
        .map(|(code, rate)| (code.to_string(), *rate))
        .collect()
}

#[cfg(test)]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
}

/// Everything a rate store test usually needs, wired together.
#[cfg(test)]
pub struct TestRates {
    pub store: RateStore,
    pub kv: Arc<MemoryStore>,
    pub source: Arc<ScriptedSource>,
    pub clock: Arc<FixedClock>,
}

#[cfg(test)]
pub fn create_test_rates(source: Arc<ScriptedSource>) -> TestRates {
    let kv = Arc::new(MemoryStore::new());
    let clock = FixedClock::at(test_now());
    let store = RateStore::new(
        RateSettings::default(),
        kv.clone(),
        source.clone(),
        clock.clone(),
    );
    TestRates {
        store,
        kv,
        source,
        clock,
    }
}

/// Rate store that already holds `rates` (EUR base), with a failing source.
#[cfg(test)]
pub fn create_loaded_store(rates: &[(&str, f64)]) -> RateStore {
    let test = create_test_rates(ScriptedSource::failing());
    let table = RateTable::new(BaseCurrency::EUR, rate_map(rates), test_now()).unwrap();
    test.store.install(table);
    test.store
}

#[cfg(test)]
pub fn create_empty_store() -> RateStore {
    create_test_rates(ScriptedSource::failing()).store
}
