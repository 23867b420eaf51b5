//! Glue between a chat front end and the price converter.
//!
//! A [`PriceSession`] owns the rate cache, keeps it warm with a background
//! timer, and post-processes assistant messages for price agents.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::convert::prompt::rates_prompt_block;
use crate::convert::PriceLineConverter;
use crate::core::clock::Clock;
use crate::core::rates::{spawn_refresh_timer, RateSettings, RateStore};
use crate::core::rate_source::RateSource;
use crate::core::store::KeyValueStore;

pub struct PriceSession {
    rates: RateStore,
    converter: PriceLineConverter,
    agent_keyword: String,
    clock: Arc<dyn Clock>,
    refresh_timer: Option<JoinHandle<()>>,
}

impl PriceSession {
    pub fn new(
        settings: RateSettings,
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn RateSource>,
        clock: Arc<dyn Clock>,
        agent_keyword: impl Into<String>,
    ) -> Self {
        Self {
            rates: RateStore::new(settings, store, source, clock.clone()),
            converter: PriceLineConverter::new(),
            agent_keyword: agent_keyword.into().to_lowercase(),
            clock,
            refresh_timer: None,
        }
    }

    /// Load or fetch rates, then keep them fresh every `refresh_every`.
    ///
    /// Startup without rates is not an error; conversions will carry the
    /// unavailable marker until a refresh succeeds.
    pub async fn start(&mut self, refresh_every: Duration) -> bool {
        let loaded = self.rates.initialize().await;
        if !loaded {
            warn!("Starting without currency rates");
        }
        if let Some(timer) = self.refresh_timer.take() {
            timer.abort();
        }
        self.refresh_timer = Some(spawn_refresh_timer(self.rates.clone(), refresh_every));
        loaded
    }

    pub fn rates(&self) -> &RateStore {
        &self.rates
    }

    pub fn is_price_agent(&self, agent: Option<&str>) -> bool {
        agent.is_some_and(|name| name.to_lowercase().contains(&self.agent_keyword))
    }

    /// Post-process an assistant message for `agent`.
    ///
    /// Kicks off a background refresh if the rates are stale; the conversion
    /// itself always uses the rates cached right now.
    pub fn postprocess(&self, agent: Option<&str>, message: &str) -> String {
        let _ = self.rates.check_and_refresh();

        if !self.is_price_agent(agent) {
            debug!(?agent, "Not a price agent, leaving response untouched");
            return message.to_string();
        }

        self.converter.process(message, &self.rates)
    }

    /// System prompt for `agent` with the live rate block appended for price agents.
    pub fn system_prompt(&self, agent: Option<&str>, prompt: &str) -> String {
        if !self.is_price_agent(agent) {
            return prompt.to_string();
        }
        let table = self.rates.snapshot();
        format!(
            "{prompt}{}",
            rates_prompt_block(table.as_deref(), self.clock.now())
        )
    }

    pub fn status_line(&self) -> String {
        self.rates.rates_info()
    }
}

impl Drop for PriceSession {
    fn drop(&mut self) {
        if let Some(timer) = self.refresh_timer.take() {
            timer.abort();
        }
    }
}
