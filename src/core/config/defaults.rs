use std::time::Duration;

use crate::convert::currency::BaseCurrency;
use crate::core::config::data::Config;
use crate::core::config::io::ConfigError;
use crate::core::constants::{
    CACHE_DURATION, DEFAULT_AGENT_KEYWORD, DEFAULT_BASE_CURRENCY, DEFAULT_RATES_URL,
    REFRESH_INTERVAL, RATES_STORAGE_KEY,
};
use crate::core::rates::RateSettings;

/// Keys accepted by `set` / `unset`, in display order.
pub const CONFIG_KEYS: [&str; 5] = [
    "base-currency",
    "rates-url",
    "cache-hours",
    "refresh-minutes",
    "agent-keyword",
];

/// Upper bound for `cache-hours` (one year).
pub const MAX_CACHE_HOURS: u64 = 8_760;
/// Upper bound for `refresh-minutes` (one year).
pub const MAX_REFRESH_MINUTES: u64 = 525_600;

impl Config {
    pub fn base_currency(&self) -> Result<BaseCurrency, ConfigError> {
        let code = self
            .base_currency
            .as_deref()
            .unwrap_or(DEFAULT_BASE_CURRENCY);
        BaseCurrency::from_code(code).ok_or_else(|| ConfigError::Invalid {
            key: "base-currency".to_string(),
            reason: format!(
                "unsupported base currency '{code}' (supported: {})",
                BaseCurrency::supported_codes().join(", ")
            ),
        })
    }

    pub fn rates_url(&self) -> &str {
        self.rates_url.as_deref().unwrap_or(DEFAULT_RATES_URL)
    }

    /// Out-of-range values from a hand-edited file are clamped.
    pub fn cache_duration(&self) -> Duration {
        self.cache_hours
            .map(|hours| {
                Duration::from_secs(hours.clamp(1, MAX_CACHE_HOURS).saturating_mul(60 * 60))
            })
            .unwrap_or(CACHE_DURATION)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_minutes
            .map(|minutes| {
                Duration::from_secs(minutes.clamp(1, MAX_REFRESH_MINUTES).saturating_mul(60))
            })
            .unwrap_or(REFRESH_INTERVAL)
    }

    pub fn agent_keyword(&self) -> &str {
        self.agent_keyword.as_deref().unwrap_or(DEFAULT_AGENT_KEYWORD)
    }

    /// Resolve the rate cache settings, validating the base currency.
    pub fn rate_settings(&self) -> Result<RateSettings, ConfigError> {
        Ok(RateSettings {
            base: self.base_currency()?,
            cache_duration: self.cache_duration(),
            storage_key: RATES_STORAGE_KEY.to_string(),
        })
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigError::Invalid {
                key: key.to_string(),
                reason: "value must not be empty".to_string(),
            });
        }

        match key {
            "base-currency" => {
                let base = BaseCurrency::from_code(value).ok_or_else(|| ConfigError::Invalid {
                    key: key.to_string(),
                    reason: format!(
                        "unsupported base currency '{value}' (supported: {})",
                        BaseCurrency::supported_codes().join(", ")
                    ),
                })?;
                self.base_currency = Some(base.code().to_string());
            }
            "rates-url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        key: key.to_string(),
                        reason: "expected an http(s) URL".to_string(),
                    });
                }
                self.rates_url = Some(value.to_string());
            }
            "cache-hours" => {
                self.cache_hours = Some(parse_bounded(key, value, MAX_CACHE_HOURS)?)
            }
            "refresh-minutes" => {
                self.refresh_minutes = Some(parse_bounded(key, value, MAX_REFRESH_MINUTES)?)
            }
            "agent-keyword" => self.agent_keyword = Some(value.to_lowercase()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "base-currency" => self.base_currency = None,
            "rates-url" => self.rates_url = None,
            "cache-hours" => self.cache_hours = None,
            "refresh-minutes" => self.refresh_minutes = None,
            "agent-keyword" => self.agent_keyword = None,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_bounded(key: &str, value: &str, max: u64) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(parsed) if (1..=max).contains(&parsed) => Ok(parsed),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("expected a whole number between 1 and {max}, got '{value}'"),
        }),
    }
}
