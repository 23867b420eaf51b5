use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_currency {
            Some(code) => println!("  base-currency: {code}"),
            None => println!("  base-currency: (unset, EUR)"),
        }
        println!("  rates-url: {}", self.rates_url());
        match self.cache_hours {
            Some(hours) => println!("  cache-hours: {hours}"),
            None => println!("  cache-hours: (unset, {})", self.cache_duration().as_secs() / 3600),
        }
        match self.refresh_minutes {
            Some(minutes) => println!("  refresh-minutes: {minutes}"),
            None => println!(
                "  refresh-minutes: (unset, {})",
                self.refresh_interval().as_secs() / 60
            ),
        }
        println!("  agent-keyword: {}", self.agent_keyword());
    }
}
