pub mod clock;
pub mod config;
pub mod constants;
pub mod rate_source;
pub mod rates;
pub mod session;
pub mod store;
