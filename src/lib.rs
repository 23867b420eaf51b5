//! pricefx converts informal price listings in LLM responses into a single
//! base currency.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the exchange-rate cache ([`core::rates::RateStore`]), its
//!   persistence and refresh policy, configuration, and the price-agent
//!   session used by chat front ends.
//! - [`convert`] parses `Label | amount CODE ::` lines, normalizes currency
//!   names and rewrites lines with the converted amount.
//! - [`cli`] is the `pricefx` command-line entrypoint.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod cli;
pub mod convert;
pub mod core;
pub mod utils;
