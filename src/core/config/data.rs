use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// ISO code all prices are converted into (e.g., "EUR")
    pub base_currency: Option<String>,
    /// Rate API root; the base code is appended as the last path segment
    pub rates_url: Option<String>,
    /// Hours a fetched rate table is considered fresh
    pub cache_hours: Option<u64>,
    /// Minutes between background staleness checks
    pub refresh_minutes: Option<u64>,
    /// Agents whose name contains this keyword get price conversion
    pub agent_keyword: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
