//! URL helpers for the rate API endpoint.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use pricefx::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.example.com/v4/latest/"), "https://api.example.com/v4/latest");
/// assert_eq!(normalize_base_url("https://api.example.com/v4/latest"), "https://api.example.com/v4/latest");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Build the "latest rates" endpoint for a base currency.
///
/// The currency code is appended as the final path segment, uppercased.
///
/// # Examples
///
/// ```
/// use pricefx::utils::url::rates_endpoint;
///
/// assert_eq!(
///     rates_endpoint("https://api.exchangerate-api.com/v4/latest/", "eur"),
///     "https://api.exchangerate-api.com/v4/latest/EUR"
/// );
/// ```
pub fn rates_endpoint(base_url: &str, base_currency: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        base_currency.trim().trim_matches('/').to_ascii_uppercase()
    )
}
