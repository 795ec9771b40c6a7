use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;

use crate::configuration::HttpSettings;
use crate::types::{ItemSearchResult, SearchError};

#[async_trait]
pub trait ShopParser: Send + Sync {
    fn shop_name(&self) -> &'static str;

    /// Runs a single-page search and returns at most `max_n_items` results in shop order.
    async fn search(
        &self,
        query: &str,
        max_n_items: usize,
    ) -> Result<Vec<ItemSearchResult>, SearchError>;
}

pub fn build_client(cfg: &HttpSettings) -> Result<Client, SearchError> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .map_err(|e| SearchError::Config { message: e.to_string() })
}

pub fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, SearchError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| SearchError::Config {
            message: format!("bad header name {name:?}: {e}"),
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| SearchError::Config {
            message: format!("bad value for header {name}: {e}"),
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Joins a configured base URL and an absolute path
pub fn endpoint(base_url: &str, path: &str) -> Result<url::Url, SearchError> {
    url::Url::parse(base_url)
        .and_then(|base| base.join(path))
        .map_err(|e| SearchError::Config {
            message: format!("bad base url {base_url:?}: {e}"),
        })
}

/// Checks the status and decodes the body as JSON. Anything unreadable is an upstream fault.
pub async fn read_json(res: Response) -> Result<Value, SearchError> {
    let res = res.error_for_status()?;
    let body = res.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| SearchError::upstream(format!("response is not valid JSON: {e}")))
}

/// Turns a major currency amount into cents, dropping anything past the second decimal.
///
/// Works on the shortest decimal form of the float so that `24.99` is 2499 and not 2498.
pub fn major_units_to_cents(shop: &'static str, value: f64) -> Result<i64, SearchError> {
    if !value.is_finite() {
        return Err(SearchError::parse(shop, format!("price {value} is not a number")));
    }

    let text = value.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction: String = fraction.chars().chain("00".chars()).take(2).collect();

    let cents = format!("{whole}{fraction}")
        .parse::<i64>()
        .map_err(|e| SearchError::parse(shop, format!("price {value} out of range: {e}")))?;

    Ok(if value.is_sign_negative() { -cents } else { cents })
}
