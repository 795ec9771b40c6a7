use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::configuration::WoolworthsSettings;
use crate::parser::parser::{endpoint, header_map, major_units_to_cents, read_json};
use crate::parser::ShopParser;
use crate::types::{ItemSearchResult, SearchError};

const SHOP: &str = "Woolworths";
const SEARCH_PATH: &str = "/server/searchCategory";

/// Redirects followed before giving up on a search.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug)]
pub struct WoolworthsParser {
    client: Client,
    cfg: WoolworthsSettings,
}

impl WoolworthsParser {
    pub fn new(client: Client, cfg: WoolworthsSettings) -> WoolworthsParser {
        WoolworthsParser { client, cfg }
    }
}

/// What one search response asks us to do next.
#[derive(Debug, PartialEq)]
pub enum Content {
    /// Fetch again for this page path
    Redirect(String),
    Listing(Value),
}

#[derive(Deserialize)]
struct Envelope {
    contents: OneOrMany,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Value>),
    One(Value),
}

#[derive(Deserialize)]
struct Record {
    attributes: Attributes,
    #[serde(rename = "startingPrice")]
    starting_price: StartingPrice,
}

#[derive(Deserialize)]
struct Attributes {
    #[serde(rename = "p_displayName")]
    display_name: String,
    #[serde(rename = "p_externalImageReference")]
    image_reference: String,
}

#[derive(Deserialize)]
struct StartingPrice {
    // Regular shelf price; the other tiers are loyalty prices
    #[serde(rename = "p_pl00")]
    regular: f64,
}

/// Reads the `contents` of a search response and decides whether it is a redirect.
pub fn classify(body: Value) -> Result<Content, SearchError> {
    let envelope: Envelope = serde_json::from_value(body)
        .map_err(|e| SearchError::parse(SHOP, e.to_string()))?;

    let content = match envelope.contents {
        OneOrMany::One(content) => content,
        OneOrMany::Many(contents) => contents
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::parse(SHOP, "empty contents list"))?,
    };

    if content.get("@type").and_then(Value::as_str) != Some("Redirect") {
        return Ok(Content::Listing(content));
    }

    let target = content
        .get("redirectURL")
        .and_then(Value::as_str)
        .ok_or_else(|| SearchError::parse(SHOP, "redirect without redirectURL"))?;

    Ok(Content::Redirect(redirect_path(target)?))
}

// Only the path survives, decoded, since the next request encodes it again as a parameter
fn redirect_path(target: &str) -> Result<String, SearchError> {
    let raw = match url::Url::parse(target) {
        Ok(url) => url.path().to_owned(),
        Err(url::ParseError::RelativeUrlWithoutBase) => target
            .split(['?', '#'])
            .next()
            .unwrap_or(target)
            .to_owned(),
        Err(e) => {
            return Err(SearchError::parse(SHOP, format!("bad redirectURL {target:?}: {e}")));
        }
    };

    percent_decode_str(&raw)
        .decode_utf8()
        .map(|path| path.into_owned())
        .map_err(|e| SearchError::parse(SHOP, format!("bad redirectURL {target:?}: {e}")))
}

/// Maps a terminal (non-redirect) content object to results, keeping at most `max_n_items`.
pub fn process_listing(content: Value, max_n_items: usize) -> Result<Vec<ItemSearchResult>, SearchError> {
    let records = content
        .pointer("/mainContent/0/contents/0/records")
        .ok_or_else(|| SearchError::parse(SHOP, "mainContent[0].contents[0].records not found"))?
        .as_array()
        .ok_or_else(|| SearchError::parse(SHOP, "records is not a list"))?;

    // Records past the cap are never looked at
    records
        .iter()
        .take(max_n_items)
        .map(|raw| {
            let record = Record::deserialize(raw)
                .map_err(|e| SearchError::parse(SHOP, e.to_string()))?;
            let price_cents = major_units_to_cents(SHOP, record.starting_price.regular)?;
            ItemSearchResult::new(
                record.attributes.display_name,
                record.attributes.image_reference,
                price_cents,
            )
        })
        .collect()
}

impl WoolworthsParser {
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<Content, SearchError> {
        let url = endpoint(&self.cfg.base_url, SEARCH_PATH)?;
        let res = self
            .client
            .get(url)
            .query(params)
            .headers(header_map(&self.cfg.headers)?)
            .send()
            .await?;

        classify(read_json(res).await?)
    }

    /// Follows redirects until a listing shows up, at most `MAX_REDIRECTS` times.
    async fn resolve(&self, query: &str) -> Result<Value, SearchError> {
        let mut content = self
            .fetch(&[
                ("Accept", "application/json"),
                ("pageURL", self.cfg.landing_page.as_str()),
                ("Ntt", query),
                ("Dy", "1"),
            ])
            .await?;

        let mut hops = 0;
        loop {
            match content {
                Content::Listing(listing) => {
                    info!("Listing found after {} redirects", hops);
                    return Ok(listing);
                }
                Content::Redirect(path) if hops < MAX_REDIRECTS => {
                    hops += 1;
                    debug!("Redirect {} to {}", hops, path);
                    content = self.fetch(&[("pageURL", path.as_str())]).await?;
                }
                Content::Redirect(path) => {
                    warn!("Still redirecting to {} after {} hops", path, hops);
                    return Err(SearchError::upstream(format!(
                        "gave up after {MAX_REDIRECTS} redirects, last target {path}"
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl ShopParser for WoolworthsParser {
    fn shop_name(&self) -> &'static str {
        SHOP
    }

    #[instrument(level = "info", name = "Searching", skip(self), fields(shop = SHOP))]
    async fn search(
        &self,
        query: &str,
        max_n_items: usize,
    ) -> Result<Vec<ItemSearchResult>, SearchError> {
        let listing = self.resolve(query).await?;
        process_listing(listing, max_n_items).inspect_err(|e| error!("{}", e))
    }
}
