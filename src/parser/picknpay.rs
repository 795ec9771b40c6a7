use async_trait::async_trait;
use reqwest::header::{HeaderValue, REFERER};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::configuration::PicknpaySettings;
use crate::parser::parser::{endpoint, header_map, major_units_to_cents, read_json};
use crate::parser::ShopParser;
use crate::types::{ItemSearchResult, SearchError};

const SHOP: &str = "PicknPay";

#[derive(Debug)]
pub struct PicknpayParser {
    client: Client,
    cfg: PicknpaySettings,
}

impl PicknpayParser {
    pub fn new(client: Client, cfg: PicknpaySettings) -> PicknpayParser {
        PicknpayParser { client, cfg }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    products: Vec<Value>,
}

#[derive(Deserialize)]
struct Product {
    name: String,
    price: Price,
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Deserialize)]
struct Price {
    value: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Image {
    format: String,
    image_type: String,
    url: String,
}

impl Product {
    // The listing thumbnail. Every product seen so far carries one.
    fn primary_image(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|image| image.format == "product" && image.image_type == "PRIMARY")
            .map(|image| image.url.as_str())
    }
}

/// Maps a decoded search response to results, keeping at most `max_n_items`.
pub fn process_response(body: Value, max_n_items: usize) -> Result<Vec<ItemSearchResult>, SearchError> {
    let response: SearchResponse = serde_json::from_value(body)
        .map_err(|e| SearchError::parse(SHOP, e.to_string()))?;

    response
        .products
        .iter()
        .take(max_n_items)
        .map(|raw| {
            let product = Product::deserialize(raw)
                .map_err(|e| SearchError::parse(SHOP, e.to_string()))?;
            let image = product.primary_image().ok_or_else(|| {
                SearchError::parse(SHOP, format!("no primary product image for {}", product.name))
            })?;
            let price_cents = major_units_to_cents(SHOP, product.price.value)?;
            ItemSearchResult::new(product.name.as_str(), image, price_cents)
        })
        .collect()
}

#[async_trait]
impl ShopParser for PicknpayParser {
    fn shop_name(&self) -> &'static str {
        SHOP
    }

    #[instrument(level = "info", name = "Searching", skip(self), fields(shop = SHOP))]
    async fn search(
        &self,
        query: &str,
        max_n_items: usize,
    ) -> Result<Vec<ItemSearchResult>, SearchError> {
        let url = endpoint(&self.cfg.base_url, "/pnphybris/v2/pnp-spa/products/search")?;

        let mut referer = endpoint(&self.cfg.base_url, "/search")?;
        referer
            .path_segments_mut()
            .map_err(|_| SearchError::Config { message: format!("{} cannot be a base", self.cfg.base_url) })?
            .push(query);

        let mut headers = header_map(&self.cfg.headers)?;
        headers.insert(
            REFERER,
            HeaderValue::from_str(referer.as_str())
                .map_err(|e| SearchError::Config { message: e.to_string() })?,
        );

        let page_size = max_n_items.to_string();
        let res = self
            .client
            .post(url)
            .query(&[
                ("query", query),
                ("pageSize", page_size.as_str()),
                ("storeCode", self.cfg.store_code.as_str()),
                ("lang", self.cfg.lang.as_str()),
                ("curr", self.cfg.currency.as_str()),
            ])
            .headers(headers)
            .send()
            .await?;

        let body = read_json(res).await?;
        info!("Response decoded");

        process_response(body, max_n_items).inspect_err(|e| error!("{}", e))
    }
}
