use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{error, info, instrument};

use crate::configuration::CheckersSettings;
use crate::parser::parser::{endpoint, header_map};
use crate::parser::ShopParser;
use crate::types::{ItemSearchResult, SearchError};

const SHOP: &str = "Checkers";

#[derive(Debug)]
pub struct CheckersParser {
    client: Client,
    cfg: CheckersSettings,
}

impl CheckersParser {
    pub fn new(client: Client, cfg: CheckersSettings) -> CheckersParser {
        CheckersParser { client, cfg }
    }
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::parse(SHOP, format!("bad selector {css}: {e:?}")))
}

// "R 1,299.99" -> 129999. The shop always renders two decimals.
fn parse_price(input: &str) -> Result<i64, SearchError> {
    let digits: String = input
        .chars()
        .filter(|c| !(*c == 'R' || *c == '.' || *c == ',' || c.is_whitespace()))
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(SearchError::parse(SHOP, format!("unexpected price text {input:?}")));
    }

    digits
        .parse::<i64>()
        .map_err(|e| SearchError::parse(SHOP, format!("price {input:?} out of range: {e}")))
}

struct Selectors {
    item: Selector,
    title: Selector,
    image: Selector,
    price: Selector,
}

impl Selectors {
    fn new() -> Result<Selectors, SearchError> {
        Ok(Selectors {
            item: selector(".item-product")?,
            title: selector(".product-listening-click")?,
            image: selector(".item-product__image.__image img")?,
            price: selector(".js-item-product-price .now")?,
        })
    }
}

fn process_entry(
    entry: ElementRef,
    selectors: &Selectors,
    origin: &str,
) -> Result<ItemSearchResult, SearchError> {
    // Get name
    let name = entry
        .select(&selectors.title)
        .next()
        .and_then(|element| element.value().attr("title"))
        .map(|title| title.trim().to_owned())
        .ok_or_else(|| SearchError::parse(SHOP, "product title not found"))?;

    // Get image
    let image = entry
        .select(&selectors.image)
        .next()
        .and_then(|element| element.value().attr("data-original-src"))
        .ok_or_else(|| SearchError::parse(SHOP, format!("image not found for {name}")))?;

    // Get current price
    let price_text = entry
        .select(&selectors.price)
        .next()
        .map(|price| price.text().collect::<String>())
        .ok_or_else(|| SearchError::parse(SHOP, format!("price not found for {name}")))?;

    ItemSearchResult::new(name, format!("{origin}{image}"), parse_price(&price_text)?)
}

/// Extracts the first `max_n_items` products of a search result page.
pub fn process_page(
    body: &str,
    origin: &str,
    max_n_items: usize,
) -> Result<Vec<ItemSearchResult>, SearchError> {
    let fragment = Html::parse_document(body);
    let selectors = Selectors::new()?;

    fragment
        .select(&selectors.item)
        .take(max_n_items)
        .map(|entry| process_entry(entry, &selectors, origin))
        .collect()
}

#[async_trait]
impl ShopParser for CheckersParser {
    fn shop_name(&self) -> &'static str {
        SHOP
    }

    #[instrument(level = "info", name = "Searching", skip(self), fields(shop = SHOP))]
    async fn search(
        &self,
        query: &str,
        max_n_items: usize,
    ) -> Result<Vec<ItemSearchResult>, SearchError> {
        let url = endpoint(&self.cfg.base_url, "/search/all")?;

        let res = self
            .client
            .get(url)
            .query(&[("q", query)])
            .headers(header_map(&self.cfg.headers)?)
            .send()
            .await?
            .error_for_status()?;
        let body = res.text().await?;
        info!("Received {} bytes", body.len());

        let origin = self.cfg.base_url.trim_end_matches('/');
        process_page(&body, origin, max_n_items).inspect_err(|e| error!("{}", e))
    }
}
