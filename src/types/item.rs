// A single product as returned by any of the shops, normalized to the same shape.
// Fields are private so a result can't be altered once it passed validation.

use serde::Serialize;

use super::SearchError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSearchResult {
    item_title: String,
    item_image_url: String,
    price_cents: i64,
}

impl ItemSearchResult {
    pub fn new(
        item_title: impl Into<String>,
        item_image_url: impl Into<String>,
        price_cents: i64,
    ) -> Result<Self, SearchError> {
        if price_cents < 0 {
            return Err(SearchError::Validation { price_cents });
        }

        Ok(ItemSearchResult {
            item_title: item_title.into(),
            item_image_url: item_image_url.into(),
            price_cents,
        })
    }

    pub fn item_title(&self) -> &str {
        &self.item_title
    }

    pub fn item_image_url(&self) -> &str {
        &self.item_image_url
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }
}

/// Renders results as a JSON array indented with four spaces.
pub fn to_pretty_json(items: &[ItemSearchResult]) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    items.serialize(&mut serializer)?;

    String::from_utf8(out).map_err(<serde_json::Error as serde::ser::Error>::custom)
}
