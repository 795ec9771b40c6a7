use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{price_cents} is negative")]
    Validation { price_cents: i64 },

    #[error("Upstream request failed: {message}")]
    Upstream { message: String },

    #[error("Unable to parse {shop} response: {message}")]
    Parse { shop: &'static str, message: String },

    #[error("{message}")]
    Argument { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SearchError {
    pub fn upstream(message: impl Into<String>) -> Self {
        SearchError::Upstream { message: message.into() }
    }

    pub fn parse(shop: &'static str, message: impl Into<String>) -> Self {
        SearchError::Parse { shop, message: message.into() }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::upstream(e.to_string())
    }
}
