use std::fmt;
use std::str::FromStr;

use reqwest::Client;

use crate::configuration::Settings;
use crate::parser::{CheckersParser, PicknpayParser, ShopParser, WoolworthsParser};
use crate::types::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Checkers,
    Picknpay,
    Woolworths,
}

impl Vendor {
    pub const ALL: [Vendor; 3] = [Vendor::Checkers, Vendor::Picknpay, Vendor::Woolworths];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Checkers => "checkers",
            Vendor::Picknpay => "picknpay",
            Vendor::Woolworths => "woolworths",
        }
    }

    /// Builds the parser for this vendor from its section of the settings.
    pub fn parser(self, client: Client, settings: &Settings) -> Box<dyn ShopParser> {
        match self {
            Vendor::Checkers => Box::new(CheckersParser::new(client, settings.checkers.clone())),
            Vendor::Picknpay => Box::new(PicknpayParser::new(client, settings.picknpay.clone())),
            Vendor::Woolworths => Box::new(WoolworthsParser::new(client, settings.woolworths.clone())),
        }
    }
}

impl FromStr for Vendor {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Vendor::ALL
            .into_iter()
            .find(|vendor| vendor.as_str() == s)
            .ok_or_else(|| SearchError::Argument {
                message: format!("vendor '{s}' is not recognised."),
            })
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
