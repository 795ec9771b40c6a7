mod error;
mod item;

pub use error::SearchError;
pub use item::{to_pretty_json, ItemSearchResult};
