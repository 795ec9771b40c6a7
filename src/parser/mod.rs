mod checkers;
mod parser;
mod picknpay;
mod vendor;
mod woolworths;

pub use checkers::CheckersParser;
pub use parser::{build_client, ShopParser};
pub use picknpay::PicknpayParser;
pub use vendor::Vendor;
pub use woolworths::{WoolworthsParser, MAX_REDIRECTS};
