use std::path::PathBuf;

use argh::FromArgs;
use color_eyre::Report;
use grocer::configuration::get_configuration;
use grocer::parser::{build_client, Vendor};
use grocer::telemetry::init_telemetry;
use grocer::types::to_pretty_json;
use tracing::info;

#[derive(FromArgs)]
/// Search a grocery shop and print the results as JSON.
struct AppParams {
    /// shop to search: checkers, picknpay or woolworths
    #[argh(positional)]
    vendor_name: String,

    /// text to search for
    #[argh(positional)]
    search_query: String,

    /// maximum number of results to return
    #[argh(positional)]
    max_n_results: usize,

    /// configuration file (defaults to ./configuration.* when present)
    #[argh(option)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    setup()?;

    // Argument parsing
    let up: AppParams = argh::from_env();
    let vendor: Vendor = up.vendor_name.parse()?;

    // Read configuration
    let configuration = get_configuration(up.config.as_deref())?;
    init_telemetry(&configuration.telemetry);

    let client = build_client(&configuration.http)?;
    let parser = vendor.parser(client, &configuration);

    info!("Searching {} for {:?}", vendor, up.search_query);
    let results = parser.search(&up.search_query, up.max_n_results).await?;

    println!("{}", to_pretty_json(&results)?);

    Ok(())
}

fn setup() -> Result<(), Report> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1")
    }
    color_eyre::install()?;

    Ok(())
}
