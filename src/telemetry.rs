use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::Registry;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::configuration::TelemetrySettings;

pub fn init_telemetry(settings: &TelemetrySettings) {
    // Level filter layer to filter traces based on level (trace, debug, info, warn, error).
    let level_filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.default_filter));
    // Stdout carries the search results, so spans and events go to stderr
    let formatting_layer = BunyanFormattingLayer::new(
        settings.service_name.clone(),
        std::io::stderr,
    );

    let subscriber = Registry::default()
        .with(level_filter_layer)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    // A second initialisation (tests) keeps the first subscriber
    if set_global_default(subscriber).is_err() {
        tracing::debug!("Global subscriber already set");
    }
}
