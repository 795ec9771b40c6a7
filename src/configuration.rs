use std::collections::BTreeMap;
use std::path::Path;

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub http: HttpSettings,
    pub telemetry: TelemetrySettings,
    pub checkers: CheckersSettings,
    pub picknpay: PicknpaySettings,
    pub woolworths: WoolworthsSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings { timeout_secs: 30 }
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TelemetrySettings {
    pub service_name: String,
    /// Used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        TelemetrySettings {
            service_name: String::from("grocer"),
            default_filter: String::from("warn"),
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CheckersSettings {
    pub base_url: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for CheckersSettings {
    fn default() -> Self {
        CheckersSettings {
            base_url: String::from("https://www.checkers.co.za"),
            headers: headers(&[
                ("accept-language", "en-US,en;q=0.9"),
                ("priority", "u=0, i"),
                ("referer", "https://www.checkers.co.za/"),
                ("sec-ch-ua", r#""Google Chrome";v="131", "Chromium";v="131", "Not_A Brand";v="24""#),
                ("sec-ch-ua-mobile", "?0"),
                ("sec-ch-ua-platform", r#""Windows""#),
                ("sec-fetch-dest", "document"),
                ("sec-fetch-mode", "navigate"),
                ("sec-fetch-site", "same-origin"),
                ("sec-fetch-user", "?1"),
                ("upgrade-insecure-requests", "1"),
                ("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"),
            ]),
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PicknpaySettings {
    pub base_url: String,
    pub store_code: String,
    pub lang: String,
    pub currency: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for PicknpaySettings {
    fn default() -> Self {
        PicknpaySettings {
            base_url: String::from("https://www.pnp.co.za"),
            store_code: String::from("WC44"),
            lang: String::from("en"),
            currency: String::from("ZAR"),
            headers: headers(&[
                ("content-type", "application/json"),
                ("origin", "https://www.pnp.co.za"),
                ("user-agent", "Please let me in"),
            ]),
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WoolworthsSettings {
    pub base_url: String,
    /// Page the first search request claims to come from
    pub landing_page: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for WoolworthsSettings {
    fn default() -> Self {
        WoolworthsSettings {
            base_url: String::from("https://www.woolworths.co.za"),
            landing_page: String::from("/cat"),
            headers: headers(&[
                ("user-agent", "Please let me in"),
                ("referer", "https://www.woolworths.co.za/cat"),
                ("x-requested-by", "Woolworths Online"),
            ]),
        }
    }
}

fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Built-in defaults, then `path` (or `configuration.*` in the working directory) if it
/// exists, then `GROCER__SECTION__KEY` environment variables.
pub fn get_configuration(path: Option<&Path>) -> Result<Settings, config::ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("configuration").required(false),
    };

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("GROCER")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}
