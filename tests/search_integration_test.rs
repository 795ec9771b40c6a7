use grocer::configuration::Settings;
use grocer::parser::{build_client, Vendor, MAX_REDIRECTS};
use grocer::types::{ItemSearchResult, SearchError};
use httpmock::prelude::*;
use serde_json::json;

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.http.timeout_secs = 5;
    settings.checkers.base_url = server.base_url();
    settings.picknpay.base_url = server.base_url();
    settings.woolworths.base_url = server.base_url();
    settings
}

async fn search(
    vendor: Vendor,
    server: &MockServer,
    query: &str,
    max_n_items: usize,
) -> Result<Vec<ItemSearchResult>, SearchError> {
    let settings = settings_for(server);
    let client = build_client(&settings.http)?;
    vendor.parser(client, &settings).search(query, max_n_items).await
}

fn checkers_product(title: &str, image: &str, price: &str) -> String {
    format!(
        r#"<div class="item-product">
             <a class="product-listening-click" title="{title}" href="/p">{title}</a>
             <div class="item-product__image __image"><img data-original-src="{image}"/></div>
             <div class="js-item-product-price"><span class="now">{price}</span></div>
           </div>"#
    )
}

fn woolworths_listing(records: serde_json::Value) -> serde_json::Value {
    json!({
        "contents": [{
            "@type": "PageSlot",
            "mainContent": [{"contents": [{"records": records}]}]
        }]
    })
}

fn woolworths_record(name: &str, image: &str, price: f64) -> serde_json::Value {
    json!({
        "attributes": {"p_displayName": name, "p_externalImageReference": image},
        "startingPrice": {"p_pl00": price}
    })
}

#[tokio::test]
async fn test_checkers_search_end_to_end() {
    let server = MockServer::start_async().await;
    let body = format!(
        "<html><body>{}{}{}</body></html>",
        checkers_product("Milk 1L", "/medias/milk.png", "R 19.99"),
        checkers_product("Bread 700g", "/medias/bread.png", "R 17.50"),
        checkers_product("Eggs 6pk", "/medias/eggs.png", "R 32.00"),
    );

    let page_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search/all")
                .query_param("q", "milk")
                .header("referer", "https://www.checkers.co.za/")
                .header_exists("user-agent");
            then.status(200)
                .header("Content-Type", "text/html")
                .body(body);
        })
        .await;

    let items = search(Vendor::Checkers, &server, "milk", 2).await.unwrap();

    page_mock.assert_async().await;
    assert_eq!(
        items,
        vec![
            ItemSearchResult::new("Milk 1L", server.url("/medias/milk.png"), 1999).unwrap(),
            ItemSearchResult::new("Bread 700g", server.url("/medias/bread.png"), 1750).unwrap(),
        ]
    );
}

#[tokio::test]
async fn test_checkers_server_error_is_upstream_error() {
    let server = MockServer::start_async().await;
    let page_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/search/all");
            then.status(503);
        })
        .await;

    let result = search(Vendor::Checkers, &server, "milk", 2).await;

    page_mock.assert_async().await;
    assert!(matches!(result, Err(SearchError::Upstream { .. })));
}

#[tokio::test]
async fn test_picknpay_search_end_to_end() {
    let server = MockServer::start_async().await;
    let search_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/pnphybris/v2/pnp-spa/products/search")
                .query_param("query", "cola 2l")
                .query_param("pageSize", "5")
                .query_param("storeCode", "WC44")
                .query_param("lang", "en")
                .query_param("curr", "ZAR")
                .header("referer", format!("{}/search/cola%202l", server.base_url()));
            then.status(200).json_body(json!({
                "products": [{
                    "name": "Cola 2L",
                    "price": {"value": 24.99},
                    "images": [{"format": "product", "imageType": "PRIMARY", "url": "u1"}]
                }]
            }));
        })
        .await;

    let items = search(Vendor::Picknpay, &server, "cola 2l", 5).await.unwrap();

    search_mock.assert_async().await;
    assert_eq!(items, vec![ItemSearchResult::new("Cola 2L", "u1", 2499).unwrap()]);
}

#[tokio::test]
async fn test_picknpay_without_primary_image_is_parse_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/pnphybris/v2/pnp-spa/products/search");
            then.status(200).json_body(json!({
                "products": [{
                    "name": "Cola 2L",
                    "price": {"value": 24.99},
                    "images": [{"format": "zoom", "imageType": "GALLERY", "url": "u1"}]
                }]
            }));
        })
        .await;

    let result = search(Vendor::Picknpay, &server, "cola", 5).await;
    assert!(matches!(result, Err(SearchError::Parse { .. })));
}

#[tokio::test]
async fn test_picknpay_html_body_is_upstream_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/pnphybris/v2/pnp-spa/products/search");
            then.status(200).body("<html>blocked</html>");
        })
        .await;

    let result = search(Vendor::Picknpay, &server, "cola", 5).await;
    assert!(matches!(result, Err(SearchError::Upstream { .. })));
}

#[tokio::test]
async fn test_woolworths_without_redirect_makes_one_call() {
    let server = MockServer::start_async().await;
    let search_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/server/searchCategory")
                .query_param("Accept", "application/json")
                .query_param("pageURL", "/cat")
                .query_param("Ntt", "milk")
                .query_param("Dy", "1")
                .header("x-requested-by", "Woolworths Online");
            then.status(200).json_body(woolworths_listing(json!([
                woolworths_record("Full Cream Milk 1L", "https://img/milk.jpg", 21.99),
                woolworths_record("Low Fat Milk 1L", "https://img/lowfat.jpg", 20.49),
            ])));
        })
        .await;

    let items = search(Vendor::Woolworths, &server, "milk", 1).await.unwrap();

    search_mock.assert_hits_async(1).await;
    assert_eq!(
        items,
        vec![ItemSearchResult::new("Full Cream Milk 1L", "https://img/milk.jpg", 2199).unwrap()]
    );
}

#[tokio::test]
async fn test_woolworths_single_redirect_makes_two_calls() {
    let server = MockServer::start_async().await;
    let first_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/server/searchCategory")
                .query_param("Ntt", "bread");
            then.status(200).json_body(json!({
                "contents": {
                    "@type": "Redirect",
                    "redirectURL": "https://www.woolworths.co.za/cat/Food/Bakery/_/N-1z13s3l?Ntt=bread"
                }
            }));
        })
        .await;
    let redirect_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/server/searchCategory")
                .query_param("pageURL", "/cat/Food/Bakery/_/N-1z13s3l");
            then.status(200).json_body(woolworths_listing(json!([
                woolworths_record("Sourdough Loaf", "https://img/sourdough.jpg", 45.0),
            ])));
        })
        .await;

    let items = search(Vendor::Woolworths, &server, "bread", 10).await.unwrap();

    first_mock.assert_hits_async(1).await;
    redirect_mock.assert_hits_async(1).await;
    assert_eq!(
        items,
        vec![ItemSearchResult::new("Sourdough Loaf", "https://img/sourdough.jpg", 4500).unwrap()]
    );
}

#[tokio::test]
async fn test_woolworths_endless_redirects_stop_at_bound() {
    let server = MockServer::start_async().await;
    let redirect = json!({
        "contents": [{"@type": "Redirect", "redirectURL": "https://www.woolworths.co.za/cat/loop"}]
    });

    let first_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/server/searchCategory")
                .query_param("Ntt", "anything");
            then.status(200).json_body(redirect.clone());
        })
        .await;
    let loop_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/server/searchCategory")
                .query_param("pageURL", "/cat/loop");
            then.status(200).json_body(redirect.clone());
        })
        .await;

    let result = search(Vendor::Woolworths, &server, "anything", 5).await;

    first_mock.assert_hits_async(1).await;
    loop_mock.assert_hits_async(MAX_REDIRECTS).await;
    assert!(matches!(result, Err(SearchError::Upstream { .. })));
}

#[tokio::test]
async fn test_same_fixture_gives_same_results() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/server/searchCategory");
            then.status(200).json_body(woolworths_listing(json!([
                woolworths_record("Apples 1kg", "https://img/apples.jpg", 29.99),
                woolworths_record("Pears 1kg", "https://img/pears.jpg", 34.99),
            ])));
        })
        .await;

    let first = search(Vendor::Woolworths, &server, "fruit", 5).await.unwrap();
    let second = search(Vendor::Woolworths, &server, "fruit", 5).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn test_results_never_exceed_cap() {
    let server = MockServer::start_async().await;
    let records: Vec<_> = (0..8)
        .map(|i| woolworths_record(&format!("Item {i}"), "https://img/i.jpg", 1.0 + i as f64))
        .collect();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/server/searchCategory");
            then.status(200).json_body(woolworths_listing(json!(records)));
        })
        .await;

    for cap in [0usize, 1, 3, 8, 20] {
        let items = search(Vendor::Woolworths, &server, "items", cap).await.unwrap();
        assert!(items.len() <= cap);
        assert!(items.iter().all(|item| item.price_cents() >= 0));
    }
}

#[tokio::test]
async fn test_woolworths_redirect_path_is_encoded_once() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/server/searchCategory")
                .query_param("Ntt", "cream");
            then.status(200).json_body(json!({
                "contents": {
                    "@type": "Redirect",
                    "redirectURL": "https://www.woolworths.co.za/cat/Fresh%20Food/Crème"
                }
            }));
        })
        .await;
    let redirect_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/server/searchCategory")
                .query_param("pageURL", "/cat/Fresh Food/Crème");
            then.status(200).json_body(woolworths_listing(json!([
                woolworths_record("Fresh Cream 250ml", "https://img/cream.jpg", 27.99),
            ])));
        })
        .await;

    let items = search(Vendor::Woolworths, &server, "cream", 5).await.unwrap();

    redirect_mock.assert_hits_async(1).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].price_cents(), 2799);
}
