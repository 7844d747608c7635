//! Insights client against a mock host.

mod common;

use algolia_client::models::insights::{EventType, InsightEvent};
use algolia_client::{AlgoliaError, InsightsClient};
use common::config_for;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> InsightsClient {
    InsightsClient::with_config(config_for(&[server])).unwrap()
}

fn accepted() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"message": "OK", "status": 200}))
}

fn events(n: usize) -> Vec<InsightEvent> {
    (0..n)
        .map(|i| {
            let mut event = InsightEvent::new(EventType::View, "Product Viewed", "products", "user-1");
            event.object_ids = Some(vec![i.to_string()]);
            event
        })
        .collect()
}

#[tokio::test]
async fn test_push_events_is_chunked() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/events"))
        .respond_with(accepted())
        .expect(3)
        .mount(&server)
        .await;

    let responses = assert_ok!(client(&server).push_events(events(2500)).await);
    assert_eq!(responses.len(), 3);
    assert!(responses.iter().all(|r| r.status == 200));
}

#[tokio::test]
async fn test_invalid_event_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(accepted())
        .expect(0)
        .mount(&server)
        .await;

    let mut batch = events(10);
    batch[7].user_token = String::new();

    let err = assert_err!(client(&server).push_events(batch).await);
    assert!(matches!(
        err,
        AlgoliaError::MissingParameter {
            param: "user_token",
            ..
        }
    ));
}

#[tokio::test]
async fn test_clicked_after_search_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/events"))
        .and(body_json(json!({
            "events": [{
                "eventType": "click",
                "eventName": "Product Clicked",
                "index": "products",
                "userToken": "user-1",
                "queryID": "43b15df305339e827f0ac0bdc5ebcaa7",
                "objectIDs": ["9780545139700", "9780439784542"],
                "positions": [7, 6]
            }]
        })))
        .respond_with(accepted())
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server).user("user-1");
    assert_ok!(
        user.clicked_object_ids_after_search(
            "Product Clicked",
            "products",
            &["9780545139700", "9780439784542"],
            &[7, 6],
            "43b15df305339e827f0ac0bdc5ebcaa7",
        )
        .await
    );
}

#[tokio::test]
async fn test_positions_must_match_object_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(accepted())
        .expect(0)
        .mount(&server)
        .await;

    let user = client(&server).user("user-1");
    let err = assert_err!(
        user.clicked_object_ids_after_search("Product Clicked", "products", &["1", "2"], &[1], "q")
            .await
    );
    assert!(matches!(
        err,
        AlgoliaError::InvalidParameter {
            param: "positions",
            ..
        }
    ));
}

#[tokio::test]
async fn test_converted_filters_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/events"))
        .and(body_json(json!({
            "events": [{
                "eventType": "conversion",
                "eventName": "Filter Converted",
                "index": "products",
                "userToken": "user-2",
                "filters": ["brand:acme"]
            }]
        })))
        .respond_with(accepted())
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server).user("user-2");
    let response = assert_ok!(
        user.converted_filters("Filter Converted", "products", &["brand:acme"])
            .await
    );
    assert_eq!(response.message, "OK");
}
