//! Personalization client against a mock host.

mod common;

use algolia_client::models::personalization::{EventScoring, FacetScoring, PersonalizationStrategy};
use algolia_client::{AlgoliaError, ClientConfig, PersonalizationClient, Region};
use common::config_for;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> PersonalizationClient {
    PersonalizationClient::with_config(config_for(&[server])).unwrap()
}

fn strategy() -> PersonalizationStrategy {
    PersonalizationStrategy {
        event_scoring: vec![EventScoring {
            score: 42,
            event_name: "Product Clicked".to_string(),
            event_type: "click".to_string(),
        }],
        facet_scoring: vec![FacetScoring {
            score: 20,
            facet_name: "brand".to_string(),
        }],
        personalization_impact: 80,
    }
}

#[test]
fn test_region_is_required() {
    let err = PersonalizationClient::with_config(ClientConfig::new("app", "key")).unwrap_err();
    assert!(matches!(err, AlgoliaError::InvalidConfig(_)));

    assert!(PersonalizationClient::new("app", "key", Region::De).is_err());
    assert!(PersonalizationClient::new("app", "key", Region::Eu).is_ok());
}

#[tokio::test]
async fn test_set_and_get_strategy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/strategies/personalization"))
        .and(body_json(json!({
            "eventScoring": [{"score": 42, "eventName": "Product Clicked", "eventType": "click"}],
            "facetScoring": [{"score": 20, "facetName": "brand"}],
            "personalizationImpact": 80
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Strategy was successfully updated"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/strategies/personalization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "eventScoring": [{"score": 42, "eventName": "Product Clicked", "eventType": "click"}],
            "facetScoring": [{"score": 20, "facetName": "brand"}],
            "personalizationImpact": 80
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let response = assert_ok!(client.set_personalization_strategy(&strategy()).await);
    assert_eq!(response.message, "Strategy was successfully updated");

    let fetched = assert_ok!(client.get_personalization_strategy().await);
    assert_eq!(fetched, strategy());
}

#[tokio::test]
async fn test_user_profiles() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/profiles/personalization/user%201"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userToken": "user 1",
            "lastEventAt": "2024-03-01T10:00:00Z",
            "scores": {"brand": {"acme": 12}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/1/profiles/user%201"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userToken": "user 1",
            "deletedUntil": "2024-03-02T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let profile = assert_ok!(client.get_user_token_profile("user 1").await);
    assert_eq!(profile.scores["brand"]["acme"], 12);

    let deleted = assert_ok!(client.delete_user_profile("user 1").await);
    assert_eq!(deleted.deleted_until, "2024-03-02T10:00:00Z");

    let err = assert_err!(client.delete_user_profile(" ").await);
    assert!(matches!(
        err,
        AlgoliaError::MissingParameter {
            param: "user_token",
            ..
        }
    ));
}
