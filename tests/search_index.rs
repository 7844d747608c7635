//! Search index operations against a mock host.

mod common;

use algolia_client::models::search::TaskStatus;
use algolia_client::{AlgoliaError, SearchClient, SearchIndex, SearchParams};
use common::{config_for, records, task};
use futures::TryStreamExt;
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn index(server: &MockServer, name: &str) -> SearchIndex {
    SearchClient::with_config(config_for(&[server]))
        .unwrap()
        .init_index(name)
}

/// Answers a batch request with the objectIDs it received.
struct EchoBatch;

impl Respond for EchoBatch {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let ids: Vec<Value> = body["requests"]
            .as_array()
            .unwrap()
            .iter()
            .map(|op| op["body"]["objectID"].clone())
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({"taskID": ids.len(), "objectIDs": ids}))
    }
}

#[tokio::test]
async fn test_search_posts_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/query"))
        .and(body_json(json!({"query": "shoes", "hitsPerPage": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [{"objectID": "1"}, {"objectID": "2"}],
            "nbHits": 10,
            "page": 0,
            "nbPages": 5,
            "hitsPerPage": 2,
            "processingTimeMS": 1,
            "query": "shoes",
            "params": "query=shoes&hitsPerPage=2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = assert_ok!(
        index(&server, "products")
            .search::<Value>("shoes", SearchParams::new().hits_per_page(2))
            .await
    );
    assert_eq!(response.hits.len(), 2);
    assert_eq!(response.nb_hits, 10);
}

#[tokio::test]
async fn test_save_objects_splits_batches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .respond_with(EchoBatch)
        .expect(3)
        .mount(&server)
        .await;

    let response = assert_ok!(index(&server, "products").save_objects(&records(2500)).await);

    assert_eq!(response.task_ids(), vec![1000, 1000, 500]);
    let ids = response.object_ids();
    assert_eq!(ids.len(), 2500);
    assert_eq!(ids[0], "0");
    assert_eq!(ids[2499], "2499");
}

#[tokio::test]
async fn test_missing_object_id_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(EchoBatch)
        .expect(0)
        .mount(&server)
        .await;

    let mut objects = records(1500);
    objects[1200] = json!({"name": "no id"});

    let err = assert_err!(index(&server, "products").save_objects(&objects).await);
    assert!(matches!(err, AlgoliaError::MissingObjectId { position: 1200 }));
}

#[tokio::test]
async fn test_save_objects_with_id_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .and(body_json(json!({"requests": [
            {"action": "updateObject", "body": {"sku": "A-1", "objectID": "A-1"}},
            {"action": "updateObject", "body": {"sku": "B-2", "objectID": "B-2"}}
        ]})))
        .respond_with(EchoBatch)
        .expect(1)
        .mount(&server)
        .await;

    let objects = vec![json!({"sku": "A-1"}), json!({"sku": "B-2"})];
    let index = index(&server, "products");
    let response = assert_ok!(index.save_objects_with_id_key(&objects, "sku").await);
    assert_eq!(response.object_ids(), vec!["A-1", "B-2"]);

    let err = assert_err!(
        index
            .save_objects_with_id_key(&[json!({"name": "no sku"})], "sku")
            .await
    );
    assert!(matches!(err, AlgoliaError::MissingObjectId { position: 0 }));
    assert!(err.to_string().contains("save_objects_with_id_key"));
}

#[tokio::test]
async fn test_empty_save_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(EchoBatch)
        .expect(0)
        .mount(&server)
        .await;

    let response = assert_ok!(index(&server, "products").save_objects::<Value>(&[]).await);
    assert!(response.is_empty());
    assert_ok!(response.wait().await);
}

#[tokio::test]
async fn test_partial_update_actions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .and(body_partial_json(json!({"requests": [{"action": "partialUpdateObjectNoCreate"}]})))
        .respond_with(EchoBatch)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .and(body_partial_json(json!({"requests": [{"action": "partialUpdateObject"}]})))
        .respond_with(EchoBatch)
        .expect(1)
        .mount(&server)
        .await;

    let index = index(&server, "products");
    let object = json!({"objectID": "1", "price": 10});
    assert_ok!(index.partial_update_object(&object, false).await);
    assert_ok!(index.partial_update_object(&object, true).await);
}

#[tokio::test]
async fn test_wait_task_polls_until_published() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/indexes/products/task/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "notPublished", "pendingTask": true})),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/indexes/products/task/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "published", "pendingTask": false})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let index = index(&server, "products");
    assert_ok!(index.wait_task(42).await);

    let status = assert_ok!(index.get_task(42).await).status;
    assert_eq!(status, TaskStatus::Published);
}

#[tokio::test]
async fn test_wait_task_gives_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/indexes/products/task/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "notPublished"})))
        .mount(&server)
        .await;

    let mut config = config_for(&[&server]);
    config.wait.max_retries = Some(3);
    let index = SearchClient::with_config(config)
        .unwrap()
        .init_index("products");

    let err = assert_err!(index.wait_task(7).await);
    assert!(matches!(err, AlgoliaError::TaskTimeout { task_id: 7, attempts: 3 }));
}

#[tokio::test]
async fn test_settings_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/indexes/products/settings"))
        .and(query_param("getVersion", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"searchableAttributes": ["name"]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/1/indexes/products/settings"))
        .and(query_param("forwardToReplicas", "true"))
        .and(body_json(json!({"searchableAttributes": ["name", "brand"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(11)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&[&server]);
    config.default_forward_to_replicas = Some(true);
    let index = SearchClient::with_config(config)
        .unwrap()
        .init_index("products");

    let settings = assert_ok!(index.get_settings().await);
    assert_eq!(settings["searchableAttributes"], json!(["name"]));

    let response = assert_ok!(
        index
            .set_settings(&json!({"searchableAttributes": ["name", "brand"]}))
            .await
    );
    assert_eq!(response.task_id(), 11);
}

#[tokio::test]
async fn test_object_paths_are_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/indexes/my%20index/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"objectID": "a/b"})))
        .expect(1)
        .mount(&server)
        .await;

    let object: Value = assert_ok!(index(&server, "my index").get_object("a/b").await);
    assert_eq!(object["objectID"], "a/b");
}

#[tokio::test]
async fn test_get_objects_keeps_missing_entries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/*/objects"))
        .and(body_json(json!({"requests": [
            {"indexName": "products", "objectID": "1", "attributesToRetrieve": ["name"]},
            {"indexName": "products", "objectID": "2", "attributesToRetrieve": ["name"]}
        ]})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"objectID": "1", "name": "a"}, null]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = assert_ok!(
        index(&server, "products")
            .get_objects::<Value>(&["1", "2"], Some(&["name"][..]))
            .await
    );
    assert!(response.results[0].is_some());
    assert!(response.results[1].is_none());
}

#[tokio::test]
async fn test_delete_by_and_clear() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/deleteByQuery"))
        .and(body_json(json!({"filters": "brand:acme"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/clear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(4)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .and(body_json(json!({"requests": [
            {"action": "deleteObject", "body": {"objectID": "9"}}
        ]})))
        .respond_with(EchoBatch)
        .expect(1)
        .mount(&server)
        .await;

    let index = index(&server, "products");
    let by = assert_ok!(index.delete_by(SearchParams::new().filters("brand:acme")).await);
    assert_eq!(by.task_id(), 3);
    let cleared = assert_ok!(index.clear_objects().await);
    assert_eq!(cleared.task_id(), 4);
    let deleted = assert_ok!(index.delete_object("9").await);
    assert_eq!(deleted.object_ids(), vec!["9"]);
}

#[tokio::test]
async fn test_browse_objects_follows_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/browse"))
        .and(body_partial_json(json!({"cursor": "page-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [{"objectID": "3"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/browse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [{"objectID": "1"}, {"objectID": "2"}],
            "cursor": "page-2"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let hits: Vec<Value> = assert_ok!(
        index(&server, "products")
            .browse_objects(SearchParams::new())
            .try_collect()
            .await
    );
    let ids: Vec<_> = hits.iter().map(|h| h["objectID"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_browse_synonyms_pages_and_strips_highlights() {
    let server = MockServer::start().await;

    let full_page: Vec<Value> = (0..1000)
        .map(|i| json!({"objectID": format!("syn-{i}"), "type": "synonym", "_highlightResult": {}}))
        .collect();

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/synonyms/search"))
        .and(body_partial_json(json!({"page": 0, "hitsPerPage": 1000})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"hits": full_page, "nbHits": 1001})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/synonyms/search"))
        .and(body_partial_json(json!({"page": 1, "hitsPerPage": 1000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [{"objectID": "syn-last", "_highlightResult": {}}],
            "nbHits": 1001
        })))
        .expect(1)
        .mount(&server)
        .await;

    let synonyms: Vec<Value> = assert_ok!(
        index(&server, "products")
            .browse_synonyms()
            .try_collect()
            .await
    );
    assert_eq!(synonyms.len(), 1001);
    assert!(synonyms.iter().all(|s| s.get("_highlightResult").is_none()));
}

#[tokio::test]
async fn test_replace_all_synonyms_and_rules() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/synonyms/batch"))
        .and(query_param("replaceExistingSynonyms", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/rules/batch"))
        .and(query_param("clearExistingRules", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(6)))
        .expect(1)
        .mount(&server)
        .await;

    let index = index(&server, "products");
    let synonyms = [json!({"objectID": "s1", "type": "synonym", "synonyms": ["car", "auto"]})];
    let rules = [json!({"objectID": "r1", "conditions": [], "consequence": {}})];

    let response = assert_ok!(index.replace_all_synonyms(&synonyms).await);
    assert_eq!(response.map(|r| r.task_id()), Some(5));
    let response = assert_ok!(index.replace_all_rules(&rules).await);
    assert_eq!(response.map(|r| r.task_id()), Some(6));
}

#[tokio::test]
async fn test_delete_and_clear_rules_forward_to_replicas() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/1/indexes/products/rules/r1"))
        .and(query_param("forwardToReplicas", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(8)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/synonyms/clear"))
        .and(query_param("forwardToReplicas", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(9)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&[&server]);
    config.default_forward_to_replicas = Some(false);
    let index = SearchClient::with_config(config)
        .unwrap()
        .init_index("products");

    assert_eq!(assert_ok!(index.delete_rule("r1").await).task_id(), 8);
    assert_eq!(assert_ok!(index.clear_synonyms().await).task_id(), 9);
}

#[tokio::test]
async fn test_replace_all_objects_safe() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/operation"))
        .and(body_partial_json(json!({
            "operation": "copy",
            "scope": ["settings", "synonyms", "rules"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/1/indexes/products_tmp_\d+/batch$"))
        .respond_with(EchoBatch)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/1/indexes/products_tmp_\d+/operation$"))
        .and(body_json(json!({"operation": "move", "destination": "products"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(101)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/1/indexes/products(_tmp_\d+)?/task/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "published"})))
        .expect(3)
        .mount(&server)
        .await;

    let response = assert_ok!(
        index(&server, "products")
            .replace_all_objects(&records(3), true)
            .await
    );
    assert_eq!(response.steps().len(), 3);
}

#[tokio::test]
async fn test_multiple_queries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/*/queries"))
        .and(body_json(json!({
            "requests": [
                {"indexName": "products", "query": "a"},
                {"indexName": "brands", "query": "b"}
            ],
            "strategy": "none"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"hits": []}, {"hits": [{"objectID": "x"}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SearchClient::with_config(config_for(&[&server])).unwrap();
    let queries = vec![
        algolia_client::models::search::IndexQuery {
            index_name: "products".to_string(),
            params: SearchParams::new().query("a"),
        },
        algolia_client::models::search::IndexQuery {
            index_name: "brands".to_string(),
            params: SearchParams::new().query("b"),
        },
    ];

    let response = assert_ok!(
        client
            .multiple_queries::<Value>(queries, Default::default())
            .await
    );
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[1].hits.len(), 1);
}
