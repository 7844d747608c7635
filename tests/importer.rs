//! JSONL import and export against a mock host.

mod common;

use algolia_client::{AlgoliaError, ImportOptions, Importer, SearchClient};
use common::config_for;
use serde_json::{Value, json};
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn importer(server: &MockServer, batch_size: usize) -> Importer {
    let client = SearchClient::with_config(config_for(&[server])).unwrap();
    Importer::new(client.init_index("products"), batch_size).unwrap()
}

fn jsonl(records: &[Value]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for record in records {
        writeln!(file, "{record}").unwrap();
    }
    file
}

#[tokio::test]
async fn test_import_sends_batches_and_waits() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"taskID": 7, "objectIDs": []})),
        )
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/indexes/products/task/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "published", "pendingTask": false})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let file = jsonl(&common::records(5));
    let options = ImportOptions {
        wait: true,
        ..ImportOptions::default()
    };

    let result = assert_ok!(importer(&server, 2).import_file(file.path(), &options).await);
    assert_eq!(result.records, 5);
    assert_eq!(result.task_ids, vec![7, 7, 7]);
    assert!(result.waited);
    assert_eq!(result.to_json()["records"], 5);
}

#[tokio::test]
async fn test_import_without_object_ids_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let file = jsonl(&[json!({"objectID": "1"}), json!({"name": "no id"})]);
    let err = assert_err!(
        importer(&server, 10)
            .import_file(file.path(), &ImportOptions::default())
            .await
    );
    assert!(matches!(err, AlgoliaError::MissingObjectId { .. }));
}

#[tokio::test]
async fn test_import_maps_object_id_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .and(body_partial_json(json!({"requests": [
            {"action": "updateObject", "body": {"objectID": "A-1"}}
        ]})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"taskID": 4, "objectIDs": ["A-1"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let file = jsonl(&[json!({"sku": "A-1", "name": "a"})]);
    let options = ImportOptions {
        object_id_key: Some("sku".to_string()),
        ..ImportOptions::default()
    };

    let result = assert_ok!(importer(&server, 10).import_file(file.path(), &options).await);
    assert_eq!(result.task_ids, vec![4]);
}

#[tokio::test]
async fn test_replace_with_generated_ids_is_rejected() {
    let server = MockServer::start().await;
    let file = jsonl(&common::records(1));
    let options = ImportOptions {
        auto_generate_object_ids: true,
        replace: true,
        ..ImportOptions::default()
    };

    let err = assert_err!(importer(&server, 10).import_file(file.path(), &options).await);
    assert!(matches!(
        err,
        AlgoliaError::InvalidParameter {
            param: "replace",
            ..
        }
    ));
}

#[tokio::test]
async fn test_export_writes_every_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/browse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [{"objectID": "1", "name": "a"}, {"objectID": "2", "name": "b"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = NamedTempFile::new().unwrap();
    let result = assert_ok!(importer(&server, 1).export_file(output.path(), false).await);
    assert_eq!(result.records, 2);

    let written = algolia_client::importer::read_records(output.path())
        .await
        .unwrap();
    assert_eq!(written[1], json!({"objectID": "2", "name": "b"}));
}
