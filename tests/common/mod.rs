//! Shared helpers for integration tests.

#![allow(dead_code)]

use algolia_client::{ClientConfig, HostConfig, WaitConfig};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::MockServer;

/// Configuration pointing at the given mock servers, in order.
pub fn config_for(servers: &[&MockServer]) -> ClientConfig {
    let hosts = servers
        .iter()
        .map(|s| HostConfig::from_base_url(&s.uri()).unwrap())
        .collect();

    let mut config = ClientConfig::new("test-app", "test-key").with_hosts(hosts);
    config.timeouts.read = Duration::from_millis(500);
    config.timeouts.write = Duration::from_millis(500);
    config.wait = WaitConfig {
        time_before_retry: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        max_retries: Some(50),
    };
    config
}

/// Answer of a write returning one task.
pub fn task(id: i64) -> Value {
    json!({"taskID": id, "updatedAt": "2024-01-01T00:00:00.000Z"})
}

/// Records with sequential objectIDs.
pub fn records(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({"objectID": i.to_string(), "name": format!("record {i}")}))
        .collect()
}
