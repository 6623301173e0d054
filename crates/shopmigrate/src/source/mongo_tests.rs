//! Tests for the MongoDB Data API client.

use super::*;

fn test_config() -> SourceConfig {
    SourceConfig {
        data_api_url: "https://example.com".to_string(),
        api_key: "key".to_string(),
        database: "ecommerce".to_string(),
        data_source: "mongodb-atlas".to_string(),
    }
}

#[test]
fn test_build_url() {
    let mut config = test_config();
    config.data_api_url = "https://data.mongodb-api.com/app/test/endpoint/data/v1/".to_string();
    let store = MongoStore::new(config, 100);
    assert_eq!(
        store.build_url("find"),
        "https://data.mongodb-api.com/app/test/endpoint/data/v1/action/find"
    );
}

#[test]
fn test_batch_size_floor() {
    let store = MongoStore::new(test_config(), 0);
    assert_eq!(store.batch_size, 1);
}

#[test]
fn test_find_request_serialization() {
    let request = FindRequest {
        data_source: "mongodb-atlas".to_string(),
        database: "ecommerce".to_string(),
        collection: "orders".to_string(),
        skip: Some(10),
        limit: Some(50),
    };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["dataSource"], "mongodb-atlas");
    assert_eq!(json["collection"], "orders");
    assert_eq!(json["skip"], 10);
    assert_eq!(json["limit"], 50);
}

#[test]
fn test_http_error_mapping() {
    assert!(matches!(http_error(429, "slow down"), Error::RateLimit(60)));
    assert!(matches!(http_error(401, "bad key"), Error::Authentication(_)));
    assert!(matches!(http_error(403, "no access"), Error::Authentication(_)));
    assert!(matches!(
        http_error(500, "boom"),
        Error::SourceConnection(_)
    ));
}

#[tokio::test]
async fn test_scan_requires_connect() {
    let store = MongoStore::new(test_config(), 100);
    let result = store.scan("products").await;
    assert!(matches!(result, Err(Error::SourceConnection(_))));
}
