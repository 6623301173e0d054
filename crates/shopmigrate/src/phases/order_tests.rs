//! Tests for order reference resolution.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::model::{NewProduct, NewUser, UserRecord};

/// Destination stub: a fixed set of user rows, captured order inserts.
#[derive(Default)]
struct StubDest {
    users: Vec<UserRecord>,
    last_order: Mutex<Option<NewOrder>>,
}

#[async_trait]
impl DestinationStore for StubDest {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn insert_product(&self, _product: &NewProduct) -> Result<String> {
        Ok("unused".to_string())
    }

    async fn insert_user(&self, _user: &NewUser) -> Result<String> {
        Ok("unused".to_string())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<String> {
        *self.last_order.lock().unwrap() = Some(order.clone());
        Ok("order-dest-1".to_string())
    }

    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

fn dest_with_user(id: &str) -> StubDest {
    StubDest {
        users: vec![UserRecord {
            id: id.to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        }],
        last_order: Mutex::new(None),
    }
}

#[tokio::test]
async fn test_resolve_user_absent_reference() {
    let dest = StubDest::default();
    let ids = IdMap::new();
    let doc = json!({"total": 10.0});

    let resolved = resolve_user(&dest, &ids, &doc).await.unwrap();
    assert_eq!(resolved, None);
}

#[tokio::test]
async fn test_resolve_user_unmapped_reference() {
    let dest = StubDest::default();
    let ids = IdMap::new();
    let doc = json!({"userId": "ghost"});

    let resolved = resolve_user(&dest, &ids, &doc).await.unwrap();
    assert_eq!(resolved, None);
}

#[tokio::test]
async fn test_resolve_user_mapped_and_found() {
    let dest = dest_with_user("user-dest-1");
    let mut ids = IdMap::new();
    ids.insert(EntityKind::User, "u-src-1", "user-dest-1".to_string());
    let doc = json!({"userId": "u-src-1"});

    let resolved = resolve_user(&dest, &ids, &doc).await.unwrap();
    assert_eq!(resolved.as_deref(), Some("user-dest-1"));
}

#[tokio::test]
async fn test_resolve_user_stale_mapping() {
    // Mapping exists but the destination row does not.
    let dest = StubDest::default();
    let mut ids = IdMap::new();
    ids.insert(EntityKind::User, "u-src-1", "user-dest-1".to_string());
    let doc = json!({"userId": "u-src-1"});

    let resolved = resolve_user(&dest, &ids, &doc).await.unwrap();
    assert_eq!(resolved, None);
}

#[test]
fn test_resolve_items_mapped_and_passthrough() {
    let mut ids = IdMap::new();
    ids.insert(EntityKind::Product, "p-src-1", "prod-dest-1".to_string());
    let doc = json!({
        "products": [
            {"productId": "p-src-1", "quantity": 2},
            {"productId": "p-unknown", "quantity": 1}
        ]
    });

    let items = resolve_items(&ids, &doc).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product_id, "prod-dest-1");
    assert_eq!(items[0].quantity, 2);
    // Unmapped reference carries the raw source id, item is never dropped.
    assert_eq!(items[1].product_id, "p-unknown");
}

#[test]
fn test_resolve_items_objectid_reference() {
    let mut ids = IdMap::new();
    ids.insert(
        EntityKind::Product,
        "507f1f77bcf86cd799439011",
        "prod-dest-1".to_string(),
    );
    let doc = json!({
        "products": [
            {"productId": {"$oid": "507f1f77bcf86cd799439011"}, "quantity": 3}
        ]
    });

    let items = resolve_items(&ids, &doc).unwrap();
    assert_eq!(items[0].product_id, "prod-dest-1");
}

#[test]
fn test_resolve_items_requires_products_array() {
    let ids = IdMap::new();
    assert!(resolve_items(&ids, &json!({"total": 10.0})).is_err());
    assert!(resolve_items(&ids, &json!({"products": "oops"})).is_err());
}

#[test]
fn test_resolve_items_requires_product_id() {
    let ids = IdMap::new();
    let doc = json!({"products": [{"quantity": 2}]});
    assert!(resolve_items(&ids, &doc).is_err());
}

#[tokio::test]
async fn test_migrate_one_defaults_order_date() {
    let dest = StubDest::default();
    let ids = IdMap::new();
    let before = Utc::now();
    let doc = json!({
        "_id": "o1",
        "products": [],
        "total": 0.0,
        "status": "pending"
    });

    let dest_id = migrate_one(&dest, &ids, &doc).await.unwrap();
    let after = Utc::now();

    assert_eq!(dest_id, "order-dest-1");
    let order = dest.last_order.lock().unwrap().clone().unwrap();
    assert!(order.order_date >= before && order.order_date <= after);
    assert!(order.items.is_empty());
    assert_eq!(order.user_id, None);
}
