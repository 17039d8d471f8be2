//! Behavioural tests for the in-memory item store.
//!
//! The in-memory repository stands in for MongoDB in the API tests, so it
//! has to honour the same contract: newest-first listing, full-field
//! overwrite on update, and `None`/`false` for unknown ids.

use assert_matches::assert_matches;
use itemhub_core::items::ItemFields;
use itemhub_core::types::ItemId;
use itemhub_db::repositories::InMemoryItemRepo;
use itemhub_db::store::ItemStore;

fn fields(name: &str, quantity: i64) -> ItemFields {
    ItemFields {
        name: name.to_string(),
        description: format!("{name} description"),
        quantity,
        category: None,
        price: None,
        is_active: true,
    }
}

fn unknown_id() -> ItemId {
    ItemId::parse("000000000000000000000000").unwrap()
}

#[tokio::test]
async fn create_then_find_returns_same_fields() {
    let store = InMemoryItemRepo::new();
    let created = store.create(&fields("Widget", 3)).await.unwrap();

    let found = store.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(found.name, "Widget");
    assert_eq!(found.description, "Widget description");
    assert_eq!(found.quantity, 3);
    assert_eq!(found.created_at, found.updated_at);
    assert_eq!(found, created);
}

#[tokio::test]
async fn generated_ids_are_object_id_hex() {
    let store = InMemoryItemRepo::new();
    let a = store.create(&fields("a", 0)).await.unwrap();
    let b = store.create(&fields("b", 0)).await.unwrap();

    assert_eq!(a.id.as_str().len(), 24);
    assert_ne!(a.id, b.id);
    assert!(ItemId::parse(a.id.as_str()).is_ok());
}

#[tokio::test]
async fn list_returns_every_item_newest_first() {
    let store = InMemoryItemRepo::new();
    for i in 0..5 {
        store.create(&fields(&format!("item-{i}"), i)).await.unwrap();
    }

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 5);

    let names: Vec<_> = listed.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["item-4", "item-3", "item-2", "item-1", "item-0"]);

    assert!(listed
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[tokio::test]
async fn list_of_empty_store_is_empty() {
    let store = InMemoryItemRepo::new();
    assert!(store.list().await.unwrap().is_empty());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn update_overwrites_all_fields_and_keeps_created_at() {
    let store = InMemoryItemRepo::new();
    let created = store.create(&fields("Widget", 3)).await.unwrap();

    let updated = store
        .update(
            &created.id,
            &ItemFields {
                name: "Widget2".into(),
                description: String::new(),
                quantity: 4,
                category: None,
                price: None,
                is_active: true,
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Widget2");
    assert_eq!(updated.description, "");
    assert_eq!(updated.quantity, 4);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let found = store.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(found, updated);
}

#[tokio::test]
async fn unknown_id_is_none_not_error() {
    let store = InMemoryItemRepo::new();
    store.create(&fields("Widget", 1)).await.unwrap();

    assert_matches!(store.find_by_id(&unknown_id()).await, Ok(None));
    assert_matches!(store.update(&unknown_id(), &fields("x", 1)).await, Ok(None));
    assert_matches!(store.delete(&unknown_id()).await, Ok(false));
}

#[tokio::test]
async fn delete_twice_reports_missing_second_time() {
    let store = InMemoryItemRepo::new();
    let created = store.create(&fields("Widget", 1)).await.unwrap();

    assert!(store.delete(&created.id).await.unwrap());
    assert!(!store.delete(&created.id).await.unwrap());
    assert_matches!(store.find_by_id(&created.id).await, Ok(None));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn count_tracks_inserts_and_deletes() {
    let store = InMemoryItemRepo::new();
    let a = store.create(&fields("a", 0)).await.unwrap();
    store.create(&fields("b", 0)).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);

    store.delete(&a.id).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(store.backend(), "memory");
    store.ping().await.unwrap();
}

#[tokio::test]
async fn update_replaces_optional_fields() {
    let store = InMemoryItemRepo::new();
    let created = store
        .create(&ItemFields {
            category: Some("tools".into()),
            price: Some(9.99),
            is_active: false,
            ..fields("Hammer", 1)
        })
        .await
        .unwrap();
    assert_eq!(created.category.as_deref(), Some("tools"));
    assert_eq!(created.price, Some(9.99));
    assert!(!created.is_active);

    let updated = store
        .update(&created.id, &fields("Hammer", 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.category, None);
    assert_eq!(updated.price, None);
    assert!(updated.is_active);
}
