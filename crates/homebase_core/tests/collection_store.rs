use homebase_core::{
    open_db, open_db_in_memory, ActionDispatcher, CollectionStore, CollectionStoreExt,
    DispatchError, Document, Domain, Intent, InventoryCollection, InventoryEntry,
    JsonFileCollectionStore, MemoryCollectionStore, Room, ShoppingCollection, ShoppingEntry,
    SqliteCollectionStore, StaticGateway, StoreError, TodoCollection,
};

fn sample_inventory() -> InventoryCollection {
    let mut inventory = InventoryCollection::new();
    // Deliberately not alphabetical.
    inventory.insert("zip ties", InventoryEntry::new(Some("drawer".into()), 40, None));
    inventory.insert(
        "Air Pump",
        InventoryEntry::new(None, 1, Some(Room::Balcony)),
    );
    inventory.insert("matches", InventoryEntry::new(Some("shelf".into()), 2, Some(Room::Kitchen)));
    inventory
}

fn exercise_store<S: CollectionStore>(store: &S) {
    for domain in Domain::ALL {
        assert_eq!(store.read(domain).unwrap(), Document::empty(domain));
    }

    store.write_inventory(sample_inventory()).unwrap();
    let inventory = store.read_inventory().unwrap();
    assert_eq!(
        inventory.keys().collect::<Vec<_>>(),
        vec!["zip ties", "Air Pump", "matches"]
    );
    assert_eq!(inventory.last_inserted_key(), Some("matches"));
    assert_eq!(inventory, sample_inventory());

    let mut shopping = ShoppingCollection::new();
    shopping.push(ShoppingEntry::new("oat milk", 2));
    shopping.push(ShoppingEntry::new("bananas", 6));
    store.write_shopping(shopping.clone()).unwrap();
    assert_eq!(store.read_shopping().unwrap(), shopping);

    let mut todo = TodoCollection::new();
    todo.push("02-01-2025".parse().unwrap(), "renew insurance");
    todo.push("31-12-2024".parse().unwrap(), "buy fireworks");
    store.write_todo(todo.clone()).unwrap();
    let read_back = store.read_todo().unwrap();
    assert_eq!(read_back, todo);
    let dates: Vec<String> = read_back.buckets().map(|(date, _)| date.to_string()).collect();
    assert_eq!(dates, vec!["31-12-2024", "02-01-2025"]);
}

#[test]
fn sqlite_store_round_trips_every_domain() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollectionStore::try_new(&conn).unwrap();
    exercise_store(&store);
}

#[test]
fn sqlite_store_counts_revisions() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollectionStore::try_new(&conn).unwrap();
    assert_eq!(store.revision(Domain::Shopping).unwrap(), 0);

    store.write_shopping(ShoppingCollection::new()).unwrap();
    store.write_shopping(ShoppingCollection::new()).unwrap();
    assert_eq!(store.revision(Domain::Shopping).unwrap(), 2);
    assert_eq!(store.revision(Domain::Todo).unwrap(), 0);
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("homebase.sqlite3");
    {
        let conn = open_db(&path).unwrap();
        let store = SqliteCollectionStore::try_new(&conn).unwrap();
        store.write_inventory(sample_inventory()).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteCollectionStore::try_new(&conn).unwrap();
    assert_eq!(store.read_inventory().unwrap(), sample_inventory());
}

#[test]
fn json_store_round_trips_every_domain() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileCollectionStore::new(dir.path());
    exercise_store(&store);

    let raw = std::fs::read_to_string(store.path_for(Domain::Inventory)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value["order"],
        serde_json::json!(["zip ties", "Air Pump", "matches"])
    );
    assert_eq!(value["entries"]["Air Pump"]["room"], "balcony");
    assert!(value["entries"]["Air Pump"].get("location").is_none());
}

#[test]
fn json_store_refuses_keyed_map_inventory_and_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileCollectionStore::new(dir.path());
    let path = store.path_for(Domain::Inventory);
    let legacy = r#"{"milk": {"location": "fridge", "quantity": 2}}"#;
    std::fs::write(&path, legacy).unwrap();

    assert!(matches!(
        store.read(Domain::Inventory),
        Err(StoreError::Corrupt {
            domain: Domain::Inventory,
            ..
        })
    ));

    let dispatcher = ActionDispatcher::new(&store, StaticGateway::new("unused"));
    let err = dispatcher
        .dispatch(&Intent::new("add_inventory").item("eggs"), "add eggs")
        .expect_err("corrupt inventory must not be overwritten");
    assert!(matches!(err, DispatchError::Storage(StoreError::Corrupt { .. })));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), legacy);
}

#[test]
fn memory_store_round_trips_every_domain() {
    exercise_store(&MemoryCollectionStore::new());
}

#[test]
fn overlapping_read_modify_write_cycles_lose_an_update() {
    // No concurrency token: the second writer overwrites the first.
    let store = MemoryCollectionStore::new();

    let mut first = store.read_shopping().unwrap();
    let mut second = store.read_shopping().unwrap();
    first.push(ShoppingEntry::new("coffee", 1));
    second.push(ShoppingEntry::new("sugar", 1));
    store.write_shopping(first).unwrap();
    store.write_shopping(second).unwrap();

    let names: Vec<String> = store
        .read_shopping()
        .unwrap()
        .item_names()
        .map(str::to_string)
        .collect();
    assert_eq!(names, vec!["sugar"]);
    assert_eq!(store.write_count(Domain::Shopping), 2);
}
