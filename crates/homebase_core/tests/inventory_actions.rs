use homebase_core::{
    ActionDispatcher, CollectionStoreExt, DispatchError, Domain, FixedClock, Intent, ItemStatus,
    MemoryCollectionStore, RecordingGateway, Room,
};

type Dispatcher = ActionDispatcher<MemoryCollectionStore, RecordingGateway, FixedClock>;

fn dispatcher() -> Dispatcher {
    ActionDispatcher::with_clock(
        MemoryCollectionStore::new(),
        RecordingGateway::answering("It might be in the garage."),
        FixedClock(chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
    )
}

fn run(dispatcher: &Dispatcher, intent: Intent) -> String {
    dispatcher.dispatch(&intent, "test question").unwrap().message()
}

#[test]
fn adding_same_item_twice_accumulates_quantity() {
    let dispatcher = dispatcher();
    run(&dispatcher, Intent::new("add_inventory").item("batteries").quantity(1));
    let message = run(&dispatcher, Intent::new("add_inventory").item("batteries").quantity(2));

    assert_eq!(message, "Updated batteries in inventory. Quantity = 3.");
    let inventory = dispatcher.store().read_inventory().unwrap();
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory.get("batteries").unwrap().quantity, 3);
}

#[test]
fn add_defaults_quantity_to_one_and_keeps_original_casing() {
    let dispatcher = dispatcher();
    let message = run(
        &dispatcher,
        Intent::new("add_inventory").item("Tape Measure").location("toolbox"),
    );

    assert_eq!(message, "Added Tape Measure to inventory.");
    let inventory = dispatcher.store().read_inventory().unwrap();
    let entry = inventory.get("Tape Measure").unwrap();
    assert_eq!(entry.quantity, 1);
    assert_eq!(entry.location.as_deref(), Some("toolbox"));
}

#[test]
fn list_input_resolves_each_item_independently() {
    let dispatcher = dispatcher();
    run(&dispatcher, Intent::new("add_inventory").item("milk"));

    let message = run(&dispatcher, Intent::new("add_inventory").items(["milk", "eggs"]));

    assert_eq!(
        message,
        "Updated milk in inventory. Quantity = 2. | Added eggs to inventory."
    );
    let inventory = dispatcher.store().read_inventory().unwrap();
    assert_eq!(inventory.keys().collect::<Vec<_>>(), vec!["milk", "eggs"]);
}

#[test]
fn room_synonym_is_normalized() {
    let dispatcher = dispatcher();
    run(
        &dispatcher,
        Intent::new("add_inventory").item("remote").room("Living Room"),
    );

    let inventory = dispatcher.store().read_inventory().unwrap();
    assert_eq!(inventory.get("remote").unwrap().room, Some(Room::Hall));
}

#[test]
fn unknown_room_is_discarded_but_add_succeeds() {
    let dispatcher = dispatcher();
    let message = run(
        &dispatcher,
        Intent::new("add_inventory").item("bike").room("garage").location("wall hook"),
    );

    assert_eq!(message, "Added bike to inventory.");
    let inventory = dispatcher.store().read_inventory().unwrap();
    let entry = inventory.get("bike").unwrap();
    assert_eq!(entry.room, None);
    assert_eq!(entry.location.as_deref(), Some("wall hook"));

    let raw = dispatcher.store().raw(Domain::Inventory).unwrap();
    assert!(!raw.contains("\"room\""));
}

#[test]
fn update_miss_upserts_new_entry() {
    let dispatcher = dispatcher();
    let outcome = dispatcher
        .dispatch(
            &Intent::new("update_inventory").item("ladder").location("shed").quantity(2),
            "move the ladder to the shed",
        )
        .unwrap();

    assert_eq!(outcome.message(), "Added ladder to inventory.");
    assert_eq!(outcome.items[0].status, ItemStatus::Applied);
    let inventory = dispatcher.store().read_inventory().unwrap();
    assert_eq!(inventory.get("ladder").unwrap().quantity, 2);
}

#[test]
fn update_hit_reports_matched_key_and_keeps_other_fields() {
    let dispatcher = dispatcher();
    run(
        &dispatcher,
        Intent::new("add_inventory")
            .item("sleeping bag")
            .location("wardrobe")
            .room("small bedroom")
            .quantity(2),
    );

    let message = run(
        &dispatcher,
        Intent::new("update_inventory").item("sleeping bags").location("loft"),
    );

    assert_eq!(
        message,
        "Updated sleeping bag in inventory. Location = loft, Quantity = 2 Room: 2nd bedroom."
    );
    let inventory = dispatcher.store().read_inventory().unwrap();
    assert_eq!(inventory.len(), 1);
    let entry = inventory.get("sleeping bag").unwrap();
    assert_eq!(entry.room, Some(Room::SecondBedroom));
    assert_eq!(entry.quantity, 2);
}

#[test]
fn fuzzy_cutoff_is_inclusive() {
    let dispatcher = dispatcher();
    run(&dispatcher, Intent::new("add_inventory").item("apple").quantity(3));
    run(&dispatcher, Intent::new("add_inventory").item("milk").quantity(3));

    // "apply" vs "apple" scores exactly 0.8.
    let at_cutoff = run(&dispatcher, Intent::new("remove_inventory").item("apply").quantity(1));
    assert_eq!(at_cutoff, "Removed 1 of apple. Remaining = 2");

    // "mink" vs "milk" scores 0.75.
    let below_cutoff = run(&dispatcher, Intent::new("remove_inventory").item("mink").quantity(1));
    assert_eq!(below_cutoff, "mink not found in inventory.");
    let inventory = dispatcher.store().read_inventory().unwrap();
    assert_eq!(inventory.get("milk").unwrap().quantity, 3);
}

#[test]
fn removing_more_than_stored_deletes_entry() {
    let dispatcher = dispatcher();
    run(&dispatcher, Intent::new("add_inventory").item("candles").quantity(5));

    let partial = run(&dispatcher, Intent::new("remove_inventory").item("candles").quantity(2));
    assert_eq!(partial, "Removed 2 of candles. Remaining = 3");

    let exact = run(&dispatcher, Intent::new("remove_inventory").item("candles").quantity(3));
    assert_eq!(exact, "Removed candles completely from inventory.");
    assert!(dispatcher.store().read_inventory().unwrap().is_empty());

    run(&dispatcher, Intent::new("add_inventory").item("candles").quantity(2));
    let over = run(&dispatcher, Intent::new("remove_inventory").item("candles").quantity(9));
    assert_eq!(over, "Removed candles completely from inventory.");
    assert!(!dispatcher
        .store()
        .read_inventory()
        .unwrap()
        .contains_key("candles"));
}

#[test]
fn remove_without_quantity_deletes_entry() {
    let dispatcher = dispatcher();
    run(&dispatcher, Intent::new("add_inventory").item("vase").quantity(4));
    let message = run(&dispatcher, Intent::new("remove_inventory").item("vase"));
    assert_eq!(message, "Removed vase completely from inventory.");
}

#[test]
fn remove_batch_continues_past_misses() {
    let dispatcher = dispatcher();
    run(&dispatcher, Intent::new("add_inventory").items(["glue", "string"]));

    let outcome = dispatcher
        .dispatch(
            &Intent::new("remove_inventory").items(["glue", "umbrella", "string"]),
            "remove glue, umbrella and string",
        )
        .unwrap();

    assert_eq!(
        outcome.message(),
        "Removed glue completely from inventory. | umbrella not found in inventory. | Removed string completely from inventory."
    );
    assert_eq!(outcome.count(ItemStatus::NotFound), 1);
    assert!(dispatcher.store().read_inventory().unwrap().is_empty());
}

#[test]
fn sentinel_removes_most_recent_insert_not_alphabetical_last() {
    let dispatcher = dispatcher();
    run(&dispatcher, Intent::new("add_inventory").items(["zebra toy", "anchor", "mug"]));
    // Bumping an existing key does not make it the most recent insert.
    run(&dispatcher, Intent::new("add_inventory").item("zebra toy"));

    let message = run(&dispatcher, Intent::new("remove_inventory").item("Last Entry"));

    assert_eq!(message, "Removed mug (last entry) completely from inventory.");
    let inventory = dispatcher.store().read_inventory().unwrap();
    assert_eq!(inventory.keys().collect::<Vec<_>>(), vec!["zebra toy", "anchor"]);
}

#[test]
fn remove_last_inventory_on_empty_reports_without_writing() {
    let dispatcher = dispatcher();
    let outcome = dispatcher
        .dispatch(&Intent::new("remove_last_inventory"), "undo")
        .unwrap();

    assert_eq!(outcome.message(), "Inventory is empty.");
    assert_eq!(outcome.items[0].status, ItemStatus::Empty);
    assert_eq!(dispatcher.store().write_count(Domain::Inventory), 0);
}

#[test]
fn remove_last_inventory_removes_exactly_latest_key() {
    let dispatcher = dispatcher();
    run(&dispatcher, Intent::new("add_inventory").items(["b-item", "a-item", "c-item"]));

    let message = run(&dispatcher, Intent::new("remove_last_inventory"));

    assert_eq!(message, "Removed last inventory item: c-item");
    let inventory = dispatcher.store().read_inventory().unwrap();
    assert_eq!(inventory.keys().collect::<Vec<_>>(), vec!["b-item", "a-item"]);
}

#[test]
fn query_hit_answers_locally() {
    let dispatcher = dispatcher();
    run(
        &dispatcher,
        Intent::new("add_inventory").item("first aid kit").location("hall cupboard"),
    );

    let message = run(&dispatcher, Intent::new("query_inventory").item("first-aid kit"));

    assert_eq!(message, "first aid kit is in hall cupboard (Qty: 1)");
    assert!(dispatcher.gateway().requests().is_empty());
}

#[test]
fn item_scoped_actions_require_item() {
    let dispatcher = dispatcher();
    for action in ["add_inventory", "update_inventory", "remove_inventory", "query_inventory"] {
        let err = dispatcher
            .dispatch(&Intent::new(action).items(Vec::<String>::new()), "?")
            .unwrap_err();
        assert!(matches!(err, DispatchError::MissingField("item")), "{action}");
    }

    let err = dispatcher
        .dispatch(&Intent::new("add_inventory").item("   "), "?")
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing 'item' field in command.");
    assert_eq!(dispatcher.store().write_count(Domain::Inventory), 0);
}
