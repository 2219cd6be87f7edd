use plainorm_core::{
    BasicEntityManager, ConnectionProvider, DbConfig, DeleteOutcome, EntityManager,
    FileConnectionProvider, MappingError, OrmError, SharedConnection,
};
use std::collections::HashSet;

plainorm_core::entity! {
    #[table = "widgets"]
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Widget {
        #[id]
        pub id: Option<i64>,
        pub name: String,
        pub price: i64,
    }
}

plainorm_core::entity! {
    #[table = "gadgets"]
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Gadget {
        #[id]
        #[column = "gadget_id"]
        pub id: Option<i64>,
        #[column = "label"]
        pub name: String,
        pub weight: Option<f64>,
        pub active: bool,
        #[transient]
        pub cached_summary: Option<String>,
    }
}

plainorm_core::entity! {
    /// Catalogue part keyed by a non-rowid primary key column.
    #[table = "parts"]
    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
    pub struct Part {
        /// Generated key.
        #[id]
        pub id: Option<i64>,
        /// Display name.
        #[serde(rename = "part_name")]
        pub name: String,
        /// Cached lookup, never stored.
        #[serde(skip)]
        #[transient]
        pub note: Option<String>,
    }
}

plainorm_core::entity! {
    #[table = "ticks"]
    #[derive(Debug, Default)]
    pub struct Tick {
        #[id]
        pub id: Option<i64>,
    }
}

plainorm_core::entity! {
    #[table = "orphans"]
    #[derive(Debug, Default)]
    pub struct Orphan {
        #[id]
        pub id: Option<i64>,
    }
}

const SCHEMA: &str = "
    CREATE TABLE widgets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        price INTEGER NOT NULL
    );
    CREATE TABLE gadgets (
        gadget_id INTEGER PRIMARY KEY AUTOINCREMENT,
        label TEXT NOT NULL,
        weight REAL,
        active INTEGER NOT NULL
    );
";

fn in_memory_manager() -> BasicEntityManager<SharedConnection> {
    let provider = SharedConnection::open_in_memory().unwrap();
    provider.acquire().unwrap().execute_batch(SCHEMA).unwrap();
    BasicEntityManager::builder(provider)
        .register::<Widget>()
        .register::<Gadget>()
        .build()
        .unwrap()
}

fn widget(name: &str, price: i64) -> Widget {
    Widget {
        id: None,
        name: name.to_string(),
        price,
    }
}

#[test]
fn widget_lifecycle_save_find_delete() {
    let manager = in_memory_manager();

    let mut bolt = widget("bolt", 5);
    let saved = manager.save(&mut bolt).unwrap().clone();
    assert_eq!(
        saved,
        Widget {
            id: Some(1),
            name: "bolt".to_string(),
            price: 5,
        }
    );
    assert_eq!(bolt.id, Some(1));

    let found: Option<Widget> = manager.find(1_i64).unwrap();
    assert_eq!(found, Some(saved.clone()));

    assert_eq!(
        manager.delete(&saved).unwrap(),
        DeleteOutcome::Deleted { rows: 1 }
    );
    assert_eq!(manager.find::<Widget>(1_i64).unwrap(), None);
}

#[test]
fn save_reports_missing_key_when_identifier_column_is_not_generated() {
    let provider = SharedConnection::open_in_memory().unwrap();
    provider
        .acquire()
        .unwrap()
        .execute_batch("CREATE TABLE parts (id BIGINT PRIMARY KEY, name TEXT);")
        .unwrap();
    let manager = BasicEntityManager::builder(provider)
        .register::<Part>()
        .build()
        .unwrap();

    let mut part = Part {
        name: "x".to_string(),
        ..Part::default()
    };
    let err = manager.save(&mut part).unwrap_err();
    assert!(matches!(err, OrmError::MissingGeneratedKey { table: "parts" }));
    assert_eq!(part.id, None);

    let stored: Option<i64> = manager
        .provider()
        .acquire()
        .unwrap()
        .query_row("SELECT id FROM parts", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, None);
}

#[test]
fn saved_identifier_is_the_stored_identifier() {
    let provider = SharedConnection::open_in_memory().unwrap();
    provider
        .acquire()
        .unwrap()
        .execute_batch(
            "CREATE TABLE parts (id BIGINT PRIMARY KEY DEFAULT 500, name TEXT);
             CREATE TABLE ticks (id INTEGER PRIMARY KEY);",
        )
        .unwrap();
    let manager = BasicEntityManager::builder(provider)
        .register::<Part>()
        .register::<Tick>()
        .build()
        .unwrap();

    let mut part = Part {
        name: "gear".to_string(),
        note: Some("scratch".to_string()),
        ..Part::default()
    };
    manager.save(&mut part).unwrap();
    assert_eq!(part.id, Some(500));
    let loaded: Part = manager.find(500_i64).unwrap().unwrap();
    assert_eq!(loaded.name, "gear");
    assert_eq!(loaded.note, None);

    let mut first = Tick::default();
    let mut second = Tick::default();
    manager.save(&mut first).unwrap();
    manager.save(&mut second).unwrap();
    assert_eq!((first.id, second.id), (Some(1), Some(2)));
    assert!(manager.find::<Tick>(second.id).unwrap().is_some());
}

#[test]
fn documented_entity_keeps_its_field_attributes() {
    let part = Part {
        id: Some(3),
        name: "gear".to_string(),
        note: Some("scratch".to_string()),
    };
    assert_eq!(
        serde_json::to_value(&part).unwrap(),
        serde_json::json!({ "id": 3, "part_name": "gear" })
    );
}

#[test]
fn find_all_on_empty_table_returns_empty_vec() {
    let manager = in_memory_manager();
    let widgets: Vec<Widget> = manager.find_all().unwrap();
    assert!(widgets.is_empty());
}

#[test]
fn find_all_returns_every_row_in_insert_order() {
    let manager = in_memory_manager();
    for (name, price) in [("bolt", 5), ("nut", 2), ("washer", 1)] {
        manager.save(&mut widget(name, price)).unwrap();
    }

    let names: Vec<String> = manager
        .find_all::<Widget>()
        .unwrap()
        .into_iter()
        .map(|widget| widget.name)
        .collect();
    assert_eq!(names, vec!["bolt", "nut", "washer"]);
}

#[test]
fn find_missing_id_is_absent_not_error() {
    let manager = in_memory_manager();
    manager.save(&mut widget("bolt", 5)).unwrap();
    assert!(manager.find::<Widget>(42_i64).unwrap().is_none());
}

#[test]
fn sequential_saves_yield_distinct_identifiers() {
    let manager = in_memory_manager();
    let mut ids = HashSet::new();
    for index in 0..5 {
        let mut item = widget("part", index);
        manager.save(&mut item).unwrap();
        assert!(ids.insert(item.id.unwrap()));
    }
    assert_eq!(ids.len(), 5);
}

#[test]
fn delete_unknown_identifier_reports_not_found() {
    let manager = in_memory_manager();
    let ghost = Widget {
        id: Some(77),
        name: "ghost".to_string(),
        price: 0,
    };
    assert_eq!(manager.delete(&ghost).unwrap(), DeleteOutcome::NotFound);
    assert!(!manager.delete_quietly(&ghost));

    let unsaved = widget("draft", 1);
    assert_eq!(manager.delete(&unsaved).unwrap(), DeleteOutcome::NotFound);
}

#[test]
fn delete_quietly_collapses_driver_errors_to_false() {
    let manager = in_memory_manager();
    let mut bolt = widget("bolt", 5);
    manager.save(&mut bolt).unwrap();
    manager
        .provider()
        .acquire()
        .unwrap()
        .execute_batch("DROP TABLE widgets;")
        .unwrap();

    assert!(matches!(manager.delete(&bolt), Err(OrmError::Db(_))));
    assert!(!manager.delete_quietly(&bolt));
}

#[test]
fn delete_quietly_reports_true_for_existing_row() {
    let manager = in_memory_manager();
    let mut bolt = widget("bolt", 5);
    manager.save(&mut bolt).unwrap();
    assert!(manager.delete_quietly(&bolt));
    assert!(manager.find::<Widget>(bolt.id).unwrap().is_none());
}

#[test]
fn unmanaged_type_is_rejected_before_touching_the_database() {
    let manager = in_memory_manager();
    // `orphans` has no table; the error must come from the registry check.
    let err = manager.find_all::<Orphan>().unwrap_err();
    assert!(matches!(err, OrmError::UnmanagedType { type_name } if type_name.ends_with("Orphan")));

    let mut orphan = Orphan::default();
    assert!(matches!(
        manager.save(&mut orphan),
        Err(OrmError::UnmanagedType { .. })
    ));
    assert!(!manager.delete_quietly(&orphan));
}

#[test]
fn column_overrides_and_transient_fields_are_honored() {
    let manager = in_memory_manager();
    let mut lamp = Gadget {
        id: None,
        name: "lamp".to_string(),
        weight: Some(1.5),
        active: true,
        cached_summary: Some("not persisted".to_string()),
    };
    manager.save(&mut lamp).unwrap();
    let id = lamp.id.unwrap();

    let label: String = manager
        .provider()
        .acquire()
        .unwrap()
        .query_row(
            "SELECT label FROM gadgets WHERE gadget_id = ?1",
            [id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(label, "lamp");

    let loaded: Gadget = manager.find(id).unwrap().unwrap();
    assert_eq!(loaded.name, "lamp");
    assert_eq!(loaded.weight, Some(1.5));
    assert!(loaded.active);
    assert_eq!(loaded.cached_summary, None);
}

#[test]
fn null_columns_map_to_none() {
    let manager = in_memory_manager();
    let mut light = Gadget {
        name: "feather".to_string(),
        ..Gadget::default()
    };
    manager.save(&mut light).unwrap();

    let loaded: Gadget = manager.find(light.id).unwrap().unwrap();
    assert_eq!(loaded.weight, None);
    assert!(!loaded.active);
}

#[test]
fn values_with_sql_metacharacters_are_stored_verbatim() {
    let manager = in_memory_manager();
    let tricky = "o'brien'); DROP TABLE widgets; --";
    let mut item = widget(tricky, 3);
    manager.save(&mut item).unwrap();

    let loaded: Widget = manager.find(item.id).unwrap().unwrap();
    assert_eq!(loaded.name, tricky);
    assert_eq!(manager.find_all::<Widget>().unwrap().len(), 1);
}

#[test]
fn row_shape_mismatch_is_a_mapping_error() {
    let manager = in_memory_manager();
    {
        let conn = manager.provider().acquire().unwrap();
        conn.execute_batch(
            "DROP TABLE widgets;
             CREATE TABLE widgets (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO widgets (id, name) VALUES (1, 'bolt');",
        )
        .unwrap();
    }

    let err = manager.find::<Widget>(1_i64).unwrap_err();
    assert!(matches!(
        err,
        OrmError::Mapping(MappingError::MissingColumn {
            table: "widgets",
            column: "price"
        })
    ));
}

#[test]
fn file_provider_supports_concurrent_callers() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FileConnectionProvider::new(DbConfig::file(dir.path().join("orm.db"))).unwrap();
    provider.acquire().unwrap().execute_batch(SCHEMA).unwrap();
    let manager = BasicEntityManager::builder(provider)
        .register::<Widget>()
        .build()
        .unwrap();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let manager = &manager;
            scope.spawn(move || {
                for index in 0..5 {
                    let mut item = widget(&format!("w{worker}-{index}"), index);
                    manager.save(&mut item).unwrap();
                }
            });
        }
    });

    let all: Vec<Widget> = manager.find_all().unwrap();
    assert_eq!(all.len(), 20);
    let ids: HashSet<_> = all.iter().map(|item| item.id).collect();
    assert_eq!(ids.len(), 20);
}
