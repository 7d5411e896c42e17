// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use carefree_core::{
    apply_reference, bind, from_config, Archetype, BindingError, ClassDeclaration, ConfigTree,
    ConfigValue, PropertyDescriptor, PropertyType, Scope,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Default, Clone, PartialEq, Archetype)]
struct DbArchetype {
    url: Option<String>,
    max_active: Option<i32>,
    min_idle: Option<i32>,
    test_on_borrow: Option<bool>,
}

#[derive(Debug, Default, Clone, Archetype)]
struct RedisArchetype {
    command_timeout: Option<i64>,
    #[archetype(rename = "db")]
    database: Option<i32>,
    serializer: Option<ClassDeclaration>,
    extras: Option<BTreeMap<String, ConfigValue>>,
}

#[derive(Debug, Default, Clone, Archetype)]
struct HashExtras {
    extras: Option<HashMap<String, ConfigValue>>,
}

static COUNTED_INTROSPECTIONS: AtomicUsize = AtomicUsize::new(0);

/// Written by hand so that every call to `properties` is observable.
#[derive(Debug, Default, Clone)]
struct CountedArchetype {
    url: Option<String>,
}

impl Archetype for CountedArchetype {
    fn properties() -> Vec<PropertyDescriptor<Self>> {
        COUNTED_INTROSPECTIONS.fetch_add(1, Ordering::SeqCst);
        vec![PropertyDescriptor::new::<String>(
            "url",
            None,
            |target: &Self| target.url.clone().map(PropertyType::into_property),
            |target: &mut Self, value| {
                target.url = Some(String::from_property(value)?);
                Ok(())
            },
        )]
    }
}

#[test]
fn test_end_to_end_binding() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::from_entries([
        ("db.url", ConfigValue::from("jdbc:x")),
        ("db.max-active", ConfigValue::from(20)),
    ]);

    // --- ACT ---
    let db: DbArchetype = from_config(&tree, Some("db"), None).unwrap();

    // --- ASSERT ---
    assert_eq!(db.url.as_deref(), Some("jdbc:x"));
    assert_eq!(db.max_active, Some(20));
    assert_eq!(db.min_idle, None);
    assert_eq!(db.test_on_borrow, None);
}

#[test]
fn test_introspection_runs_once_across_binds() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::new().with_value("db.url", "jdbc:x");

    // --- ACT ---
    let mut bound = Vec::new();
    for _ in 0..5 {
        let mut target = CountedArchetype::default();
        bind(&mut target, &tree, Some("db"), None).unwrap();
        bound.push(target);
    }
    let mut merged = CountedArchetype::default();
    apply_reference(&mut merged, &bound[0]).unwrap();

    // --- ASSERT ---
    assert_eq!(COUNTED_INTROSPECTIONS.load(Ordering::SeqCst), 1);
    assert!(bound.iter().all(|target| target.url.as_deref() == Some("jdbc:x")));
    assert_eq!(merged.url.as_deref(), Some("jdbc:x"));
}

#[test]
fn test_every_naming_convention_binds_the_same() {
    init_logger();
    for path in [
        "r.commandTimeout",
        "r.command-timeout",
        "r.command_timeout",
    ] {
        // --- ARRANGE ---
        let tree = ConfigTree::new().with_value(path, 500_i64);

        // --- ACT ---
        let redis: RedisArchetype = from_config(&tree, Some("r"), None).unwrap();

        // --- ASSERT ---
        assert_eq!(redis.command_timeout, Some(500), "bound from {path}");
    }
}

#[test]
fn test_verbatim_beats_kebab_beats_snake() {
    init_logger();
    // --- ARRANGE ---
    let all = ConfigTree::new()
        .with_value("r.commandTimeout", 1_i64)
        .with_value("r.command-timeout", 2_i64)
        .with_value("r.command_timeout", 3_i64);
    let no_verbatim = ConfigTree::new()
        .with_value("r.command-timeout", 2_i64)
        .with_value("r.command_timeout", 3_i64);

    // --- ACT ---
    let from_all: RedisArchetype = from_config(&all, Some("r"), None).unwrap();
    let from_rest: RedisArchetype = from_config(&no_verbatim, Some("r"), None).unwrap();

    // --- ASSERT ---
    assert_eq!(from_all.command_timeout, Some(1));
    assert_eq!(from_rest.command_timeout, Some(2));
}

#[test]
fn test_default_prefix_fills_the_gaps() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::new()
        .with_value("main.url", "jdbc:main")
        .with_value("main.max-active", 8)
        .with_value("replica.url", "jdbc:replica");

    // --- ACT ---
    let replica: DbArchetype = from_config(&tree, Some("replica"), Some("main")).unwrap();

    // --- ASSERT ---
    assert_eq!(replica.url.as_deref(), Some("jdbc:replica"));
    assert_eq!(replica.max_active, Some(8));
}

#[test]
fn test_force_default_keeps_the_prior_value() {
    init_logger();
    // --- ARRANGE ---
    let mut db = DbArchetype {
        max_active: Some(4),
        ..Default::default()
    };
    let tree = ConfigTree::new()
        .with_value("db.max-active", "FoRcE-DeFaUlT")
        .with_value("db.url", "force-default")
        .with_value("base.url", "jdbc:base");

    // --- ACT ---
    bind(&mut db, &tree, Some("db"), Some("base")).unwrap();

    // --- ASSERT ---
    assert_eq!(db.max_active, Some(4));
    assert_eq!(db.url, None, "the sentinel also blocks the default prefix");
}

#[test]
fn test_rename_attribute() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::new()
        .with_value("r.db", 3)
        .with_value("r.database", 9);

    // --- ACT ---
    let redis: RedisArchetype = from_config(&tree, Some("r"), None).unwrap();

    // --- ASSERT ---
    assert_eq!(redis.database, Some(3));
}

#[test]
fn test_map_property_takes_the_whole_tree() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::new()
        .with_value("r.extras", "ignored")
        .with_value("r.command-timeout", 5_i64)
        .with_value("other.flag", true);

    // --- ACT ---
    let redis: RedisArchetype = from_config(&tree, Some("r"), None).unwrap();
    let hashed: HashExtras = from_config(&tree, Some("r"), None).unwrap();

    // --- ASSERT ---
    let extras = redis.extras.unwrap();
    assert_eq!(extras.len(), 3);
    assert_eq!(extras["other.flag"], ConfigValue::Bool(true));
    assert_eq!(hashed.extras.map(|extras| extras.len()), Some(3));
}

#[test]
fn test_declaration_from_class_name() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::new().with_value("r.serializer", "codec.Json");

    // --- ACT ---
    let redis: RedisArchetype = from_config(&tree, Some("r"), None).unwrap();

    // --- ASSERT ---
    let serializer = redis.serializer.unwrap();
    assert_eq!(serializer.class_name(), Some("codec.Json"));
    assert_eq!(serializer.effective_scope(), Scope::Singleton);
}

#[test]
fn test_declaration_from_defined_value() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::new().with_value("r.serializer", " Defined(STRING) ");

    // --- ACT ---
    let redis: RedisArchetype = from_config(&tree, Some("r"), None).unwrap();

    // --- ASSERT ---
    let serializer = redis.serializer.unwrap();
    assert_eq!(serializer.defined_value(), Some("STRING"));
    assert!(serializer.is_inert());
}

#[test]
fn test_declaration_from_object() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::from_json_str(
        r#"{
            "r": {
                "serializer": {
                    "class-name": "codec.Prefixed",
                    "constructor_args": ["app:", 2],
                    "initializeMethod": "warm",
                    "scope": "Prototype"
                }
            }
        }"#,
    )
    .unwrap();

    // --- ACT ---
    let redis: RedisArchetype = from_config(&tree, Some("r"), None).unwrap();

    // --- ASSERT ---
    let serializer = redis.serializer.unwrap();
    assert_eq!(serializer.class_name(), Some("codec.Prefixed"));
    assert_eq!(
        serializer.constructor_args,
        Some(vec![ConfigValue::from("app:"), ConfigValue::from(2)])
    );
    assert_eq!(serializer.initialize_method.as_deref(), Some("warm"));
    assert_eq!(serializer.effective_scope(), Scope::Prototype);
}

#[test]
fn test_declaration_rejects_scalars() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::new().with_value("r.serializer", 12);

    // --- ACT ---
    let err = from_config::<RedisArchetype>(&tree, Some("r"), None).unwrap_err();

    // --- ASSERT ---
    assert!(matches!(err, BindingError::Declaration { found: "number", .. }));
}

#[test]
fn test_coercion_failure_names_the_property() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::new().with_value("db.max-active", "many");

    // --- ACT ---
    let err = from_config::<DbArchetype>(&tree, Some("db"), None).unwrap_err();

    // --- ASSERT ---
    match err {
        BindingError::Coercion { property, path, .. } => {
            assert_eq!(property, "maxActive");
            assert_eq!(path, "db.max-active");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_rebinding_is_idempotent() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::new()
        .with_value("db.url", "jdbc:x")
        .with_value("db.test-on-borrow", "yes");
    let mut db = DbArchetype::default();
    bind(&mut db, &tree, Some("db"), None).unwrap();
    let once = db.clone();

    // --- ACT ---
    bind(&mut db, &tree, Some("db"), None).unwrap();

    // --- ASSERT ---
    assert_eq!(db, once);
    assert_eq!(db.test_on_borrow, Some(true));
}

#[test]
fn test_reference_is_additive() {
    init_logger();
    // --- ARRANGE ---
    let reference = DbArchetype {
        url: Some("jdbc:ref".to_owned()),
        max_active: Some(50),
        min_idle: Some(5),
        test_on_borrow: None,
    };
    let mut target = DbArchetype {
        url: Some(String::new()),
        max_active: None,
        min_idle: Some(1),
        test_on_borrow: Some(false),
    };

    // --- ACT ---
    apply_reference(&mut target, &reference).unwrap();

    // --- ASSERT ---
    assert_eq!(target.url.as_deref(), Some(""), "empty strings count as set");
    assert_eq!(target.max_active, Some(50));
    assert_eq!(target.min_idle, Some(1));
    assert_eq!(target.test_on_borrow, Some(false));
}
