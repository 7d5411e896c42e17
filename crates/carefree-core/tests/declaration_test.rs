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
    from_config, ArgType, ClassBuilder, ClassDeclaration, ClassRegistration, ClassRegistry,
    ConfigTree, ConfigValue, InstantiationError, Realizer, Scope, SingletonCache,
};
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// --- CLASSES USED BY THE TESTS ---

#[derive(Debug)]
struct Codec {
    prefix: String,
    level: i32,
    warmed: bool,
}

#[derive(Debug)]
struct Clock;

static SLOW_BUILDS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
struct Slow;

fn codec_class() -> ClassBuilder<Codec> {
    ClassBuilder::<Codec>::new("test.Codec")
        .constructor(&[], |_| {
            Ok(Codec {
                prefix: String::new(),
                level: 0,
                warmed: false,
            })
        })
        .constructor(&[ArgType::String, ArgType::Integer], |args| {
            Ok(Codec {
                prefix: args[0].as_str().unwrap_or_default().to_owned(),
                level: args[1].as_i64().unwrap_or_default() as i32,
                warmed: false,
            })
        })
        .static_factory("named", &[ArgType::String], |args| {
            Ok(Codec {
                prefix: format!("{}:", args[0].as_str().unwrap_or_default()),
                level: 1,
                warmed: false,
            })
        })
        .static_factory("label", &[], |_| Ok(String::from("codec")))
        .initializer("warm", &[ArgType::Boolean], |codec, args| {
            codec.warmed = args[0].as_bool().unwrap_or_default();
            Ok(())
        })
        .initializer("fail", &[], |_, _| Err(anyhow::anyhow!("cannot warm up")))
}

/// A class whose constructor realizes its own class name again.
#[derive(Debug)]
struct Ouroboros;

// Constructors only see their arguments, so the nested call reaches the
// realizer through this cell.
static SELF_REALIZER: OnceLock<Realizer> = OnceLock::new();

fn realizer() -> Realizer {
    let mut registry = ClassRegistry::new();
    registry.register(codec_class());
    registry.register(ClassBuilder::<Clock>::new("test.Clock").constructor(&[], |_| Ok(Clock)));
    registry.register(ClassBuilder::<Slow>::new("test.Slow").constructor(&[], |_| {
        SLOW_BUILDS.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok(Slow)
    }));
    registry.register(ClassBuilder::<Ouroboros>::new("test.Ouroboros").constructor(&[], |_| {
        let realizer = SELF_REALIZER
            .get()
            .ok_or_else(|| anyhow::anyhow!("no realizer installed"))?;
        realizer.realize::<Ouroboros>(&ClassDeclaration::new("test.Ouroboros"))?;
        Ok(Ouroboros)
    }));
    Realizer::new(Arc::new(registry), Arc::new(SingletonCache::new()))
}

inventory::submit! {
    ClassRegistration(|registry| {
        registry.register(ClassBuilder::<Clock>::new("submitted.Clock").constructor(&[], |_| Ok(Clock)));
    })
}

// --- TESTS ---

#[test]
fn test_singletons_collapse_by_class_name() {
    init_logger();
    // --- ARRANGE ---
    let realizer = realizer();
    let plain = ClassDeclaration::new("test.Codec");
    let configured = ClassDeclaration::new("test.Codec")
        .with_constructor_args(vec!["app:".into(), 3.into()])
        .with_scope(Scope::Singleton);

    // --- ACT ---
    let first = realizer.realize::<Codec>(&configured).unwrap().unwrap();
    let second = realizer.realize::<Codec>(&plain).unwrap().unwrap();
    let clock = realizer
        .realize_any(&ClassDeclaration::new("test.Clock"))
        .unwrap()
        .unwrap();

    // --- ASSERT ---
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.prefix, "app:", "the first construction wins");
    assert!(clock.downcast_ref::<Clock>().is_some());
    assert_eq!(realizer.singletons().len(), 2);
}

#[test]
fn test_independent_caches_do_not_share() {
    init_logger();
    // --- ARRANGE ---
    let declaration = ClassDeclaration::new("test.Clock");

    // --- ACT ---
    let a = realizer().realize::<Clock>(&declaration).unwrap().unwrap();
    let b = realizer().realize::<Clock>(&declaration).unwrap().unwrap();

    // --- ASSERT ---
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_prototypes_are_always_fresh() {
    init_logger();
    // --- ARRANGE ---
    let realizer = realizer();
    let declaration = ClassDeclaration::new("test.Codec").with_scope(Scope::Prototype);

    // --- ACT ---
    let first = realizer.realize::<Codec>(&declaration).unwrap().unwrap();
    let second = realizer.realize::<Codec>(&declaration).unwrap().unwrap();

    // --- ASSERT ---
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(realizer.singletons().is_empty());
}

#[test]
fn test_static_factory_and_initializer() {
    init_logger();
    // --- ARRANGE ---
    let realizer = realizer();
    let declaration = ClassDeclaration::new("test.Codec")
        .with_static_factory("named", vec!["user".into()])
        .with_initializer("warm", vec![true.into()])
        .with_scope(Scope::Prototype);

    // --- ACT ---
    let codec = realizer.realize::<Codec>(&declaration).unwrap().unwrap();

    // --- ASSERT ---
    assert_eq!(codec.prefix, "user:");
    assert_eq!(codec.level, 1);
    assert!(codec.warmed);
}

#[test]
fn test_static_factory_may_produce_another_type() {
    init_logger();
    // --- ARRANGE ---
    let realizer = realizer();
    let declaration = ClassDeclaration::new("test.Codec")
        .with_static_factory("label", vec![])
        .with_scope(Scope::Prototype);

    // --- ACT ---
    let label = realizer.realize::<String>(&declaration).unwrap().unwrap();

    // --- ASSERT ---
    assert_eq!(label.as_str(), "codec");
}

#[test]
fn test_blank_class_name_realizes_nothing() {
    init_logger();
    // --- ARRANGE ---
    let realizer = realizer();

    // --- ACT ---
    let blank = realizer.realize::<Codec>(&ClassDeclaration::new(" ")).unwrap();
    let defined = realizer
        .realize::<Codec>(&ClassDeclaration::from_reference("DEFINED(X)"))
        .unwrap();

    // --- ASSERT ---
    assert!(blank.is_none());
    assert!(defined.is_none());
}

#[test]
fn test_failures() {
    init_logger();
    // --- ARRANGE ---
    let realizer = realizer();
    let wrong_initializer_args = ClassDeclaration::new("test.Codec")
        .with_initializer("warm", vec!["yes".into()])
        .with_scope(Scope::Prototype);
    let failing_initializer = ClassDeclaration::new("test.Codec")
        .with_initializer("fail", vec![])
        .with_scope(Scope::Prototype);

    // --- ACT ---
    let missing = realizer.realize::<Codec>(&ClassDeclaration::new("test.Missing"));
    let no_method = realizer.realize::<Codec>(&wrong_initializer_args);
    let failing = realizer.realize::<Codec>(&failing_initializer).unwrap_err();

    // --- ASSERT ---
    assert!(matches!(missing, Err(InstantiationError::ClassNotFound { .. })));
    assert!(matches!(no_method, Err(InstantiationError::NoSuchMethod { .. })));
    assert!(matches!(failing, InstantiationError::Invocation { .. }));
    let cause = failing.source().map(ToString::to_string);
    assert_eq!(cause.as_deref(), Some("cannot warm up"));
}

#[test]
fn test_failed_singleton_is_retried() {
    init_logger();
    // --- ARRANGE ---
    let realizer = realizer();
    let failing = ClassDeclaration::new("test.Codec").with_initializer("fail", vec![]);
    let working = ClassDeclaration::new("test.Codec");

    // --- ACT ---
    let failed = realizer.realize::<Codec>(&failing);
    let cached_after_failure = realizer.singletons().len();
    let retried = realizer.realize::<Codec>(&working).unwrap();

    // --- ASSERT ---
    assert!(failed.is_err());
    assert_eq!(cached_after_failure, 0);
    assert!(retried.is_some());
}

#[test]
fn test_singleton_realizing_itself_fails() {
    init_logger();
    // --- ARRANGE ---
    let realizer = SELF_REALIZER.get_or_init(realizer);

    // --- ACT ---
    let err = realizer
        .realize::<Ouroboros>(&ClassDeclaration::new("test.Ouroboros"))
        .unwrap_err();

    // --- ASSERT ---
    let InstantiationError::Invocation { source, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert!(matches!(
        source.downcast_ref::<InstantiationError>(),
        Some(InstantiationError::RecursiveConstruction { class_name }) if class_name == "test.Ouroboros"
    ));
    assert!(realizer.singletons().get("test.Ouroboros").is_none());
}

#[test]
fn test_concurrent_singleton_builds_once() {
    init_logger();
    // --- ARRANGE ---
    let realizer = realizer();
    let declaration = ClassDeclaration::new("test.Slow");

    // --- ACT ---
    let results: Vec<Arc<Slow>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| realizer.realize::<Slow>(&declaration).unwrap().unwrap()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    // --- ASSERT ---
    assert_eq!(SLOW_BUILDS.load(Ordering::SeqCst), 1);
    assert!(results.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_concurrent_declaration_scope_builds_once() {
    init_logger();
    // --- ARRANGE ---
    let realizer = realizer();
    let declaration = ClassDeclaration::new("test.Codec").with_scope(Scope::Declaration);

    // --- ACT ---
    let results: Vec<Arc<Codec>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let declaration = declaration.clone();
                let realizer = &realizer;
                scope.spawn(move || realizer.realize::<Codec>(&declaration).unwrap().unwrap())
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    // --- ASSERT ---
    assert!(results.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_bound_declaration_realizes() {
    init_logger();
    // --- ARRANGE ---
    let tree = ConfigTree::from_json_str(
        r#"{"codec": {"class-name": "test.Codec", "constructor-args": ["k:", 7], "scope": "prototype"}}"#,
    )
    .unwrap();
    let declaration: ClassDeclaration = from_config(&tree, Some("codec"), None).unwrap();

    // --- ACT ---
    let codec = realizer().realize::<Codec>(&declaration).unwrap().unwrap();

    // --- ASSERT ---
    assert_eq!(codec.prefix, "k:");
    assert_eq!(codec.level, 7);
    assert_eq!(
        declaration.constructor_args,
        Some(vec![ConfigValue::from("k:"), ConfigValue::from(7)])
    );
}

#[test]
fn test_submitted_registrations_are_collected() {
    init_logger();
    // --- ARRANGE ---
    let registry = ClassRegistry::with_registered();
    let has_submitted = registry.contains("submitted.Clock");
    let realizer = Realizer::new(Arc::new(registry), Arc::new(SingletonCache::new()));

    // --- ACT ---
    let clock = realizer
        .realize::<Clock>(&ClassDeclaration::new("submitted.Clock"))
        .unwrap();

    // --- ASSERT ---
    assert!(has_submitted);
    assert!(clock.is_some());
}
