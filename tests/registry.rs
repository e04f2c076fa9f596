//! Registry, Declaration and Concurrency Suite

use std::sync::{Arc, Once};

use argcheck::{
    Arguments, CheckedRegistry, CheckerConfig, Class, Declaration, ErrorKind, Function,
    ShortfallPolicy, TypeRegistry, Value,
};
use tempfile::tempdir;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("argcheck=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn host_functions() -> Vec<Function> {
    vec![
        Function::parse("greet", "(name, punctuation='!')", |args| {
            let name = args.positional()[0].as_str().unwrap_or_default().to_string();
            let punctuation = args.positional()[1].as_str().unwrap_or_default().to_string();
            Ok(Value::from(format!("Hello, {}{}", name, punctuation)))
        })
        .unwrap(),
        Function::parse("area", "(shape)", |args| {
            let side = args.positional()[0]
                .as_object()
                .and_then(|obj| obj.field("side"))
                .and_then(Value::as_float)
                .unwrap_or_default();
            Ok(Value::Float(side * side))
        })
        .unwrap(),
    ]
}

#[test]
fn test_declarations_loaded_from_directory() {
    init_tracing();
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("greet.yaml"),
        "function: greet\nargs: [str]\nkwargs:\n  punctuation: str\nreturns: str\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("area.json"),
        r#"{"function": "area", "args": ["Square"], "returns": ["float", "int"]}"#,
    )
    .unwrap();

    let host = Arc::new(TypeRegistry::new());
    let square = Class::new("Square");
    host.register(&square);

    let registry = CheckedRegistry::new(host);
    let count = registry.load_declarations(dir.path(), &host_functions()).unwrap();
    assert_eq!(count, 2);
    assert_eq!(registry.names(), vec!["area".to_string(), "greet".to_string()]);

    let res = registry.call("greet", &Arguments::new().arg("Ada")).unwrap();
    assert_eq!(res, Value::from("Hello, Ada!"));
    let err = registry
        .call("greet", &Arguments::new().arg("Ada").kwarg("punctuation", 1))
        .unwrap_err();
    assert_eq!(err.mismatch().and_then(|m| m.parameter()), Some("punctuation"));

    let shape = Value::object(&square, [("side", Value::Float(3.0))]);
    assert_eq!(registry.call("area", &Arguments::new().arg(shape)).unwrap(), Value::Float(9.0));
    let err = registry.call("area", &Arguments::new().arg(3.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn test_registry_config_applies_to_declarations() {
    init_tracing();
    let dir = tempdir().expect("Failed to create temp dir");
    let greet = r#"{"function": "greet", "args": ["str"]}"#;
    std::fs::write(dir.path().join("greet.json"), greet).unwrap();

    let config = CheckerConfig {
        shortfall: ShortfallPolicy::Reject,
        ..CheckerConfig::default()
    };
    let registry = CheckedRegistry::default().with_config(config);
    let count = registry.load_declarations(dir.path(), &host_functions()).unwrap();
    assert_eq!(count, 0);
    assert!(registry.get("greet").is_none());
}

#[test]
fn test_config_file_drives_checker() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("argcheck.yml");
    std::fs::write(&path, "enabled: false\n").unwrap();
    let config = CheckerConfig::from_file(&path).unwrap();

    let decl = Declaration::from_yaml("function: greet\nargs: [int]\n").unwrap();
    let checked = decl.checker().with_config(config).decorate(host_functions().remove(0)).unwrap();
    assert!(checked.is_passthrough());
    assert_eq!(checked.call(&Arguments::new().arg("Ada")).unwrap(), Value::from("Hello, Ada!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_invocations() {
    init_tracing();
    let registry = Arc::new(CheckedRegistry::default());
    let greet = host_functions().remove(0);
    registry.register(registry.checker().arg("str").returns("str").decorate(greet).unwrap());

    let mut handles = Vec::new();
    for i in 0..16i64 {
        let registry = registry.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let ok = registry.call("greet", &Arguments::new().arg(format!("user{}", i)));
            let bad = registry.call("greet", &Arguments::new().arg(i));
            (i, ok, bad)
        }));
    }

    for handle in handles {
        let (i, ok, bad) = handle.await.unwrap();
        assert_eq!(ok.unwrap(), Value::from(format!("Hello, user{}!", i)));
        let mismatch = bad.unwrap_err();
        assert_eq!(mismatch.mismatch().map(|m| m.value.clone()), Some(i.to_string()));
    }
}

#[test]
fn test_checked_is_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<argcheck::Checked>();
    assert_send_sync::<argcheck::CheckedRegistry>();
    assert_send_sync::<argcheck::Function>();
    assert_send_sync::<argcheck::Error>();
}
