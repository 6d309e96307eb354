//! Tests for the reference runtime

use super::*;
use crate::{curried, list};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicUsize;
use std::thread;

fn add_ish(runtime: &Runtime) -> BridgeResult<DynValue> {
    runtime.define_curried(
        "add-ish",
        curried!((a: i64, b: i64) (c: i64) () => a + b + c.unwrap_or(0)),
    )
}

#[test]
fn test_operations_require_entry() {
    let runtime = Runtime::default();
    assert!(!runtime.is_entered());
    assert!(matches!(runtime.lookup("x"), Err(BridgeError::NotEntered)));
    assert!(matches!(add_ish(&runtime), Err(BridgeError::NotEntered)));

    runtime.enter(|| {
        assert!(runtime.is_entered());
        add_ish(&runtime).unwrap();
    });
    assert!(!runtime.is_entered());
}

#[test]
fn test_entry_is_per_runtime() {
    let first = Runtime::default();
    let second = Runtime::default();
    first.enter(|| {
        assert!(first.is_entered());
        assert!(!second.is_entered());
    });
}

#[test]
fn test_nested_entry() {
    let runtime = Runtime::default();
    let depth = runtime.enter(|| runtime.enter(|| entry::depth(runtime.id())));
    assert_eq!(depth, 2);
    assert_eq!(entry::depth(runtime.id()), 0);
}

#[test]
fn test_entry_released_on_panic() {
    let runtime = Runtime::default();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        runtime.enter(|| panic!("native code failed"));
    }));
    assert!(outcome.is_err());
    assert!(!runtime.is_entered());

    // another thread can still get in
    thread::scope(|scope| {
        scope
            .spawn(|| runtime.enter(|| runtime.is_defined("x").unwrap()))
            .join()
            .unwrap();
    });
}

#[test]
fn test_entry_serializes_threads() {
    let runtime = Runtime::default();
    let inside = AtomicUsize::new(0);
    let overlap = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    runtime.enter(|| {
                        if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                            overlap.fetch_add(1, Ordering::SeqCst);
                        }
                        thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            });
        }
    });

    assert_eq!(overlap.load(Ordering::SeqCst), 0);
}

#[test]
fn test_apply_pads_missing_optionals() {
    let runtime = Runtime::default();
    runtime.enter(|| {
        add_ish(&runtime).unwrap();
        assert_eq!(runtime.call_with("add-ish", [3, 4]).unwrap(), DynValue::from(7));
        assert_eq!(runtime.call_with("add-ish", [3, 4, 10]).unwrap(), DynValue::from(17));
    });
}

#[test]
fn test_apply_builds_rest_list() {
    let runtime = Runtime::default();
    runtime.enter(|| {
        runtime
            .define_curried("tail", curried!((a: i64) () (rest) => list![a, rest]))
            .unwrap();

        let result = runtime.call_with("tail", [1, 2, 3]).unwrap();
        assert_eq!(result, list![1, list![2, 3]]);

        let result = runtime.call_with("tail", [1]).unwrap();
        assert_eq!(result, list![1, DynValue::nil()]);
    });
}

#[test]
fn test_long_rest_list() {
    let runtime = Runtime::default();
    let args: Vec<DynValue> = (0..200_000).map(DynValue::from).collect();

    runtime.enter(|| {
        runtime
            .define_curried(
                "count-all",
                curried!(() () (items) => items.list_len().unwrap_or(0)),
            )
            .unwrap();
        runtime
            .define_curried("keep-all", curried!(() () (items) => items))
            .unwrap();

        let count = runtime.call("count-all", &args).unwrap();
        assert_eq!(count, DynValue::from(200_000));

        let kept = runtime.call("keep-all", &args).unwrap();
        assert_eq!(kept, DynValue::list(args.iter().cloned()));
        assert_eq!(kept.list_len().unwrap(), 200_000);
    });
}

#[test]
fn test_arity_mismatch_never_invokes() {
    let runtime = Runtime::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    runtime.enter(|| {
        runtime
            .define_curried("square", move |x: i64| {
                counter.fetch_add(1, Ordering::SeqCst);
                move || move || x * x
            })
            .unwrap();

        let err = runtime.call_with("square", [2, 3]).unwrap_err();
        match err {
            BridgeError::ArityMismatch { name, arity, supplied } => {
                assert_eq!(name, "square");
                assert_eq!(arity, Arity::new(1, 0, false));
                assert_eq!(supplied, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(runtime.call("square", &[]).unwrap_err().is_arity_mismatch());
    });

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_redefinition_rebinds() {
    let runtime = Runtime::default();
    runtime.enter(|| {
        runtime.define_curried("answer", || || || 41).unwrap();
        runtime.define_curried("answer", || || || 42).unwrap();
        assert_eq!(runtime.call("answer", &[]).unwrap(), DynValue::from(42));
        assert_eq!(runtime.names().unwrap(), vec!["answer".to_string()]);
    });
}

#[test]
fn test_max_params_limit() {
    let runtime = Runtime::new(RuntimeConfig {
        max_params: Some(2),
        warn_on_redefine: false,
    });
    runtime.enter(|| {
        let err = add_ish(&runtime).unwrap_err();
        assert!(matches!(err, BridgeError::ArityLimit { limit: 2, .. }));
        assert!(!runtime.is_defined("add-ish").unwrap());

        runtime
            .define_curried("pair", curried!((a: i64) () (rest) => list![a, rest]))
            .unwrap();
    });
}

#[test]
fn test_unbound_and_not_callable() {
    let runtime = Runtime::default();
    runtime.enter(|| {
        assert!(matches!(
            runtime.call("missing", &[]),
            Err(BridgeError::UnboundVariable { .. })
        ));

        runtime.define("pi", 2.5).unwrap();
        assert_eq!(runtime.lookup("pi").unwrap(), DynValue::from(2.5));
        assert!(matches!(
            runtime.call("pi", &[]),
            Err(BridgeError::NotCallable { found: crate::ValueKind::Real })
        ));
    });
}

#[test]
fn test_procedure_display() {
    let runtime = Runtime::default();
    runtime.enter(|| {
        let handle = add_ish(&runtime).unwrap();
        assert_eq!(handle.to_string(), "#<procedure add-ish (2 1 0)>");
        assert_eq!(handle.as_procedure().unwrap().name(), "add-ish");
        // the returned handle is the bound value
        assert_eq!(runtime.lookup("add-ish").unwrap(), handle);
    });
}

#[test]
fn test_procedure_calls_back_into_runtime() {
    let runtime = Arc::new(Runtime::default());
    let inner = Arc::clone(&runtime);

    runtime.enter(|| {
        add_ish(&runtime).unwrap();
        runtime
            .define_curried("twice", move |x: i64| {
                let inner = Arc::clone(&inner);
                move || move || inner.call_with("add-ish", [x, x])
            })
            .unwrap();

        assert_eq!(runtime.call_with("twice", [5]).unwrap(), DynValue::from(10));
    });
}

#[test]
fn test_with_runtime_passes_result_through() {
    let value = with_runtime(|| 7 * 6);
    assert_eq!(value, 42);

    let text: String = with_runtime(|| "tortoise".to_string());
    assert_eq!(text, "tortoise");
    assert!(!Runtime::global().is_entered());
}
