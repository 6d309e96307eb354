//! Tests for the native ↔ runtime adapters

use super::*;
use crate::arity::Arity;
use crate::error::{BridgeError, BridgeResult};
use crate::{curried, list};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct OutOfInk;

impl fmt::Display for OutOfInk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "out of ink")
    }
}

impl std::error::Error for OutOfInk {}

impl From<OutOfInk> for BridgeError {
    fn from(err: OutOfInk) -> Self {
        BridgeError::native(err)
    }
}

fn add_ish() -> Subr {
    wrap(curried!((a: i64, b: i64) (c: i64) () => a + b + c.unwrap_or(0)))
}

#[test]
fn test_wrap_records_arity() {
    assert_eq!(add_ish().arity(), Arity::new(2, 1, false));

    let sum_all = wrap(curried!(() () (items) => items.list_len()));
    assert_eq!(sum_all.arity(), Arity::new(0, 0, true));
}

#[test]
fn test_wrap_optional_present() {
    let frame = [DynValue::from(3), DynValue::from(4), DynValue::from(10)];
    assert_eq!(add_ish().invoke(&frame).unwrap(), DynValue::from(17));
}

#[test]
fn test_wrap_optional_absent() {
    let frame = [DynValue::from(3), DynValue::from(4), DynValue::undefined()];
    assert_eq!(add_ish().invoke(&frame).unwrap(), DynValue::from(7));
}

#[test]
fn test_wrap_rejects_wrong_frame() {
    let err = add_ish().invoke(&[DynValue::from(3)]).unwrap_err();
    assert!(matches!(err, BridgeError::FrameMismatch { expected: 3, got: 1 }));
}

#[test]
fn test_wrap_passes_rest_list_as_is() {
    let seen = wrap(curried!((head: i64) () (tail) => list![head, tail]));
    let frame = [DynValue::from(1), list![2, 3]];
    let result = seen.invoke(&frame).unwrap();
    assert_eq!(result, list![1, list![2, 3]]);
}

#[test]
fn test_wrap_void_result_is_unspecified() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let touch = wrap(move || {
        let counter = Arc::clone(&counter);
        move || move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let result = touch.invoke(&[]).unwrap();
    assert!(result.is_unspecified());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_wrap_native_error_propagates() {
    let jam = wrap(curried!((x: i64) () () => if x > 0 { Ok(x) } else { Err(OutOfInk) }));

    assert_eq!(jam.invoke(&[DynValue::from(2)]).unwrap(), DynValue::from(2));

    match jam.invoke(&[DynValue::from(0)]).unwrap_err() {
        BridgeError::Native(native) => assert!(native.downcast_ref::<OutOfInk>().is_some()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_wrap_coercion_error_propagates() {
    let err = add_ish()
        .invoke(&[DynValue::from("three"), DynValue::from(4), DynValue::undefined()])
        .unwrap_err();
    assert!(matches!(err, BridgeError::WrongType { .. }));
}

#[test]
fn test_call_under_supplied_optionals() {
    let f = curried!((a: i64) (b: i64, c: i64) () => (a, b, c));
    let (a, b, c) = call(&f, [DynValue::from(1), DynValue::from(2)]).unwrap();
    assert_eq!((a, b, c), (1, Some(2), None));
}

#[test]
fn test_call_collects_rest() {
    let f = curried!((a: i64) () (rest) => (a, rest));
    let (a, rest) = call(
        &f,
        [DynValue::from(1), DynValue::from(2), DynValue::from(3)],
    )
    .unwrap();
    assert_eq!(a, 1);
    assert_eq!(rest, list![2, 3]);
}

#[test]
fn test_call_empty_rest_is_empty_list() {
    let f = curried!((a: i64) (b: i64) (rest) => (a, b, rest));
    let (_, b, rest) = call(&f, [DynValue::from(1)]).unwrap();
    assert_eq!(b, None);
    assert!(rest.is_nil());
}

#[test]
fn test_call_rest_after_full_optionals() {
    let f = curried!(() (a: i64) (rest) => (a, rest));
    let (a, rest) = call(&f, [DynValue::from(1), DynValue::from(2)]).unwrap();
    assert_eq!(a, Some(1));
    assert_eq!(rest, list![2]);
}

#[test]
fn test_call_dynamic_checks_arity() {
    let f = curried!((a: i64) () () => a);
    let err = call_dynamic(&f, &[DynValue::from(1), DynValue::from(2)]).unwrap_err();
    match err {
        BridgeError::ArityMismatch { name, arity, supplied } => {
            assert_eq!(name, NATIVE_CALLER);
            assert_eq!(arity, Arity::new(1, 0, false));
            assert_eq!(supplied, 2);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(call_dynamic(&f, &[DynValue::from(5)]).unwrap(), 5);
}

#[test]
fn test_result_conversion() {
    assert_eq!(5i64.into_dyn_result().unwrap(), DynValue::from(5));
    assert!(().into_dyn_result().unwrap().is_unspecified());

    let failed: Result<i64, OutOfInk> = Err(OutOfInk);
    assert!(matches!(failed.into_dyn_result(), Err(BridgeError::Native(_))));
}

define_subr! {
    fn scale = "scale" (x: f64) [factor: f64] rest extra -> BridgeResult<f64> {
        let bonus = extra.list_len()? as f64;
        Ok(x * factor.unwrap_or(1.0) + bonus)
    }
}

#[test]
fn test_define_subr_call() {
    assert_eq!(scale::NAME, "scale");
    assert_eq!(scale::subr().arity(), Arity::new(1, 1, true));

    let plain = scale::call([DynValue::from(2.0)]).unwrap().unwrap();
    assert_eq!(plain, 2.0);

    let scaled = scale::call([DynValue::from(2.0), DynValue::from(3.0), DynValue::nil()])
        .unwrap()
        .unwrap();
    assert_eq!(scaled, 7.0);
}
