use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gsubr::{call, curried, wrap, DynValue, Runtime};

fn bench_wrap_invoke(c: &mut Criterion) {
    let add_ish = wrap(curried!((a: i64, b: i64) (c: i64) () => a + b + c.unwrap_or(0)));
    let frame = [DynValue::from(3), DynValue::from(4), DynValue::undefined()];

    c.bench_function("wrap_invoke", |b| {
        b.iter(|| add_ish.invoke(black_box(&frame)));
    });
}

fn bench_native_call(c: &mut Criterion) {
    let sum = curried!((a: i64) () (rest) => a + rest.list_len().unwrap_or(0) as i64);

    c.bench_function("native_call_rest", |b| {
        b.iter(|| {
            call(
                &sum,
                black_box([DynValue::from(1), DynValue::from(2), DynValue::from(3)]),
            )
        });
    });
}

fn bench_runtime_dispatch(c: &mut Criterion) {
    let runtime = Runtime::default();
    let args = [DynValue::from(3), DynValue::from(4)];

    runtime.enter(|| {
        runtime
            .define_curried(
                "add-ish",
                curried!((a: i64, b: i64) (c: i64) () => a + b + c.unwrap_or(0)),
            )
            .ok();

        c.bench_function("runtime_call", |b| {
            b.iter(|| runtime.call("add-ish", black_box(&args[..])));
        });
    });
}

criterion_group!(benches, bench_wrap_invoke, bench_native_call, bench_runtime_dispatch);
criterion_main!(benches);
