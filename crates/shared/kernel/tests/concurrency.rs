use serde_json::json;
use settle_kernel::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

#[test]
fn memo_is_computed_once_across_threads() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut model = Model::new("Test.concurrent");
    model.option("id").unwrap();
    model
        .memo("slow_square", move |s| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok(json!(s.get_as::<i64>("id")?.pow(2)))
        })
        .unwrap();

    let settings = Arc::new(model.build(Input::new().with("id", 12)).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let settings = Arc::clone(&settings);
            thread::spawn(move || settings.get("slow_square").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), json!(144));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn cycle_entered_from_both_ends_fails_on_both_threads() {
    let barrier = Arc::new(Barrier::new(2));
    let (first, second) = (Arc::clone(&barrier), barrier);

    let mut model = Model::new("Test.cycle");
    model
        .memo("a", move |s| {
            first.wait();
            s.get("b")
        })
        .unwrap()
        .memo("b", move |s| {
            second.wait();
            s.get("a")
        })
        .unwrap();

    let settings = Arc::new(model.build(Input::new()).unwrap());
    let (tx, rx) = mpsc::channel();
    for name in ["a", "b"] {
        let settings = Arc::clone(&settings);
        let tx = tx.clone();
        thread::spawn(move || tx.send((name, settings.get(name))).unwrap());
    }

    for _ in 0..2 {
        let (name, result) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result, Err(ModelError::MemoCycle { .. })), "{name}: {result:?}");
    }
    assert!(!settings.is_memoized("a"));
    assert!(!settings.is_memoized("b"));
}

#[test]
fn waiting_reader_gets_the_value_computed_by_another_thread() {
    let barrier = Arc::new(Barrier::new(2));
    let started = Arc::clone(&barrier);

    let mut model = Model::new("Test.chain");
    model.option("id").unwrap();
    model
        .memo("base", move |s| {
            started.wait();
            thread::sleep(Duration::from_millis(20));
            Ok(json!(s.get_as::<i64>("id")? + 1))
        })
        .unwrap()
        .memo("double", |s| Ok(json!(s.get_as::<i64>("base")? * 2)))
        .unwrap();

    let settings = Arc::new(model.build(Input::new().with("id", 20)).unwrap());
    let computing = {
        let settings = Arc::clone(&settings);
        thread::spawn(move || settings.get("base").unwrap())
    };
    barrier.wait();

    assert_eq!(settings.get("double").unwrap(), json!(42));
    assert_eq!(computing.join().unwrap(), json!(21));
}

#[test]
fn models_and_settings_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Model>();
    assert_send_sync::<Settings>();
    assert_send_sync::<Policy>();
}
