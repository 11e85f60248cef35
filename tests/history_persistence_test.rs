//! History snapshots written by one store must reload into an equal
//! mapping in a fresh one, including across overlapping publishers.

use fastfind::{HistoryStore, MatchRecord, ResultStore};
use std::sync::{Arc, Mutex};

fn record(filename: &str, line_number: u64, column: u64) -> MatchRecord {
    MatchRecord {
        filename: filename.to_string(),
        line_number,
        column,
        match_length: 2,
    }
}

#[test]
fn snapshot_round_trips_across_stores() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let mut store = ResultStore::new(HistoryStore::new(Some(path.clone())));
    store
        .publish("alpha", vec![record("a.c", 1, 0), record("b.c", 2, 4)])
        .unwrap();
    store.publish("beta", vec![record("c.c", 3, 1)]).unwrap();

    let reloaded = HistoryStore::load(Some(path)).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.get("alpha").unwrap().len(), 2);
    assert_eq!(reloaded.get("alpha").unwrap()[1], record("b.c", 2, 4));
    assert_eq!(reloaded.get("beta").unwrap()[0], record("c.c", 3, 1));

    let terms: Vec<_> = reloaded.terms().collect();
    assert_eq!(terms, vec!["beta", "alpha"]);
}

#[test]
fn concurrent_publishes_serialize_through_the_shared_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let store = Arc::new(Mutex::new(ResultStore::new(HistoryStore::new(Some(
        path.clone(),
    )))));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                let term = format!("term-{}", i);
                let results = vec![record(&format!("file-{}.c", i), i + 1, 0)];
                store.lock().unwrap().publish(&term, results).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every completed publish survived; the last writer fully wrote its
    // snapshot rather than corrupting it.
    let reloaded = HistoryStore::load(Some(path)).unwrap();
    assert_eq!(reloaded.len(), 8);
    for i in 0..8u64 {
        let results = reloaded.get(&format!("term-{}", i)).unwrap();
        assert_eq!(results[0].line_number, i + 1);
    }
}
