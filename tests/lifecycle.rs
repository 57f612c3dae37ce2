//! Process-wide shim construction. Kept to a single test: the global
//! instance outlives every test in this binary.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use capture_shim::{CaptureDecision, Shim, ShimOptions, ShimState, Transport};
use common::*;

#[tokio::test]
async fn global_shim_is_created_once() {
    assert!(Shim::global().is_none());

    let sink = MemorySink::new();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let sink = sink.clone();
            thread::spawn(move || {
                Shim::create(
                    Some(format!("key-{}", i)),
                    ShimOptions::new().with_log(sink).disabled(false),
                )
            })
        })
        .collect();
    let shims: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for shim in &shims[1..] {
        assert!(shims[0].same_as(shim));
    }
    let first_key = shims[0].api_key().map(str::to_string);

    // Later arguments are ignored entirely.
    let other_sink = MemorySink::new();
    let again = Shim::create(
        Some("ignored".to_string()),
        ShimOptions::new().with_log(other_sink.clone()).disabled(true),
    );
    assert!(again.same_as(&shims[0]));
    assert_eq!(again.api_key().map(str::to_string), first_key);
    assert_eq!(again.state(), ShimState::Running);
    assert!(Shim::global().is_some_and(|g| g.same_as(&again)));

    let invoked = Arc::new(AtomicUsize::new(0));
    let counter = invoked.clone();
    again.capture("https://example.com/*", move |_req| {
        counter.fetch_add(1, Ordering::SeqCst);
        CaptureDecision::capture()
    });

    let upstream = MockTransport::ok("");
    let client = shims[3].wrap(upstream.clone());
    client.send(get("https://example.com/one")).await.unwrap();
    assert_eq!(sink.records().len(), 1);
    assert!(other_sink.messages().is_empty());

    again.stop();
    assert_eq!(shims[0].state(), ShimState::Stopped);
    client.send(get("https://example.com/two")).await.unwrap();

    assert_eq!(upstream.calls(), 2);
    assert_eq!(invoked.load(Ordering::SeqCst), 1);
    assert_eq!(sink.records().len(), 1);

    // Stopping is terminal; a later create still returns the stopped instance.
    let after = Shim::create(None, ShimOptions::new());
    assert!(after.same_as(&again));
    assert_eq!(after.state(), ShimState::Stopped);
}
