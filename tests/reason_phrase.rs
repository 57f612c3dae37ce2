//! Reason phrases as sent on the wire by a real server.

mod common;

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use capture_shim::{CaptureDecision, Shim, ShimOptions, Transport};
use common::*;

/// Serve one connection with a fixed status line, then close.
fn serve_once(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "{}\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom",
            status_line
        );
        stream.write_all(response.as_bytes()).unwrap();
    });
    format!("http://{}/orders", addr)
}

#[tokio::test]
async fn wire_reason_phrase_is_recorded() {
    let url = serve_once("HTTP/1.1 500 Database Exploded");

    let sink = MemorySink::new();
    let shim = Shim::new(None, ShimOptions::new().with_log(sink.clone()).disabled(false));
    shim.capture("http://127.0.0.1:*/*", |_req| CaptureDecision::capture());

    let response = shim.client().unwrap().send(get(&url)).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(response.body().as_ref(), b"boom");

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["level"], "ERROR");
    assert_eq!(records[0]["error"], "Database Exploded");
}

#[tokio::test]
async fn canonical_reason_phrase_is_recorded() {
    let url = serve_once("HTTP/1.1 404 Not Found");

    let sink = MemorySink::new();
    let shim = Shim::new(None, ShimOptions::new().with_log(sink.clone()).disabled(false));
    shim.capture("http://127.0.0.1:*/*", |_req| CaptureDecision::capture());

    shim.client().unwrap().send(get(&url)).await.unwrap();

    let records = sink.records();
    assert_eq!(records[0]["statusCode"], 404);
    assert_eq!(records[0]["error"], "Not Found");
}
