//! End-to-end test of the storage server's accept loop and RPC dispatch.

use std::sync::Arc;

use server::{Handler, SledStore};
use wire::{Request, Response};

fn tempdir(tag: &str) -> std::path::PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("pdb-dispatcher-test-{}-{}", std::process::id(), tag));
    p
}

async fn call(addr: &str, req: Request) -> Response {
    let mut t = wire::dial(addr).await.unwrap();
    wire::codec::send(&mut t, &req).await.unwrap();
    wire::codec::recv(&mut t).await.unwrap()
}

#[tokio::test]
async fn put_then_get_round_trips_over_the_wire() {
    let store = Arc::new(SledStore::open(&tempdir("put-get")).unwrap());
    let handler = Arc::new(Handler::new("127.0.0.1:0".into(), store));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    let server_addr = addr.clone();
    tokio::spawn(async move {
        server::serve(&server_addr, handler).await.unwrap();
    });
    // give the accept loop a moment to bind
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let resp = call(
        &addr,
        Request::Put {
            key: b"k".to_vec(),
            value: b"v".to_vec(),
        },
    )
    .await;
    assert!(matches!(resp, Response::Ok));

    let resp = call(&addr, Request::Get { key: b"k".to_vec() }).await;
    assert!(matches!(resp, Response::Value(Some(v)) if v == b"v".to_vec()));

    let resp = call(&addr, Request::Get { key: b"missing".to_vec() }).await;
    assert!(matches!(resp, Response::Value(None)));
}

#[tokio::test]
async fn init_with_peers_populates_replica_set() {
    let store = Arc::new(SledStore::open(&tempdir("init")).unwrap());
    let handler = Arc::new(Handler::new("127.0.0.1:0".into(), store));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    let server_addr = addr.clone();
    tokio::spawn(async move {
        server::serve(&server_addr, handler).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let resp = call(
        &addr,
        Request::Init {
            self_addr: addr.clone(),
            other_nodes: vec!["10.0.0.2:4567".into(), "10.0.0.3:4567".into()],
            replicas: 1,
        },
    )
    .await;
    assert!(matches!(resp, Response::Ok));
}
