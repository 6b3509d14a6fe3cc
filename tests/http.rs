//! Drives the real server over TCP with hand-written HTTP/1.1 requests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use portstore::{JsonFileStore, PortService, Server, api};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), portstore::Error>>,
}

async fn start(data_file: &Path) -> Running {
    let store = JsonFileStore::new(data_file);
    store.ensure_exists().unwrap();
    let app = api::routes(Arc::new(PortService::new(Arc::new(store))));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(app, async {
            let _ = stopped.await;
        }),
    );
    Running { addr, stop, handle }
}

struct Reply {
    status: u16,
    content_type: String,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(addr: SocketAddr, method: &str, path: &str, body: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!(
        "{method} {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\ncontent-length: {}\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(body.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();

    let split = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    let head = String::from_utf8(raw[..split].to_vec()).unwrap();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    let content_type = head
        .lines()
        .find_map(|l| {
            let (k, v) = l.split_once(':')?;
            k.eq_ignore_ascii_case("content-type").then(|| v.trim().to_owned())
        })
        .unwrap_or_default();
    Reply { status, content_type, body: raw[split + 4..].to_vec() }
}

#[tokio::test]
async fn crud_sequence_over_the_wire() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("data").join("ports.json");
    let server = start(&file).await;
    let addr = server.addr;

    let created = send(addr, "POST", "/api/ports", r#"{"portNumber":"1","hostname":"sw1"}"#).await;
    assert_eq!(created.status, 201);
    assert_eq!(created.content_type, "application/json; charset=utf-8");
    let port = json!({"id":"port-1","portNumber":"1","hostname":"sw1","vlan":"","portType":"Access","lag":false});
    assert_eq!(created.json(), port);

    let listed = send(addr, "GET", "/api/ports", "").await;
    assert_eq!(listed.json(), json!({ "ports": [port.clone()] }));

    let updated = send(addr, "PUT", "/api/ports/port-1", r#"{"vlan":"10"}"#).await;
    assert_eq!(updated.status, 200);
    let mut expected = port;
    expected["vlan"] = json!("10");
    assert_eq!(updated.json(), expected);

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(on_disk, json!([expected]));

    let deleted = send(addr, "DELETE", "/api/ports/port-1", "").await;
    assert_eq!((deleted.status, deleted.json()), (200, json!({"deleted":"port-1"})));

    let listed = send(addr, "GET", "/api/ports", "").await;
    assert_eq!(listed.json(), json!({"ports": []}));

    server.stop.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn errors_over_the_wire() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(&dir.path().join("ports.json")).await;
    let addr = server.addr;

    let bad = send(addr, "POST", "/api/ports", "{nope").await;
    assert_eq!((bad.status, bad.json()), (400, json!({"error":"Invalid JSON"})));

    let missing = send(addr, "DELETE", "/api/ports/ghost", "").await;
    assert_eq!((missing.status, missing.json()), (404, json!({"error":"Port not found"})));

    let unrouted = send(addr, "GET", "/index.html", "").await;
    assert_eq!(unrouted.status, 404);
    assert_eq!(unrouted.content_type, "text/plain; charset=utf-8");
    assert_eq!(unrouted.body, b"Not found");

    let unknown_method = send(addr, "PATCH", "/api/ports/port-1", "{}").await;
    assert_eq!(unknown_method.status, 404);

    server.stop.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn concurrent_posts_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ports.json");
    let server = start(&file).await;
    let addr = server.addr;

    let posts: Vec<_> = (0..16)
        .map(|i| {
            tokio::spawn(async move {
                send(addr, "POST", "/api/ports", &format!(r#"{{"id":"c{i}"}}"#)).await.status
            })
        })
        .collect();
    for post in posts {
        assert_eq!(post.await.unwrap(), 201);
    }

    let listed = send(addr, "GET", "/api/ports", "").await;
    assert_eq!(listed.json()["ports"].as_array().unwrap().len(), 16);

    server.stop.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}
