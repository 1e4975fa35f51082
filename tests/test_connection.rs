//! End-to-end connection driver tests over an in-memory duplex stream:
//! raw request bytes in, raw response bytes out.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wicket::http::connection::Connection;
use wicket::routes::router::Router;
use wicket::routes::users::User;

fn static_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("static")
}

fn test_router() -> Arc<Router> {
    Arc::new(Router::new(static_root()))
}

/// Feeds raw request bytes to a connection and collects the raw
/// response bytes it writes back.
async fn roundtrip(router: Arc<Router>, raw: &[u8]) -> Vec<u8> {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    client.write_all(raw).await.unwrap();

    let mut conn = Connection::new(server, router, Duration::from_secs(5));
    conn.run().await.unwrap();
    drop(conn);

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    out
}

fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let pos = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header block terminator");
    (
        String::from_utf8(raw[..pos].to_vec()).unwrap(),
        raw[pos + 4..].to_vec(),
    )
}

fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

#[tokio::test]
async fn test_index_is_served_byte_identical() {
    let out = roundtrip(
        test_router(),
        b"GET /index.html HTTP/1.1\r\nHost: localhost:8080\r\nConnection: keep-alive\r\n\r\n",
    )
    .await;

    let (head, body) = split_response(&out);
    let expected = std::fs::read(static_root().join("index.html")).unwrap();

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(
        header_value(&head, "Content-Type").unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(
        header_value(&head, "Content-Length").unwrap(),
        expected.len().to_string()
    );
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_root_maps_to_index() {
    let out = roundtrip(test_router(), b"GET / HTTP/1.1\r\n\r\n").await;

    let (head, body) = split_response(&out);
    let expected = std::fs::read(static_root().join("index.html")).unwrap();

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_css_is_served_byte_identical() {
    let out = roundtrip(
        test_router(),
        b"GET /css/styles.css HTTP/1.1\r\nHost: localhost:8080\r\nAccept: text/css,*/*;q=0.1\r\n\r\n",
    )
    .await;

    let (head, body) = split_response(&out);
    let expected = std::fs::read(static_root().join("css/styles.css")).unwrap();

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(
        header_value(&head, "Content-Type").unwrap(),
        "text/css; charset=utf-8"
    );
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_create_user_via_get_query_string() {
    let router = test_router();
    let out = roundtrip(
        router.clone(),
        b"GET /user/create?userId=cu&password=password&name=%EC%9D%B4%EB%8F%99%EA%B7%9C&email=brainbackdoor%40gmail.com HTTP/1.1\r\nHost: localhost:8080\r\nAccept: */*\r\n\r\n",
    )
    .await;

    assert_eq!(out, b"HTTP/1.1 302 Found\r\nLocation: /index.html\r\n\r\n");

    let saved = router.user_store().find_user_by_id("cu").await.unwrap();
    assert_eq!(
        saved,
        User {
            user_id: "cu".to_string(),
            password: "password".to_string(),
            name: "이동규".to_string(),
            email: "brainbackdoor@gmail.com".to_string(),
        }
    );
}

#[tokio::test]
async fn test_create_user_via_post_form_body() {
    let router = test_router();
    let out = roundtrip(
        router.clone(),
        b"POST /user/create HTTP/1.1\r\nHost: localhost:8080\r\nContent-Length: 92\r\nContent-Type: application/x-www-form-urlencoded\r\nAccept: */*\r\n\r\nuserId=cu&password=password&name=%EC%9D%B4%EB%8F%99%EA%B7%9C&email=brainbackdoor%40gmail.com",
    )
    .await;

    assert_eq!(out, b"HTTP/1.1 302 Found\r\nLocation: /index.html\r\n\r\n");

    let saved = router.user_store().find_user_by_id("cu").await.unwrap();
    assert_eq!(saved.name, "이동규");
    assert_eq!(saved.email, "brainbackdoor@gmail.com");
}

#[tokio::test]
async fn test_login_failure_redirects_without_cookie() {
    let router = test_router();
    router
        .user_store()
        .add_user(User {
            user_id: "cu".to_string(),
            password: "password".to_string(),
            name: "name".to_string(),
            email: "email".to_string(),
        })
        .await;

    let out = roundtrip(
        router,
        b"POST /user/login HTTP/1.1\r\nHost: localhost:8080\r\nContent-Length: 32\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\nuserId=hyeonmo&password=password",
    )
    .await;

    assert_eq!(
        out,
        b"HTTP/1.1 302 Found\r\nLocation: /user/login_failed.html\r\n\r\n"
    );
}

#[tokio::test]
async fn test_login_success_sets_session_cookie() {
    let router = test_router();
    router
        .user_store()
        .add_user(User {
            user_id: "cu".to_string(),
            password: "password".to_string(),
            name: "name".to_string(),
            email: "email".to_string(),
        })
        .await;

    let out = roundtrip(
        router,
        b"POST /user/login HTTP/1.1\r\nHost: localhost:8080\r\nContent-Length: 27\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\nuserId=cu&password=password",
    )
    .await;

    let (head, body) = split_response(&out);
    assert!(head.starts_with("HTTP/1.1 302 Found\r\n"));
    assert_eq!(header_value(&head, "Location").unwrap(), "/index.html");
    assert!(body.is_empty());

    let cookie = header_value(&head, "Set-Cookie").unwrap();
    let token = cookie.strip_prefix("JSESSIONID=").unwrap();
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_unknown_path_yields_404() {
    let out = roundtrip(test_router(), b"GET /missing.html HTTP/1.1\r\n\r\n").await;

    let (head, body) = split_response(&out);
    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(
        header_value(&head, "Content-Length").unwrap(),
        body.len().to_string()
    );
}

#[tokio::test]
async fn test_unknown_extension_yields_415() {
    let out = roundtrip(test_router(), b"GET /data.bin HTTP/1.1\r\n\r\n").await;

    let (head, _) = split_response(&out);
    assert!(head.starts_with("HTTP/1.1 415 Unsupported Media Type\r\n"));
}

#[tokio::test]
async fn test_malformed_request_line_yields_400() {
    let out = roundtrip(test_router(), b"BLAH\r\n\r\n").await;

    let (head, _) = split_response(&out);
    assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_incomplete_request_times_out_without_response() {
    let (mut client, server) = tokio::io::duplex(4096);
    client
        .write_all(b"GET /index.html HTTP/1.1\r\nHost: local")
        .await
        .unwrap();

    let mut conn = Connection::new(server, test_router(), Duration::from_millis(50));
    conn.run().await.unwrap();
    drop(conn);

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_request_split_across_reads_is_reassembled() {
    let (mut client, server) = tokio::io::duplex(4096);
    let router = test_router();

    let handle = tokio::spawn(async move {
        let mut conn = Connection::new(server, router, Duration::from_secs(5));
        conn.run().await.unwrap();
    });

    client.write_all(b"GET /index.h").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    client.write_all(b"tml HTTP/1.1\r\n\r\n").await.unwrap();

    handle.await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    let (head, _) = split_response(&out);
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
}
