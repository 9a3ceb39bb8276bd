use lark_core::{HttpBackend, HttpRequest, LarkError, Method, ReqwestBackend};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one canned HTTP response on a local port and return its base URL.
async fn serve_once(
    status_line: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let mut seen = Vec::new();
        while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            seen.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nX-Tt-Logid: log-7\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });
    format!("http://{addr}")
}

fn backend() -> ReqwestBackend {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    ReqwestBackend::with_client(client)
}

fn get(url: String) -> HttpRequest {
    HttpRequest {
        method: Method::GET,
        url,
        query: vec![("page_size".to_string(), "10".to_string())],
        headers: vec![("Authorization".to_string(), "Bearer t".to_string())],
        body: None,
    }
}

// ── ReqwestBackend ───────────────────────────────────────────────────────────

#[tokio::test]
async fn json_body_and_headers_are_returned() {
    let base = serve_once("200 OK", "application/json", r#"{"code":0,"msg":"ok"}"#).await;

    let response = backend()
        .send(get(format!("{base}/open-apis/x")))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "code": 0, "msg": "ok" }));
    assert_eq!(response.header("x-tt-logid"), Some("log-7"));
}

#[tokio::test]
async fn gateway_html_error_page_is_http_error() {
    let base = serve_once("502 Bad Gateway", "text/html", "<html>Bad Gateway</html>").await;

    let err = backend()
        .send(get(format!("{base}/open-apis/x")))
        .await
        .unwrap_err();
    assert!(
        matches!(err, LarkError::Http(ref m) if m.contains("502") && m.contains("Bad Gateway")),
        "got: {err}"
    );
}

#[tokio::test]
async fn non_json_success_body_is_parsing_error() {
    let base = serve_once("200 OK", "text/plain", "not json").await;

    let err = backend()
        .send(get(format!("{base}/open-apis/x")))
        .await
        .unwrap_err();
    assert!(matches!(err, LarkError::Parsing(_)), "got: {err}");
}

#[tokio::test]
async fn error_status_with_json_envelope_is_passed_through() {
    let base = serve_once(
        "400 Bad Request",
        "application/json",
        r#"{"code":131006,"msg":"permission denied"}"#,
    )
    .await;

    let response = backend()
        .send(get(format!("{base}/open-apis/x")))
        .await
        .unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(response.body["code"], 131006);
}
