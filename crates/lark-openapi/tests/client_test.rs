use std::sync::Arc;

use lark_openapi::{
    ApiRequest, AuthMode, Client, Domain, FakeBackend, HttpResponse, LarkError, Method,
    RequestOptions,
};
use serde_json::json;

const BASE: &str = "https://open.test";

fn client(backend: &Arc<FakeBackend>) -> Client {
    Client::builder("cli_a", "sec")
        .domain(Domain::Custom(BASE.to_string()))
        .backend(backend.clone())
        .build()
}

fn token(backend: &FakeBackend, token: &str) {
    backend.push_json(json!({
        "code": 0,
        "msg": "ok",
        "tenant_access_token": token,
        "expire": 7200,
    }));
}

fn ok(data: serde_json::Value) -> serde_json::Value {
    json!({ "code": 0, "msg": "success", "data": data })
}

// ── Payload formatting ───────────────────────────────────────────────────────

#[tokio::test]
async fn tenant_token_is_fetched_and_attached() {
    let backend = Arc::new(FakeBackend::new());
    token(&backend, "t-1");
    backend.push_json(ok(json!({ "space": { "space_id": "sp1", "name": "Docs" } })));

    let space = client(&backend)
        .wiki()
        .get_space("sp1", Some("en"))
        .await
        .unwrap();
    assert_eq!(space.name.as_deref(), Some("Docs"));

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].url,
        format!("{BASE}/open-apis/auth/v3/tenant_access_token/internal")
    );
    assert_eq!(requests[0].header("Authorization"), None);

    let call = &requests[1];
    assert_eq!(call.method, Method::GET);
    assert_eq!(call.url, format!("{BASE}/open-apis/wiki/v2/spaces/sp1"));
    assert_eq!(call.query_value("lang"), Some("en"));
    assert_eq!(call.header("Authorization"), Some("Bearer t-1"));
    assert!(call
        .header("User-Agent")
        .unwrap()
        .starts_with("lark-openapi-rust/"));
}

#[tokio::test]
async fn tenant_token_is_reused_across_calls() {
    let backend = Arc::new(FakeBackend::new());
    token(&backend, "t-1");
    backend
        .push_json(ok(json!({ "space": { "space_id": "a" } })))
        .push_json(ok(json!({ "space": { "space_id": "b" } })));

    let client = client(&backend);
    client.wiki().get_space("a", None).await.unwrap();
    client.clone().wiki().get_space("b", None).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 3, "clones share the token cache");
    assert_eq!(requests[2].header("Authorization"), Some("Bearer t-1"));
}

#[tokio::test]
async fn user_token_wins_over_tenant_token() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(ok(json!({ "space": { "space_id": "sp1" } })));

    let options = RequestOptions::new()
        .with_tenant_token("t-explicit")
        .with_user_access_token("u-1");
    client(&backend)
        .wiki()
        .with_options(options)
        .get_space("sp1", None)
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 1, "no token fetch when a token is supplied");
    assert_eq!(requests[0].header("Authorization"), Some("Bearer u-1"));
}

#[tokio::test]
async fn explicit_tenant_token_skips_token_manager() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(ok(json!({ "space": { "space_id": "sp1" } })));

    client(&backend)
        .wiki()
        .with_options(RequestOptions::new().with_tenant_token("t-explicit"))
        .get_space("sp1", None)
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("Authorization"), Some("Bearer t-explicit"));
}

#[tokio::test]
async fn helpdesk_credential_and_extra_headers() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(ok(json!({})));

    let options = RequestOptions::new()
        .with_tenant_token("t")
        .with_helpdesk_credential("hd-1", "secret")
        .with_header("X-Request-Id", "req-9");
    client(&backend)
        .raw_request(ApiRequest::get("/open-apis/helpdesk/v1/tickets"), &options)
        .await
        .unwrap();

    let request = &backend.requests()[0];
    assert_eq!(
        request.header("X-Lark-Helpdesk-Authorization"),
        Some("aGQtMTpzZWNyZXQ=")
    );
    assert_eq!(request.header("x-request-id"), Some("req-9"));
}

#[tokio::test]
async fn auth_none_sends_no_authorization() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(json!({ "code": 0, "msg": "ok", "extra": 1 }));

    let body = client(&backend)
        .raw_request(
            ApiRequest::post("/open-apis/auth/v3/app_ticket/resend").auth(AuthMode::None),
            &RequestOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(body["extra"], 1);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("Authorization"), None);
}

#[tokio::test]
async fn auth_app_uses_app_access_token() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_json(json!({ "code": 0, "app_access_token": "a-1", "expire": 7200 }))
        .push_json(ok(json!({})));

    client(&backend)
        .raw_request(
            ApiRequest::get("/open-apis/some/app/endpoint").auth(AuthMode::App),
            &RequestOptions::new(),
        )
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(
        requests[0].url,
        format!("{BASE}/open-apis/auth/v3/app_access_token/internal")
    );
    assert_eq!(requests[1].header("Authorization"), Some("Bearer a-1"));
}

// ── Path templating ──────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_path_param_fails_before_sending() {
    let backend = Arc::new(FakeBackend::new());
    let err = client(&backend)
        .raw_request(
            ApiRequest::get("/open-apis/wiki/v2/spaces/:space_id"),
            &RequestOptions::new().with_tenant_token("t"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LarkError::MissingPathParam(ref p) if p == "space_id"));
    assert_eq!(err.to_string(), "request miss space_id path argument");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn path_params_are_percent_encoded() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(ok(json!({ "space": {} })));

    client(&backend)
        .wiki()
        .with_options(RequestOptions::new().with_tenant_token("t"))
        .get_space("a/b c", None)
        .await
        .unwrap();
    assert_eq!(
        backend.requests()[0].url,
        format!("{BASE}/open-apis/wiki/v2/spaces/a%2Fb%20c")
    );
}

// ── Envelope handling ────────────────────────────────────────────────────────

#[tokio::test]
async fn api_error_carries_code_and_log_id() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(
        HttpResponse::ok(json!({ "code": 131006, "msg": "permission denied" }))
            .with_status(400)
            .with_header("X-Tt-Logid", "log-1"),
    );

    let err = client(&backend)
        .wiki()
        .with_options(RequestOptions::new().with_tenant_token("t"))
        .get_space("sp1", None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(131006));
    assert_eq!(err.log_id(), Some("log-1"));
    assert!(err.to_string().contains("permission denied"));
}

#[tokio::test]
async fn stale_token_is_dropped_and_refetched() {
    let backend = Arc::new(FakeBackend::new());
    token(&backend, "t-1");
    backend.push_json(json!({ "code": 99991663, "msg": "Invalid access token" }));
    token(&backend, "t-2");
    backend.push_json(ok(json!({ "space": { "space_id": "sp1" } })));

    let client = client(&backend);
    let err = client.wiki().get_space("sp1", None).await.unwrap_err();
    assert!(err.is_token_invalid());

    client.wiki().get_space("sp1", None).await.unwrap();
    let requests = backend.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].header("Authorization"), Some("Bearer t-2"));
}

#[tokio::test]
async fn stale_caller_token_leaves_cache_alone() {
    let backend = Arc::new(FakeBackend::new());
    token(&backend, "t-1");
    backend
        .push_json(ok(json!({ "space": {} })))
        .push_json(json!({ "code": 99991663, "msg": "Invalid access token" }))
        .push_json(ok(json!({ "space": {} })));

    let client = client(&backend);
    client.wiki().get_space("sp1", None).await.unwrap();
    client
        .wiki()
        .with_options(RequestOptions::new().with_user_access_token("u-stale"))
        .get_space("sp1", None)
        .await
        .unwrap_err();
    client.wiki().get_space("sp1", None).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 4, "managed tenant token is still cached");
    assert_eq!(requests[3].header("Authorization"), Some("Bearer t-1"));
}

#[tokio::test]
async fn stale_app_token_is_dropped_and_tenant_token_kept() {
    let backend = Arc::new(FakeBackend::new());
    token(&backend, "t-1");
    backend
        .push_json(ok(json!({ "space": {} })))
        .push_json(json!({ "code": 0, "app_access_token": "a-1", "expire": 7200 }))
        .push_json(json!({ "code": 99991663, "msg": "Invalid access token" }))
        .push_json(json!({ "code": 0, "app_access_token": "a-2", "expire": 7200 }))
        .push_json(ok(json!({})))
        .push_json(ok(json!({ "space": {} })));

    let client = client(&backend);
    let app_call = || ApiRequest::get("/open-apis/x").auth(AuthMode::App);
    client.wiki().get_space("sp1", None).await.unwrap();
    let err = client
        .raw_request(app_call(), &RequestOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_token_invalid());
    client
        .raw_request(app_call(), &RequestOptions::new())
        .await
        .unwrap();
    client.wiki().get_space("sp1", None).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 7);
    assert_eq!(requests[3].header("Authorization"), Some("Bearer a-1"));
    assert_eq!(
        requests[4].url,
        format!("{BASE}/open-apis/auth/v3/app_access_token/internal")
    );
    assert_eq!(requests[5].header("Authorization"), Some("Bearer a-2"));
    assert_eq!(requests[6].header("Authorization"), Some("Bearer t-1"));
}

#[tokio::test]
async fn non_envelope_error_status_is_http_error() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(HttpResponse::ok(json!("bad gateway")).with_status(502));

    let err = client(&backend)
        .raw_request(
            ApiRequest::get("/open-apis/x"),
            &RequestOptions::new().with_tenant_token("t"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LarkError::Http(ref m) if m.contains("502")), "got: {err}");
}

#[tokio::test]
async fn null_data_decodes_as_empty() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(json!({ "code": 0, "msg": "success", "data": null }));

    client(&backend)
        .wiki()
        .with_options(RequestOptions::new().with_tenant_token("t"))
        .update_node_title("sp1", "wik1", "New title")
        .await
        .unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.body, Some(json!({ "title": "New title" })));
}

#[tokio::test]
async fn missing_required_field_is_parsing_error() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(ok(json!({})));

    let err = client(&backend)
        .wiki()
        .with_options(RequestOptions::new().with_tenant_token("t"))
        .get_node("wik1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LarkError::Parsing(ref m) if m.contains("node")), "got: {err}");
}

#[tokio::test]
async fn transport_errors_propagate() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_error(LarkError::Timeout("deadline".into()));

    let err = client(&backend)
        .wiki()
        .with_options(RequestOptions::new().with_tenant_token("t"))
        .get_space("sp1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LarkError::Timeout(_)));
}
