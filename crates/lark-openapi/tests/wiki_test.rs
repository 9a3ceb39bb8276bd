use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use lark_openapi::api::wiki::{
    CreateNodeBody, ListNodesQuery, Member, MoveDocsToWikiBody, SearchNodesBody, Wiki,
};
use lark_openapi::{
    collect_items, items, Client, Domain, FakeBackend, LarkError, Method, PageQuery,
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

fn wiki(client: &Client) -> Wiki<'_> {
    client
        .wiki()
        .with_options(RequestOptions::new().with_tenant_token("t"))
}

fn ok(data: serde_json::Value) -> serde_json::Value {
    json!({ "code": 0, "msg": "success", "data": data })
}

fn node_page(tokens: &[&str], has_more: bool, page_token: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = tokens
        .iter()
        .map(|t| json!({ "node_token": t, "title": format!("Node {t}") }))
        .collect();
    ok(json!({ "items": items, "has_more": has_more, "page_token": page_token }))
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_nodes_iter_follows_page_token() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_json(node_page(&["n1", "n2"], true, Some("cur-2")))
        .push_json(node_page(&["n3"], false, None));

    let client = client(&backend);
    let query = ListNodesQuery {
        page: PageQuery::new().with_page_size(2),
        parent_node_token: Some("root".into()),
    };
    let pages: Vec<_> = wiki(&client)
        .list_nodes_iter("sp1", &query)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].items.len(), 2);
    assert_eq!(pages[1].items[0].node_token.as_deref(), Some("n3"));

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url, format!("{BASE}/open-apis/wiki/v2/spaces/sp1/nodes"));
    assert_eq!(requests[0].query_value("page_token"), None);
    assert_eq!(requests[0].query_value("page_size"), Some("2"));
    assert_eq!(requests[1].query_value("page_token"), Some("cur-2"));
    assert_eq!(requests[1].query_value("parent_node_token"), Some("root"));
    assert_eq!(requests[1].query_value("page_size"), Some("2"));
}

#[tokio::test]
async fn iter_starts_from_caller_page_token() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_json(node_page(&["n5"], true, Some("cur-6")))
        .push_json(node_page(&["n6"], false, Some("")));

    let client = client(&backend);
    let query = ListNodesQuery {
        page: PageQuery::new().with_page_token("cur-5"),
        parent_node_token: None,
    };
    let nodes = collect_items(wiki(&client).list_nodes_iter("sp1", &query))
        .await
        .unwrap();
    assert_eq!(nodes.len(), 2);

    let requests = backend.requests();
    assert_eq!(requests[0].query_value("page_token"), Some("cur-5"));
    let tokens: Vec<_> = requests[1]
        .query
        .iter()
        .filter(|(k, _)| k == "page_token")
        .collect();
    assert_eq!(tokens.len(), 1, "cursor replaces, never duplicates");
    assert_eq!(tokens[0].1, "cur-6");
}

#[tokio::test]
async fn iter_is_lazy() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_json(node_page(&["n1"], true, Some("cur-2")))
        .push_json(node_page(&["n2"], false, None));

    let client = client(&backend);
    let mut pages = wiki(&client).list_nodes_iter("sp1", &ListNodesQuery::default());
    assert!(backend.requests().is_empty(), "nothing sent before polling");

    pages.next().await.unwrap().unwrap();
    assert_eq!(backend.requests().len(), 1);
    drop(pages);
    assert_eq!(backend.remaining(), 1);
}

#[tokio::test]
async fn iter_yields_error_then_ends() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_json(ok(json!({ "items": [{ "space_id": "a" }], "has_more": true, "page_token": "p2" })))
        .push_json(json!({ "code": 131005, "msg": "not found" }))
        .push_json(ok(json!({ "items": [{ "space_id": "never" }] })));

    let client = client(&backend);
    let results: Vec<_> = wiki(&client)
        .list_spaces_iter(&PageQuery::new(), None)
        .collect()
        .await;
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().code(), Some(131005));
    assert_eq!(backend.remaining(), 1, "no call after the failure");
}

#[tokio::test]
async fn items_flattens_members_across_pages() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_json(ok(json!({
            "items": [
                { "member_type": "openid", "member_id": "ou_1", "member_role": "admin" },
                { "member_type": "openid", "member_id": "ou_2", "member_role": "member" },
            ],
            "has_more": true,
            "page_token": "m2",
        })))
        .push_json(ok(json!({
            "items": [{ "member_type": "openid", "member_id": "ou_3", "member_role": "member" }],
            "has_more": false,
        })));

    let client = client(&backend);
    let ids: Vec<String> = items(wiki(&client).list_space_members_iter("sp1", &PageQuery::new()))
        .map_ok(|m| m.member_id)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(ids, ["ou_1", "ou_2", "ou_3"]);
}

// ── Endpoints ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_node_posts_body() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(ok(json!({ "node": { "node_token": "wik_new", "obj_type": "docx" } })));

    let client = client(&backend);
    let body = CreateNodeBody {
        obj_type: "docx".into(),
        node_type: "origin".into(),
        parent_node_token: Some("wik_parent".into()),
        title: Some("Runbook".into()),
        ..Default::default()
    };
    let node = wiki(&client).create_node("sp1", &body).await.unwrap();
    assert_eq!(node.node_token.as_deref(), Some("wik_new"));

    let request = &backend.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.body,
        Some(json!({
            "obj_type": "docx",
            "node_type": "origin",
            "parent_node_token": "wik_parent",
            "title": "Runbook",
        }))
    );
}

#[tokio::test]
async fn member_endpoints() {
    let backend = Arc::new(FakeBackend::new());
    let member = Member {
        member_type: "openid".into(),
        member_id: "ou_1".into(),
        member_role: "admin".into(),
        kind: None,
    };
    backend
        .push_json(ok(json!({ "member": member })))
        .push_json(ok(json!({ "member": member })));

    let client = client(&backend);
    let created = wiki(&client)
        .create_space_member("sp1", &member, Some(true))
        .await
        .unwrap();
    assert_eq!(created, member);
    wiki(&client).delete_space_member("sp1", &member).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests[0].url, format!("{BASE}/open-apis/wiki/v2/spaces/sp1/members"));
    assert_eq!(requests[0].query_value("need_notification"), Some("true"));
    assert_eq!(requests[1].method, Method::DELETE);
    assert_eq!(
        requests[1].url,
        format!("{BASE}/open-apis/wiki/v2/spaces/sp1/members/ou_1")
    );
    assert_eq!(
        requests[1].body,
        Some(json!({ "member_type": "openid", "member_role": "admin" }))
    );
}

#[tokio::test]
async fn get_node_by_document_token() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(ok(json!({ "node": { "node_token": "wik1", "obj_token": "doc1" } })));

    let client = client(&backend);
    let node = wiki(&client).get_node("doc1", Some("docx")).await.unwrap();
    assert_eq!(node.node_token.as_deref(), Some("wik1"));

    let request = &backend.requests()[0];
    assert_eq!(request.url, format!("{BASE}/open-apis/wiki/v2/spaces/get_node"));
    assert_eq!(request.query_value("token"), Some("doc1"));
    assert_eq!(request.query_value("obj_type"), Some("docx"));
}

#[tokio::test]
async fn move_docs_then_poll_task() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_json(ok(json!({ "task_id": "task-1" })))
        .push_json(ok(json!({
            "task": {
                "task_id": "task-1",
                "move_result": [{ "node": { "node_token": "wik9" }, "status": 0, "status_msg": "success" }],
            }
        })));

    let client = client(&backend);
    let body = MoveDocsToWikiBody {
        obj_type: "docx".into(),
        obj_token: "doc1".into(),
        ..Default::default()
    };
    let moved = wiki(&client).move_docs_to_wiki("sp1", &body).await.unwrap();
    assert_eq!(moved.wiki_token, None);
    let task_id = moved.task_id.unwrap();

    let task = wiki(&client).get_task(&task_id, "move").await.unwrap();
    assert_eq!(task.move_result.len(), 1);
    assert_eq!(task.move_result[0].status, Some(0));

    let requests = backend.requests();
    assert_eq!(
        requests[0].url,
        format!("{BASE}/open-apis/wiki/v2/spaces/sp1/nodes/move_docs_to_wiki")
    );
    assert_eq!(requests[1].url, format!("{BASE}/open-apis/wiki/v2/tasks/task-1"));
    assert_eq!(requests[1].query_value("task_type"), Some("move"));
}

#[tokio::test]
async fn search_nodes_iter_keeps_body_across_pages() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_json(ok(json!({ "items": [{ "node_id": "a" }], "has_more": true, "page_token": "s2" })))
        .push_json(ok(json!({ "items": [{ "node_id": "b" }], "has_more": false })));

    let client = client(&backend);
    let body = SearchNodesBody {
        query: "oncall".into(),
        space_id: Some("sp1".into()),
        node_id: None,
    };
    let found = collect_items(
        wiki(&client)
            .search_nodes_iter(&body, &PageQuery::new().with_page_size(1))
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(found.len(), 2);

    let requests = backend.requests();
    assert_eq!(requests[1].url, format!("{BASE}/open-apis/wiki/v1/nodes/search"));
    assert_eq!(requests[1].query_value("page_token"), Some("s2"));
    assert_eq!(requests[1].body, Some(json!({ "query": "oncall", "space_id": "sp1" })));
}

#[tokio::test]
async fn dangling_has_more_stops_iteration() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_json(ok(json!({ "items": [{ "space_id": "a" }], "has_more": true })));

    let client = client(&backend);
    let spaces = collect_items(wiki(&client).list_spaces_iter(&PageQuery::new(), None))
        .await
        .unwrap();
    assert_eq!(spaces.len(), 1);
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn first_page_failure_is_the_only_item() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_error(LarkError::Http("connection reset".into()));

    let client = client(&backend);
    let err = collect_items(wiki(&client).list_spaces_iter(&PageQuery::new(), None))
        .await
        .unwrap_err();
    assert!(matches!(err, LarkError::Http(_)));
}
