use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use lark_core::{collect_items, items, paginate, LarkError, Page, PageData};

fn page(items: &[i32], has_more: bool, token: Option<&str>) -> PageData<i32> {
    PageData {
        items: items.to_vec(),
        has_more,
        page_token: token.map(String::from),
        ..Default::default()
    }
}

/// Serves queued pages and records the cursor of every call.
struct Script {
    pages: Mutex<VecDeque<Result<PageData<i32>, LarkError>>>,
    cursors: Mutex<Vec<Option<String>>>,
}

impl Script {
    fn new(pages: Vec<Result<PageData<i32>, LarkError>>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into()),
            cursors: Mutex::new(Vec::new()),
        })
    }

    fn next(&self, cursor: Option<String>) -> Result<PageData<i32>, LarkError> {
        self.cursors.lock().unwrap().push(cursor);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LarkError::Http("script exhausted".into())))
    }

    fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }
}

fn stream_of(script: Arc<Script>) -> lark_core::PageStream<'static, PageData<i32>> {
    paginate(move |cursor| {
        let script = script.clone();
        async move { script.next(cursor) }
    })
}

// ── Page trait ───────────────────────────────────────────────────────────────

#[test]
fn next_token_prefers_page_token() {
    let p = PageData::<i32> {
        has_more: true,
        page_token: Some("a".into()),
        next_page_token: Some("b".into()),
        ..Default::default()
    };
    assert_eq!(p.next_page_token().as_deref(), Some("a"));
}

#[test]
fn next_token_falls_back_to_next_page_token() {
    let p = PageData::<i32> {
        has_more: true,
        page_token: Some(String::new()),
        next_page_token: Some("b".into()),
        ..Default::default()
    };
    assert_eq!(p.next_page_token().as_deref(), Some("b"));
}

#[test]
fn no_next_token_when_has_more_false() {
    let p = page(&[1], false, Some("ignored"));
    assert_eq!(p.next_page_token(), None);
}

#[test]
fn page_data_deserializes_with_missing_fields() {
    let p: PageData<i32> = serde_json::from_value(serde_json::json!({})).unwrap();
    assert!(p.items.is_empty());
    assert!(!p.has_more);
}

// ── paginate ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn walks_all_pages_passing_cursors() {
    let script = Script::new(vec![
        Ok(page(&[1, 2], true, Some("t1"))),
        Ok(page(&[3], true, Some("t2"))),
        Ok(page(&[4], false, None)),
    ]);
    let all = collect_items(stream_of(script.clone())).await.unwrap();
    assert_eq!(all, vec![1, 2, 3, 4]);
    assert_eq!(
        script.cursors(),
        vec![None, Some("t1".to_string()), Some("t2".to_string())]
    );
}

#[tokio::test]
async fn is_lazy() {
    let script = Script::new(vec![
        Ok(page(&[1], true, Some("t1"))),
        Ok(page(&[2], false, None)),
    ]);
    let mut stream = stream_of(script.clone());
    assert!(script.cursors().is_empty(), "nothing fetched before polling");
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.items, vec![1]);
    assert_eq!(script.cursors().len(), 1);
}

#[tokio::test]
async fn yields_error_then_ends() {
    let script = Script::new(vec![
        Ok(page(&[1], true, Some("t1"))),
        Err(LarkError::Api {
            code: 1254002,
            msg: "fail".into(),
            log_id: None,
        }),
        Ok(page(&[99], false, None)),
    ]);
    let results: Vec<_> = stream_of(script.clone()).collect().await;
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().code(), Some(1254002));
    assert_eq!(script.cursors().len(), 2);
}

#[tokio::test]
async fn stops_when_has_more_without_cursor() {
    let script = Script::new(vec![
        Ok(page(&[1], true, None)),
        Ok(page(&[2], false, None)),
    ]);
    let all = collect_items(stream_of(script.clone())).await.unwrap();
    assert_eq!(all, vec![1]);
    assert_eq!(script.cursors().len(), 1);
}

#[tokio::test]
async fn empty_first_page() {
    let script = Script::new(vec![Ok(page(&[], false, None))]);
    let pages: Vec<_> = stream_of(script).collect().await;
    assert_eq!(pages.len(), 1);
    assert!(pages[0].as_ref().unwrap().items.is_empty());
}

#[tokio::test]
async fn items_flattens_and_propagates_error() {
    let script = Script::new(vec![
        Ok(page(&[1, 2], true, Some("t1"))),
        Err(LarkError::Http("boom".into())),
    ]);
    let out: Vec<_> = items(stream_of(script)).collect().await;
    assert_eq!(out.len(), 3);
    assert_eq!(*out[0].as_ref().unwrap(), 1);
    assert_eq!(*out[1].as_ref().unwrap(), 2);
    assert!(matches!(out[2], Err(LarkError::Http(_))));
}

#[tokio::test]
async fn collect_items_fails_on_error() {
    let script = Script::new(vec![Err(LarkError::Timeout("slow".into()))]);
    let err = collect_items(stream_of(script)).await.unwrap_err();
    assert!(matches!(err, LarkError::Timeout(_)));
}
