//! End-to-end crawl tests
//!
//! These tests run the full orchestrator against wiremock HTTP servers
//! using the static rendering engine.

use gleaner::config::CrawlConfig;
use gleaner::output::FieldValue;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(json: serde_json::Value) -> CrawlConfig {
    serde_json::from_value(json).expect("test config must deserialize")
}

fn html_response(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_response(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_page_without_navigation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
                <h1>Front Page</h1>
                <li class="tag">a</li><li class="tag">b</li>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(serde_json::json!({
        "start_url": format!("{}/", server.uri()),
        "engine": "static",
        "extractors": [
            { "field_name": "title", "selector": "h1" },
            { "field_name": "tags", "selector": ".tag", "multiple": true }
        ],
        "wait_config": { "delay_between_requests": 0 },
        "context": { "job": "smoke" }
    }));

    let result = gleaner::execute(&config).await;

    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(result.total_items, 1);
    assert_eq!(result.data.len(), 1);
    assert!(result.next_page_url.is_none());
    assert_eq!(
        result.data[0].get("title"),
        Some(&FieldValue::Single(Some("Front Page".to_string())))
    );
    assert_eq!(
        result.data[0].get("tags"),
        Some(&FieldValue::Multiple(vec!["a".to_string(), "b".to_string()]))
    );
    assert_eq!(result.context.get("job"), Some(&serde_json::json!("smoke")));
}

#[tokio::test]
async fn test_no_match_yields_null_and_empty_list() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><body><p>nothing here</p></body></html>").await;

    let config = config(serde_json::json!({
        "start_url": format!("{}/", server.uri()),
        "engine": "static",
        "extractors": [
            { "field_name": "single", "selector": ".absent" },
            { "field_name": "many", "selector": ".absent", "multiple": true }
        ],
        "wait_config": { "delay_between_requests": 0 }
    }));

    let result = gleaner::execute(&config).await;

    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(result.data[0].get("single"), Some(&FieldValue::Single(None)));
    assert_eq!(
        result.data[0].get("many"),
        Some(&FieldValue::Multiple(vec![]))
    );
}

#[tokio::test]
async fn test_broken_detail_link_leaves_neighbors_intact() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/list",
        r#"<html><body>
            <div class="item"><a href="/d1">one</a></div>
            <div class="item"><a href="/d2">two</a></div>
            <div class="item"><a href="/d3">three</a></div>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/d1",
        "<html><body><h1>First Detail</h1></body></html>",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/d2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/d3",
        "<html><body><h1>Third Detail</h1></body></html>",
    )
    .await;

    let config = config(serde_json::json!({
        "start_url": format!("{}/list", server.uri()),
        "engine": "static",
        "navigation": {
            "list_items_selector": ".item",
            "detail_link_selector": "a"
        },
        "extractors": [ { "field_name": "title", "selector": "h1" } ],
        "wait_config": { "delay_between_requests": 0 }
    }));

    let result = gleaner::execute(&config).await;

    assert!(result.success);
    assert_eq!(result.total_items, 2);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("404"));
    assert_eq!(
        result.data[0].get("title"),
        Some(&FieldValue::Single(Some("First Detail".to_string())))
    );
    assert_eq!(
        result.data[1].get("title"),
        Some(&FieldValue::Single(Some("Third Detail".to_string())))
    );
}

#[tokio::test]
async fn test_unreachable_start_url_is_fatal() {
    let config = config(serde_json::json!({
        "start_url": "http://127.0.0.1:9/",
        "engine": "static",
        "extractors": [ { "field_name": "title", "selector": "h1" } ],
        "wait_config": { "page_load_timeout": 2, "delay_between_requests": 0 }
    }));

    let result = gleaner::execute(&config).await;

    assert!(!result.success);
    assert!(result.data.is_empty());
    assert_eq!(result.total_items, 0);
    assert!(!result.errors.is_empty());
}

fn list_page_body(page: u32, with_next: bool) -> String {
    let next = if with_next {
        format!(r#"<a class="next" href="/page/{}">next</a>"#, page + 1)
    } else {
        String::new()
    };
    format!(
        r#"<html><body>
            <div class="item"><span class="name">p{}-a</span></div>
            <div class="item"><span class="name">p{}-b</span></div>
            {}
        </body></html>"#,
        page, page, next
    )
}

#[tokio::test]
async fn test_max_pages_surfaces_next_page_url() {
    let server = MockServer::start().await;

    // Five pages exist; the crawl is capped at two.
    for page in 1..=5u32 {
        let expected: u64 = match page {
            1 | 2 => 1,
            _ => 0,
        };
        Mock::given(method("GET"))
            .and(path(format!("/page/{}", page)))
            .respond_with(html_response(list_page_body(page, page < 5)))
            .expect(expected)
            .mount(&server)
            .await;
    }

    let config = config(serde_json::json!({
        "start_url": format!("{}/page/1", server.uri()),
        "engine": "static",
        "navigation": { "list_items_selector": ".item" },
        "extractors": [ { "field_name": "name", "selector": ".name" } ],
        "pagination": {
            "enabled": true,
            "next_page_selector": "a.next",
            "max_pages": 2
        },
        "wait_config": { "delay_between_requests": 0 }
    }));

    let result = gleaner::execute(&config).await;

    assert!(result.success);
    assert_eq!(result.total_items, 4);
    assert_eq!(
        result.next_page_url.as_deref(),
        Some(format!("{}/page/3", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_pagination_disabled_visits_one_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page/1"))
        .respond_with(html_response(list_page_body(1, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page/2"))
        .respond_with(html_response(list_page_body(2, false)))
        .expect(0)
        .mount(&server)
        .await;

    let config = config(serde_json::json!({
        "start_url": format!("{}/page/1", server.uri()),
        "engine": "static",
        "navigation": { "list_items_selector": ".item" },
        "extractors": [ { "field_name": "name", "selector": ".name" } ],
        "wait_config": { "delay_between_requests": 0 }
    }));

    let result = gleaner::execute(&config).await;

    assert!(result.success);
    assert_eq!(result.total_items, 2);
    assert!(result.next_page_url.is_none());
}

#[tokio::test]
async fn test_pagination_runs_until_exhausted() {
    let server = MockServer::start().await;
    mount_page(&server, "/page/1", list_page_body(1, true)).await;
    mount_page(&server, "/page/2", list_page_body(2, false)).await;

    let config = config(serde_json::json!({
        "start_url": format!("{}/page/1", server.uri()),
        "engine": "static",
        "navigation": { "list_items_selector": ".item" },
        "extractors": [ { "field_name": "name", "selector": ".name" } ],
        "pagination": { "enabled": true, "next_page_selector": "a.next" },
        "wait_config": { "delay_between_requests": 0 }
    }));

    let result = gleaner::execute(&config).await;

    assert!(result.success);
    assert_eq!(result.total_items, 4);
    assert!(result.next_page_url.is_none());
    assert_eq!(
        result.data[3].get("name"),
        Some(&FieldValue::Single(Some("p2-b".to_string())))
    );
}

#[tokio::test]
async fn test_same_config_twice_is_idempotent() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
            <div class="item"><span class="name">alpha</span></div>
            <div class="item"><span class="name">beta</span></div>
        </body></html>"#,
    )
    .await;

    let config = config(serde_json::json!({
        "start_url": format!("{}/", server.uri()),
        "engine": "static",
        "navigation": { "list_items_selector": ".item" },
        "extractors": [
            { "field_name": "name", "selector": ".name" },
            { "field_name": "missing", "selector": ".absent" }
        ],
        "wait_config": { "delay_between_requests": 0 }
    }));

    let first = gleaner::execute(&config).await;
    let second = gleaner::execute(&config).await;

    assert!(first.success && second.success);
    assert_eq!(first.data, second.data);
    assert_eq!(first.total_items, second.total_items);
}
