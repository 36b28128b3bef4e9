//! HTTP-level tests for the blocking client.
//!
//! Uses wiremock to mock the infrastructure API. The client is blocking, so
//! each call runs on tokio's blocking pool.

use infrapi::{
    verbs, Create, CreateVolumeParams, Delete, FilterOp, Get, InfraClient, InfraError, Instance,
    List, RequestParams, SortDirection, Volume,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run blocking client code off the async test runtime.
async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

fn instance_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("web-{id}"),
        "status": "running",
        "flavor": "g2.small"
    })
}

fn page_json(ids: &[&str], total: u64, current_page: u32, per_page: u32) -> serde_json::Value {
    json!({
        "data": ids.iter().map(|id| instance_json(id)).collect::<Vec<_>>(),
        "meta": {"pagination": {
            "total": total,
            "count": ids.len(),
            "per_page": per_page,
            "current_page": current_page,
            "total_pages": total.div_ceil(u64::from(per_page))
        }}
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instances/i-1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": instance_json("i-1")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let instance = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Instance::get(&client, "i-1".to_string())
    })
    .await
    .unwrap();

    assert_eq!(instance.name, "web-i-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_base_url_path_is_kept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/instances/i-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": instance_json("i-1")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let uri = format!("{}/v1", mock_server.uri());
    let result = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Instance::get(&client, "i-1".to_string())
    })
    .await;

    assert!(result.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_query_string_reaches_the_wire_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instances"))
        .and(query_param("filter[status][in]", "running,stopped"))
        .and(query_param("sort", "-created_at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["i-1"], 1, 1, 100)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let page = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        let mut params = RequestParams::new();
        params
            .add_filter("status", FilterOp::In, ["running", "stopped"])
            .add_sort("created_at", SortDirection::Desc);
        Instance::list_page(&client, &params)
    })
    .await
    .unwrap();

    assert_eq!(page.len(), 1);
    assert!(!page.has_more);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("filter[status][in]=running,stopped&sort=-created_at&page=1&per_page=100")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_all_fetches_every_page_in_order() {
    let mock_server = MockServer::start().await;

    for (page, ids) in [(1, vec!["i-1", "i-2"]), (2, vec!["i-3", "i-4"]), (3, vec!["i-5"])] {
        Mock::given(method("GET"))
            .and(path("/instances"))
            .and(query_param("page", page.to_string()))
            .and(query_param("per_page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&ids, 5, page, 2)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let uri = mock_server.uri();
    let all = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Instance::list_all(&client, &RequestParams::new().with_page(1, 2))
    })
    .await
    .unwrap();

    let ids: Vec<_> = all.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["i-1", "i-2", "i-3", "i-4", "i-5"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_all_fails_whole_walk_on_page_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instances"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["i-1", "i-2"], 4, 1, 2)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/instances"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let err = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Instance::list_all(&client, &RequestParams::new().with_page(1, 2))
    })
    .await
    .unwrap_err();

    match err {
        InfraError::ApiError { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "HTTP 503");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_found_maps_to_domain_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/volumes/vol-9"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"errors": [{"code": "not_found", "message": "no such volume"}]})),
        )
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let err = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Volume::get(&client, "vol-9".to_string())
    })
    .await
    .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "volume 'vol-9' not found");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rate_limit_reports_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instances"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let err = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Instance::list_page(&client, &RequestParams::new())
    })
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        InfraError::RateLimited {
            retry_after_secs: Some(30)
        }
    ));
    assert_eq!(err.status_code(), Some(429));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_message_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": [{"code": "invalid", "message": "size_gb must be at least 1", "field": "size_gb"}]
        })))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let err = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Volume::create(
            &client,
            CreateVolumeParams {
                name: "empty".to_string(),
                size_gb: 0,
                ..Default::default()
            },
        )
    })
    .await
    .unwrap_err();

    match err {
        InfraError::ApiError { status, message } => {
            assert_eq!(status, 422);
            assert!(message.contains("size_gb must be at least 1"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_posts_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/volumes"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "data", "size_gb": 50, "instance_id": "i-1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {
            "id": "vol-1", "name": "data", "size_gb": 50, "status": "attached", "instance_id": "i-1"
        }})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let volume = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Volume::create(
            &client,
            CreateVolumeParams {
                name: "data".to_string(),
                size_gb: 50,
                region: None,
                instance_id: Some("i-1".to_string()),
            },
        )
    })
    .await
    .unwrap();

    assert!(volume.is_attached());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_accepts_empty_204() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/instances/i-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Instance::delete(&client, "i-1".to_string())
    })
    .await;

    assert!(result.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_payload_and_server_errors_both_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instances/i-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": instance_json("i-1"),
            "errors": ["metrics unavailable"]
        })))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let (typed, raw) = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        let typed = Instance::get(&client, "i-1".to_string());
        let raw = verbs::fetch::<Instance, _, _>(
            &client,
            "instances/i-1",
            &RequestParams::new(),
            infrapi::handler::passthrough(),
        );
        (typed, raw)
    })
    .await;

    assert!(matches!(typed, Err(InfraError::Server(ref errors)) if errors.len() == 1));

    let (instance, errors) = raw.unwrap().into_parts();
    assert_eq!(instance.id, "i-1");
    assert_eq!(errors[0].message, "metrics unavailable");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_payload_shape_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instances/i-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [instance_json("i-1")]})))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let err = blocking(move || {
        let client = InfraClient::new("test-token", &uri).unwrap();
        Instance::get(&client, "i-1".to_string())
    })
    .await
    .unwrap_err();

    assert!(err.is_decode());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connection_failure_is_transport_error() {
    let err = blocking(|| {
        let client = InfraClient::new("test-token", "http://127.0.0.1:1").unwrap();
        Instance::get(&client, "i-1".to_string())
    })
    .await
    .unwrap_err();

    assert!(matches!(err, InfraError::HttpError(_)));
    assert_eq!(err.status_code(), None);
}
