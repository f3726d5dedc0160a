//! Registry integration tests: tool call → compile → authorize → HTTP
//! round-trip against an in-process mock Polaris server.

use axum::body::Bytes;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::post;
use axum::Router;
use polaris_tools::auth::EnvCredentialSource;
use polaris_tools::tools::{ToolRegistry, POLICY_TOOL, PRINCIPAL_TOOL, TABLE_TOOL};
use polaris_tools::Config;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

impl Recorded {
    fn header(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Mock Polaris: an OAuth token route plus a catch-all recorder for the
/// REST surfaces. Catalog responses are popped from `responses`, falling
/// back to `200 {"ok": true}`.
#[derive(Debug)]
struct MockPolaris {
    token_status: StatusCode,
    token_calls: AtomicUsize,
    token_realms: Mutex<Vec<Option<String>>>,
    responses: Mutex<VecDeque<(StatusCode, String)>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockPolaris {
    fn new(token_status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            token_status,
            token_calls: AtomicUsize::new(0),
            token_realms: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn respond(&self, status: StatusCode, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

async fn issue_token(
    State(mock): State<Arc<MockPolaris>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, String) {
    let n = mock.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let realm = headers
        .get("polaris-realm")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    mock.token_realms.lock().unwrap().push(realm);

    if mock.token_status != StatusCode::OK {
        return (mock.token_status, "bad client".to_string());
    }
    let body = json!({
        "access_token": format!("tok-{n}-{}", form["client_id"]),
        "expires_in": 3600,
    });
    (StatusCode::OK, body.to_string())
}

async fn record(
    State(mock): State<Arc<MockPolaris>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    mock.requests.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });
    mock.responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| (StatusCode::OK, r#"{"ok":true}"#.to_string()))
}

/// Helper: serve a mock on a random port and build a registry from
/// `POLARIS_*` variables pointing at it.
async fn start(mock: Arc<MockPolaris>, extra: &[(&str, &str)]) -> ToolRegistry {
    let app = Router::new()
        .route("/api/catalog/v1/oauth/tokens", post(issue_token))
        .fallback(record)
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let mut vars: HashMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.insert("POLARIS_BASE_URL".to_string(), format!("http://{addr}"));
    vars.insert(
        "POLARIS_HTTP_RETRIES_BACKOFF_FACTOR".to_string(),
        "0.001".to_string(),
    );

    let config = Config::from_vars(&vars).unwrap();
    ToolRegistry::from_config(&config, Arc::new(EnvCredentialSource::new(vars))).unwrap()
}

const CLIENT_CREDENTIALS: &[(&str, &str)] = &[
    ("POLARIS_CLIENT_ID", "root"),
    ("POLARIS_CLIENT_SECRET", "s3cret"),
];

// =============================================================================
// Client credentials
// =============================================================================

#[tokio::test]
async fn test_table_list_round_trip() {
    let mock = MockPolaris::new(StatusCode::OK);
    let registry = start(mock.clone(), CLIENT_CREDENTIALS).await;
    mock.respond(StatusCode::OK, r#"{"identifiers":[{"namespace":["analytics","daily"],"name":"events"}]}"#);

    let arguments = json!({
        "operation": "LS",
        "catalog": "prod west",
        "namespace": ["  analytics", "daily "],
        "query": {"page-size": "200", "tags": ["a", "b"]},
        "headers": {"X-Trace": "t-1"},
        "realm": "west",
    });
    let result = registry.call_tool(TABLE_TOOL, &arguments).await.unwrap();
    assert!(!result.is_error);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::GET);
    assert_eq!(
        request.path,
        "/api/catalog/v1/prod%20west/namespaces/analytics%1Fdaily/tables"
    );
    assert_eq!(request.query.as_deref(), Some("page-size=200&tags=a&tags=b"));
    assert_eq!(request.header("x-trace"), vec!["t-1"]);
    assert_eq!(request.header("authorization"), vec!["Bearer tok-1-root"]);
    assert_eq!(request.header("polaris-realm"), vec!["west"]);

    let meta = result.metadata.clone().unwrap();
    assert_eq!(meta["method"], "GET");
    assert_eq!(meta["status"], 200);
    assert_eq!(meta["response"]["identifiers"][0]["name"], "events");
    assert!(meta["url"].as_str().unwrap().ends_with("tables?page-size=200&tags=a&tags=b"));

    let structured = result.structured();
    assert_eq!(structured["isError"], false);
    assert!(result.text.contains("\"events\""));
}

#[tokio::test]
async fn test_token_reused_per_realm() {
    let mock = MockPolaris::new(StatusCode::OK);
    let registry = start(mock.clone(), CLIENT_CREDENTIALS).await;

    let arguments = json!({"operation": "list", "realm": "west"});
    registry.call_tool(PRINCIPAL_TOOL, &arguments).await.unwrap();
    registry.call_tool(PRINCIPAL_TOOL, &arguments).await.unwrap();
    registry
        .call_tool(PRINCIPAL_TOOL, &json!({"operation": "list"}))
        .await
        .unwrap();

    assert_eq!(mock.token_calls(), 2);
    assert_eq!(
        *mock.token_realms.lock().unwrap(),
        vec![Some("west".to_string()), None]
    );

    let requests = mock.requests();
    assert_eq!(requests[0].path, "/api/management/v1/principals");
    assert_eq!(requests[1].header("authorization"), vec!["Bearer tok-1-root"]);
    assert_eq!(requests[2].header("authorization"), vec!["Bearer tok-2-root"]);
    assert!(requests[2].header("polaris-realm").is_empty());
}

#[tokio::test]
async fn test_token_failure_is_error_result() {
    let mock = MockPolaris::new(StatusCode::UNAUTHORIZED);
    let registry = start(mock.clone(), CLIENT_CREDENTIALS).await;

    let result = registry
        .call_tool_result(PRINCIPAL_TOOL, &json!({"operation": "list"}))
        .await;
    assert!(result.is_error);
    assert_eq!(result.text, "OAuth token endpoint returned 401: bad client");
    assert_eq!(result.metadata, Some(json!({"kind": "TOKEN_EXCHANGE"})));
    assert!(mock.requests().is_empty());
}

// =============================================================================
// Static token and response handling
// =============================================================================

#[tokio::test]
async fn test_policy_attach_sends_body_on_policy_api() {
    let mock = MockPolaris::new(StatusCode::OK);
    let registry = start(mock.clone(), &[("POLARIS_API_TOKEN", "static-1")]).await;
    mock.respond(StatusCode::NO_CONTENT, "");

    let target = json!({"target": {"type": "catalog"}, "parameters": {}});
    let result = registry
        .call_tool(
            POLICY_TOOL,
            &json!({
                "operation": "attach",
                "catalog": "prod",
                "namespace": "ops",
                "policy": "compaction",
                "body": target,
            }),
        )
        .await
        .unwrap();
    assert!(!result.is_error);
    assert_eq!(result.text, "204 No Content");

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::PUT);
    assert_eq!(
        request.path,
        "/api/catalog/polaris/v1/prod/namespaces/ops/policies/compaction/mappings"
    );
    assert_eq!(request.header("authorization"), vec!["Bearer static-1"]);
    assert_eq!(request.header("content-type"), vec!["application/json"]);
    assert_eq!(request.json(), target);
    assert_eq!(mock.token_calls(), 0);
}

#[tokio::test]
async fn test_caller_realm_header_wins() {
    let mock = MockPolaris::new(StatusCode::OK);
    let registry = start(mock.clone(), &[]).await;

    registry
        .call_tool(
            PRINCIPAL_TOOL,
            &json!({
                "operation": "get",
                "principal": "svc",
                "realm": "west",
                "headers": {"Polaris-Realm": "east"},
            }),
        )
        .await
        .unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.header("polaris-realm"), vec!["east"]);
    assert!(request.header("authorization").is_empty());
}

#[tokio::test]
async fn test_retries_retryable_status() {
    let mock = MockPolaris::new(StatusCode::OK);
    let registry = start(mock.clone(), &[]).await;
    mock.respond(StatusCode::TOO_MANY_REQUESTS, "slow down");
    mock.respond(StatusCode::CONFLICT, r#"{"error":{"code":409}}"#);

    let result = registry
        .call_tool(PRINCIPAL_TOOL, &json!({"operation": "list"}))
        .await
        .unwrap();
    assert!(!result.is_error);
    assert_eq!(mock.requests().len(), 3);
    assert_eq!(result.metadata.unwrap()["response"], json!({"ok": true}));
}

#[tokio::test]
async fn test_error_status_is_error_result() {
    let mock = MockPolaris::new(StatusCode::OK);
    let registry = start(mock.clone(), &[]).await;
    mock.respond(
        StatusCode::NOT_FOUND,
        r#"{"error":{"message":"Table does not exist: events","code":404}}"#,
    );

    let result = registry
        .call_tool(
            TABLE_TOOL,
            &json!({
                "operation": "get",
                "catalog": "prod",
                "namespace": "analytics",
                "table": "events",
            }),
        )
        .await
        .unwrap();
    assert!(result.is_error);
    assert!(result.text.contains("Table does not exist: events"));
    assert_eq!(result.metadata.as_ref().unwrap()["status"], 404);
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn test_validation_failure_sends_nothing() {
    let mock = MockPolaris::new(StatusCode::OK);
    let registry = start(mock.clone(), CLIENT_CREDENTIALS).await;

    let result = registry
        .call_tool_result(
            TABLE_TOOL,
            &json!({"operation": "commit", "catalog": "prod", "namespace": "analytics", "table": "t1"}),
        )
        .await;
    assert!(result.is_error);
    assert!(result.text.starts_with("Commit operations require"));
    assert_eq!(mock.token_calls(), 0);
    assert!(mock.requests().is_empty());
}
