//! HTTP tests for proc_gateway.
//!
//! Each test serves a gateway on an ephemeral port and talks to it with a
//! real HTTP client.

use proc_gateway::{
    server, ExecutionResult, Gateway, OutputLimits, RootDescriptor, ToolDefinition,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Start a test server and return its base URL.
async fn start_test_server(gateway: Gateway, public_url: Option<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::serve(listener, Arc::new(gateway), public_url, std::future::pending())
            .await
            .unwrap();
    });
    format!("http://{addr}")
}

fn test_gateway(tmp: &TempDir) -> Gateway {
    Gateway::builder()
        .root(
            RootDescriptor::new(tmp.path().display().to_string(), "tmp")
                .with_description("scratch space")
                .with_keywords(["test"]),
        )
        .tool(ToolDefinition::exec("echo", "echo", &["-n"]).with_description("Echo arguments"))
        .tool(ToolDefinition::exec("cat", "cat", &[]).stdin_mode())
        .tool(ToolDefinition::exec("missing", "proc-gateway-missing-binary", &[]))
        .tool(ToolDefinition::list_roots("list_roots"))
        .limits(OutputLimits::new(1_000, 100))
        .build()
        .unwrap()
}

async fn post(base: &str, tool: &str, body: &str) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}/tools/{tool}"))
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_invoke_returns_uniform_shape() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(test_gateway(&tmp), None).await;

    let (status, body) = post(&base, "echo", r#"{"args": ["hi", "there"]}"#).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "code": 0, "out": "hi there", "err": "" }));

    let result: ExecutionResult = serde_json::from_value(body).unwrap();
    assert_eq!(
        result,
        ExecutionResult {
            exit_code: 0,
            stdout: "hi there".into(),
            stderr: String::new(),
        }
    );
}

#[tokio::test]
async fn test_empty_body_uses_default_root() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(test_gateway(&tmp), None).await;

    let (status, body) = post(&base, "echo", "").await;
    assert_eq!(status, 200);
    assert_eq!(body["code"], 0);
}

#[tokio::test]
async fn test_stdin_tool() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(test_gateway(&tmp), None).await;

    let (status, body) = post(&base, "cat", r#"{"input": "hello\n"}"#).await;
    assert_eq!(status, 200);
    assert_eq!(body["out"], "hello\n");
}

#[tokio::test]
async fn test_spawn_failure_is_http_200() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(test_gateway(&tmp), None).await;

    let (status, body) = post(&base, "missing", "{}").await;
    assert_eq!(status, 200);

    let result: ExecutionResult = serde_json::from_value(body).unwrap();
    assert!(result.is_spawn_failure());
    assert_eq!(result.stdout, "");
    assert!(!result.stderr.is_empty());
}

#[tokio::test]
async fn test_forbidden_root() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(test_gateway(&tmp), None).await;

    let (status, body) = post(&base, "echo", r#"{"root": "/etc"}"#).await;
    assert_eq!(status, 403);
    assert_eq!(body, json!({ "error": "root not allowed", "root": "/etc" }));
}

#[tokio::test]
async fn test_missing_root() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("project");
    std::fs::create_dir(&project).unwrap();
    let project_path = project.display().to_string();

    let gateway = Gateway::builder()
        .root(RootDescriptor::new(project_path.clone(), "project"))
        .tool(ToolDefinition::exec("echo", "echo", &[]))
        .build()
        .unwrap();
    let base = start_test_server(gateway, None).await;

    std::fs::remove_dir(&project).unwrap();

    let body = json!({ "root": project_path }).to_string();
    let (status, response) = post(&base, "echo", &body).await;
    assert_eq!(status, 404);
    assert_eq!(response, json!({ "error": "root does not exist", "root": project_path }));

    // Default root is the same missing directory
    let (status, response) = post(&base, "echo", "{}").await;
    assert_eq!(status, 500);
    assert_eq!(response["error"], "default root does not exist");
}

#[tokio::test]
async fn test_malformed_body() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("ran");
    let gateway = Gateway::builder()
        .root(RootDescriptor::new(tmp.path().display().to_string(), "tmp"))
        .tool(ToolDefinition::exec("touch", "touch", &["ran"]))
        .build()
        .unwrap();
    let base = start_test_server(gateway, None).await;

    let (status, body) = post(&base, "touch", r#"{"args": ["#).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().starts_with("malformed request"));
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_unknown_tool() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(test_gateway(&tmp), None).await;

    let (status, body) = post(&base, "rm", "{}").await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "error": "unknown tool", "tool": "rm" }));
}

#[tokio::test]
async fn test_list_roots() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(test_gateway(&tmp), None).await;

    let (status, body) = post(&base, "list_roots", "").await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "roots": [{
                "path": tmp.path().display().to_string(),
                "name": "tmp",
                "description": "scratch space",
                "keywords": ["test"]
            }]
        })
    );
}

#[tokio::test]
async fn test_openapi_document() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(test_gateway(&tmp), None).await;

    let doc: Value = reqwest::get(format!("{base}/openapi.json"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(doc["openapi"], "3.1.0");
    assert_eq!(doc["servers"][0]["url"], base);
    assert_eq!(doc["paths"].as_object().unwrap().len(), 4);
    assert_eq!(doc["paths"]["/tools/echo"]["post"]["summary"], "Echo arguments");
}

#[tokio::test]
async fn test_openapi_public_url() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(
        test_gateway(&tmp),
        Some("https://tools.example.test".to_string()),
    )
    .await;

    let doc: Value = reqwest::get(format!("{base}/openapi.json"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["servers"][0]["url"], "https://tools.example.test");
}

#[tokio::test]
async fn test_health() {
    let tmp = TempDir::new().unwrap();
    let base = start_test_server(test_gateway(&tmp), None).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}
