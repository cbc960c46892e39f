//! API integration tests.
//!
//! Tests the complete request flow: HTTP → routes → registry → storage.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use bytes::Bytes;
use serde_json::json;
use tower::ServiceExt;

use atelier_api::config::Config;
use atelier_api::server::Server;
use atelier_core::{MemoryBackend, StorageBackend};

fn test_server() -> (Arc<MemoryBackend>, axum::Router) {
    let backend = Arc::new(MemoryBackend::new());
    let server = Server::with_storage_backend(Config::default(), backend.clone());
    let router = server.test_router();
    (backend, router)
}

mod helpers {
    use super::*;
    use serde::de::DeserializeOwned;

    pub fn make_request(
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Request<Body>> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        let body = match body {
            Some(v) => Body::from(serde_json::to_vec(&v).context("serialize request body")?),
            None => Body::empty(),
        };

        builder.body(body).context("build request")
    }

    async fn send(
        router: axum::Router,
        request: Request<Body>,
    ) -> Result<axum::response::Response> {
        let response = router
            .oneshot(request)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        Ok(response)
    }

    async fn response_body(
        response: axum::response::Response,
    ) -> Result<(StatusCode, axum::body::Bytes)> {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .context("read response body")?;
        Ok((status, body))
    }

    pub async fn get_json<T: DeserializeOwned>(
        router: axum::Router,
        uri: &str,
    ) -> Result<(StatusCode, T)> {
        let request = make_request(Method::GET, uri, None)?;
        let response = send(router, request).await?;
        let (status, body) = response_body(response).await?;
        let json = serde_json::from_slice(&body).with_context(|| {
            format!(
                "parse JSON response (status={status}): {}",
                String::from_utf8_lossy(&body)
            )
        })?;
        Ok((status, json))
    }

    pub async fn post_json<T: DeserializeOwned>(
        router: axum::Router,
        uri: &str,
        body: serde_json::Value,
    ) -> Result<(StatusCode, T)> {
        let request = make_request(Method::POST, uri, Some(body))?;
        let response = send(router, request).await?;
        let (status, body) = response_body(response).await?;
        let json = serde_json::from_slice(&body).with_context(|| {
            format!(
                "parse JSON response (status={status}): {}",
                String::from_utf8_lossy(&body)
            )
        })?;
        Ok((status, json))
    }
}

#[tokio::test]
async fn health_returns_ok() -> Result<()> {
    let (_backend, router) = test_server();

    let (status, body): (_, serde_json::Value) = helpers::get_json(router, "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn ready_reports_storage_reachable() -> Result<()> {
    let (_backend, router) = test_server();

    let (status, body): (_, serde_json::Value) = helpers::get_json(router, "/ready").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    Ok(())
}

#[tokio::test]
async fn create_then_list_returns_exactly_one_record() -> Result<()> {
    let (backend, router) = test_server();

    let (status, body): (_, serde_json::Value) = helpers::post_json(
        router.clone(),
        "/create-project",
        json!({"folder": "demo", "name": "Demo", "file": "demo.json", "content": "{\"a\":1}"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Created demo.json");

    // The document holds the written content byte-for-byte.
    let stored = backend.get("json/demo.json").await?;
    assert_eq!(stored, Bytes::from("{\"a\":1}"));

    let (status, body): (_, serde_json::Value) =
        helpers::get_json(router, "/api/projects").await?;
    assert_eq!(status, StatusCode::OK);
    let projects = body["projects"].as_array().context("projects array")?;
    assert_eq!(projects.len(), 1);
    assert_eq!(
        projects[0],
        json!({"folder": "demo", "name": "Demo", "file": "demo.json"})
    );
    Ok(())
}

#[tokio::test]
async fn repeat_create_overwrites_content_without_duplicating_entries() -> Result<()> {
    let (backend, router) = test_server();

    for content in ["{\"v\":1}", "{\"v\":2}"] {
        let (status, _): (_, serde_json::Value) = helpers::post_json(
            router.clone(),
            "/create-project",
            json!({"file": "demo.json", "content": content}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
    }

    let stored = backend.get("json/demo.json").await?;
    assert_eq!(stored, Bytes::from("{\"v\":2}"));

    let (_, body): (_, serde_json::Value) = helpers::get_json(router, "/api/projects").await?;
    assert_eq!(body["projects"].as_array().context("projects")?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn create_with_missing_fields_returns_400() -> Result<()> {
    let (backend, router) = test_server();

    for body in [
        json!({"content": "{}"}),
        json!({"file": "a.json"}),
        json!({"file": "", "content": "{}"}),
        json!({"file": "a.json", "content": ""}),
    ] {
        let (status, response): (_, serde_json::Value) =
            helpers::post_json(router.clone(), "/create-project", body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "file and content are required");
    }

    assert!(backend.list("json/").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_rejects_path_traversal_file_names() -> Result<()> {
    let (backend, router) = test_server();

    let (status, _): (_, serde_json::Value) = helpers::post_json(
        router,
        "/create-project",
        json!({"file": "../escape.json", "content": "{}"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(backend.list("json/").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn save_writes_formatted_payload_and_returns_path() -> Result<()> {
    let (backend, router) = test_server();

    let (status, body): (_, serde_json::Value) = helpers::post_json(
        router.clone(),
        "/api/save",
        json!({"folder": "scenes", "project": "Intro", "fileName": "intro.json", "payload": {"nodes": [1, 2]}}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "json/intro.json");

    let stored = backend.get("json/intro.json").await?;
    let text = std::str::from_utf8(&stored)?;
    assert!(text.contains('\n'), "payload should be pretty-printed");
    let parsed: serde_json::Value = serde_json::from_str(text)?;
    assert_eq!(parsed, json!({"nodes": [1, 2]}));

    let (_, body): (_, serde_json::Value) = helpers::get_json(router, "/api/projects").await?;
    assert_eq!(
        body["projects"][0],
        json!({"folder": "scenes", "name": "Intro", "file": "intro.json"})
    );
    Ok(())
}

#[tokio::test]
async fn save_with_missing_payload_returns_400() -> Result<()> {
    let (_backend, router) = test_server();

    for body in [
        json!({"fileName": "a.json"}),
        json!({"fileName": "a.json", "payload": null}),
        json!({"payload": {"x": 1}}),
    ] {
        let (status, response): (_, serde_json::Value) =
            helpers::post_json(router.clone(), "/api/save", body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "fileName and payload are required");
    }
    Ok(())
}

#[tokio::test]
async fn delete_of_unknown_file_succeeds_and_keeps_manifest() -> Result<()> {
    let (backend, router) = test_server();

    let (status, _): (_, serde_json::Value) = helpers::post_json(
        router.clone(),
        "/create-project",
        json!({"file": "keep.json", "content": "{}"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let manifest_before = backend.get("manifest.json").await?;

    let (status, body): (_, serde_json::Value) =
        helpers::post_json(router, "/api/delete", json!({"file": "ghost.json"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted ghost.json");

    assert_eq!(backend.get("manifest.json").await?, manifest_before);
    Ok(())
}

#[tokio::test]
async fn delete_with_missing_file_returns_400() -> Result<()> {
    let (_backend, router) = test_server();

    let (status, response): (_, serde_json::Value) =
        helpers::post_json(router, "/api/delete", json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "file is required");
    Ok(())
}

#[tokio::test]
async fn orphan_document_is_listed_with_sandbox_defaults() -> Result<()> {
    let (backend, router) = test_server();

    // A document dropped into the store outside the API.
    backend
        .put("json/rogue.json", Bytes::from("{}"))
        .await?;

    let (status, body): (_, serde_json::Value) =
        helpers::get_json(router, "/api/projects").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["projects"][0],
        json!({"folder": "sandbox", "name": "rogue", "file": "rogue.json"})
    );
    Ok(())
}

#[tokio::test]
async fn stale_manifest_entry_survives_until_explicit_delete() -> Result<()> {
    let (backend, router) = test_server();

    // A manifest entry whose document was removed outside the API.
    backend
        .put(
            "manifest.json",
            Bytes::from(
                serde_json::to_vec(&json!([
                    {"folder": "demo", "name": "Gone", "file": "gone.json"}
                ]))?,
            ),
        )
        .await?;

    let (_, body): (_, serde_json::Value) =
        helpers::get_json(router.clone(), "/api/projects").await?;
    let projects = body["projects"].as_array().context("projects")?;
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["file"], "gone.json");

    let (status, _): (_, serde_json::Value) =
        helpers::post_json(router.clone(), "/api/delete", json!({"file": "gone.json"})).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body): (_, serde_json::Value) = helpers::get_json(router, "/api/projects").await?;
    assert!(body["projects"].as_array().context("projects")?.is_empty());
    Ok(())
}

#[tokio::test]
async fn folders_lists_each_distinct_value_once() -> Result<()> {
    let (_backend, router) = test_server();

    for (folder, file) in [
        (Some("demo"), "a.json"),
        (Some("demo"), "b.json"),
        (None, "c.json"),
    ] {
        let mut body = json!({"file": file, "content": "{}"});
        if let Some(folder) = folder {
            body["folder"] = json!(folder);
        }
        let (status, _): (_, serde_json::Value) =
            helpers::post_json(router.clone(), "/create-project", body).await?;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body): (_, serde_json::Value) = helpers::get_json(router, "/api/folders").await?;
    assert_eq!(status, StatusCode::OK);
    let mut folders: Vec<String> = serde_json::from_value(body["folders"].clone())?;
    folders.sort();
    assert_eq!(folders, vec!["demo", "sandbox"]);
    Ok(())
}

#[tokio::test]
async fn demo_project_lifecycle() -> Result<()> {
    let (backend, router) = test_server();

    let (status, _): (_, serde_json::Value) = helpers::post_json(
        router.clone(),
        "/create-project",
        json!({"folder": "demo", "name": "Demo", "file": "demo.json", "content": "{}"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body): (_, serde_json::Value) =
        helpers::get_json(router.clone(), "/api/projects").await?;
    assert!(body["projects"]
        .as_array()
        .context("projects")?
        .contains(&json!({"folder": "demo", "name": "Demo", "file": "demo.json"})));

    let (status, _): (_, serde_json::Value) =
        helpers::post_json(router.clone(), "/api/delete", json!({"file": "demo.json"})).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body): (_, serde_json::Value) = helpers::get_json(router, "/api/projects").await?;
    assert!(body["projects"].as_array().context("projects")?.is_empty());
    assert!(backend.get("json/demo.json").await.is_err());
    Ok(())
}

#[tokio::test]
async fn openapi_spec_is_served() -> Result<()> {
    let (_backend, router) = test_server();

    let (status, body): (_, serde_json::Value) =
        helpers::get_json(router, "/openapi.json").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/projects"].is_object());
    Ok(())
}
