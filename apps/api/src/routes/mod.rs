pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sections", get(handlers::handle_list_sections))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_session_status).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/generate",
            post(handlers::handle_generate),
        )
        .route(
            "/api/v1/sessions/:id/sections/:section",
            get(handlers::handle_get_section),
        )
        .route(
            "/api/v1/sessions/:id/sections/:section/feedback",
            post(handlers::handle_submit_feedback),
        )
        .route(
            "/api/v1/sessions/:id/feedback",
            get(handlers::handle_feedback_history),
        )
        .route(
            "/api/v1/sessions/:id/document",
            get(handlers::handle_download),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::testing::{fake_pair, RecordingBackend};
    use crate::render::DOCX_MIME;
    use crate::session::SessionStore;

    struct Harness {
        router: Router,
        secondary: Arc<RecordingBackend>,
        dir: tempfile::TempDir,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let (_, secondary, backends) = fake_pair();
        let state = AppState {
            backends,
            sessions: SessionStore::new(dir.path()),
        };
        Harness {
            router: build_router(state),
            secondary,
            dir,
        }
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(router, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn new_session(router: &Router) -> String {
        let (status, body) = send_json(router, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        body["session_id"].as_str().unwrap().to_string()
    }

    fn generate_body() -> Value {
        json!({
            "title": "Robot Car",
            "author": "Kim",
            "institution": "Polytechnic",
            "project_type": "Arduino-based",
            "abstract": "A Bluetooth-controlled robot car using Arduino",
            "technologies": "HC-05"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let (status, body) = send_json(&h.router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_catalog_listing() {
        let h = harness();
        let (status, body) = send_json(&h.router, "GET", "/api/v1/sections", None).await;
        assert_eq!(status, StatusCode::OK);
        let sections = body["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 11);
        assert_eq!(sections[0]["id"], "COVER_PAGE");
        assert_eq!(sections[0]["front_matter"], true);
        assert_eq!(sections[6]["id"], "CHAPTER_3");
    }

    #[tokio::test]
    async fn test_generate_review_feedback_download_flow() {
        let h = harness();
        let id = new_session(&h.router).await;

        let (status, _) =
            send_json(&h.router, "GET", &format!("/api/v1/sessions/{id}/document"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send_json(
            &h.router,
            "POST",
            &format!("/api/v1/sessions/{id}/generate"),
            Some(generate_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_generated"], true);
        assert_eq!(body["report"]["sections_stored"], 10);

        let (status, body) = send_json(
            &h.router,
            "GET",
            &format!("/api/v1/sessions/{id}/sections/chapter_3"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "CHAPTER 3: HARDWARE COMPONENTS DESCRIPTION");

        h.secondary.push_reply(Ok("Revised chapter three."));
        let (status, body) = send_json(
            &h.router,
            "POST",
            &format!("/api/v1/sessions/{id}/sections/CHAPTER_3/feedback"),
            Some(json!({ "feedback": "Mention the motor driver" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "Revised chapter three.");
        assert_eq!(body["revision"]["backend"], "secondary");

        let (status, body) = send_json(
            &h.router,
            "GET",
            &format!("/api/v1/sessions/{id}/feedback"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["feedback"], "Mention the motor driver");
        assert_eq!(entries[0]["time"].as_str().unwrap().len(), 19);

        let request = Request::builder()
            .uri(format!("/api/v1/sessions/{id}/document?source=review"))
            .body(Body::empty())
            .unwrap();
        let response = h.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], DOCX_MIME);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"documentation.docx\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_header_download_uses_project_file_name() {
        let h = harness();
        let id = new_session(&h.router).await;
        send(
            &h.router,
            "POST",
            &format!("/api/v1/sessions/{id}/generate"),
            Some(generate_body()),
        )
        .await;

        let request = Request::builder()
            .uri(format!("/api/v1/sessions/{id}/document"))
            .body(Body::empty())
            .unwrap();
        let response = h.router.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"project_documentation.docx\""
        );
    }

    #[tokio::test]
    async fn test_missing_abstract_is_bad_request() {
        let h = harness();
        let id = new_session(&h.router).await;
        let (status, body) = send_json(
            &h.router,
            "POST",
            &format!("/api/v1/sessions/{id}/generate"),
            Some(json!({ "title": "No abstract" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, status_body) =
            send_json(&h.router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status_body["has_generated"], false);
        assert!(status_body["metadata"].is_null());
    }

    #[tokio::test]
    async fn test_backend_failure_reports_llm_error_and_keeps_sections() {
        let h = harness();
        let id = new_session(&h.router).await;
        h.secondary.push_reply(Err("unavailable"));

        let (status, body) = send_json(
            &h.router,
            "POST",
            &format!("/api/v1/sessions/{id}/generate"),
            Some(generate_body()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");

        let (_, status_body) =
            send_json(&h.router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status_body["sections"], json!(["CONTENTS"]));
    }

    #[tokio::test]
    async fn test_delete_session_removes_state_and_output_dir() {
        let h = harness();
        let id = new_session(&h.router).await;
        let (status, _) = send(
            &h.router,
            "POST",
            &format!("/api/v1/sessions/{id}/generate"),
            Some(generate_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let session_dir = h.dir.path().join(&id);
        assert!(session_dir.exists());

        let (status, _) = send(&h.router, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!session_dir.exists());

        let (status, _) = send_json(&h.router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&h.router, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_session_before_generation() {
        let h = harness();
        let id = new_session(&h.router).await;
        let (status, _) = send(&h.router, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_unknown_session_and_section_are_not_found() {
        let h = harness();
        let (status, _) = send_json(
            &h.router,
            "GET",
            &format!("/api/v1/sessions/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let id = new_session(&h.router).await;
        let (status, _) = send_json(
            &h.router,
            "GET",
            &format!("/api/v1/sessions/{id}/sections/CHAPTER_9"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
