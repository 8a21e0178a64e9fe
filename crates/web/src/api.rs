//! HTTP handlers for the chat page and its two actions.

use crate::page::INDEX_HTML;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use chatppt_core::{ConversationState, Turn};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Text typed into the input box.
    pub text: String,

    /// Opaque state from the previous response, if any.
    #[serde(default)]
    pub state: ConversationState,
}

/// Result of a generation.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The user's text followed by the assistant's status message.
    pub history: Vec<Turn>,
    /// The request's state, unchanged.
    pub state: ConversationState,
}

/// Result of the clear action.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub history: Vec<Turn>,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create the router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/generate", post(generate))
        .route("/api/clear", post(clear))
        .with_state(state)
}

/// The chat page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Format the text, build a deck and report the outcome.
///
/// Generation failures are part of the returned history; only a panicked
/// or cancelled generation task is an HTTP error.
pub async fn generate(
    State(app): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    log::info!("Generate request ({} chars)", req.text.chars().count());

    let (history, state) = app.generate(req.text, req.state).await.map_err(|e| {
        log::error!("Generation task failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Generation task failed: {}", e),
        )
    })?;

    Ok(Json(GenerateResponse { history, state }))
}

/// Reset the visible history and the input box.
pub async fn clear() -> Json<ClearResponse> {
    let (history, text) = chatppt_core::clear();
    Json(ClearResponse { history, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BoxedBuilder;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use chatppt_core::{DeckBuilder, Error, Generator, Result, Role, Settings};
    use serde_json::{json, Value};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use tower::ServiceExt;

    /// Writes an empty deck named after the outline's first line.
    struct StubBuilder {
        output_dir: PathBuf,
    }

    impl DeckBuilder for StubBuilder {
        fn build(&self, outline_path: &Path) -> Result<()> {
            let outline = std::fs::read_to_string(outline_path)?;
            let title = outline.lines().next().unwrap_or_default().trim_start_matches("# ");
            std::fs::write(self.output_dir.join(format!("{}.pptx", title)), b"")?;
            Ok(())
        }
    }

    struct BrokenBuilder;

    impl DeckBuilder for BrokenBuilder {
        fn build(&self, _outline_path: &Path) -> Result<()> {
            Err(Error::BuilderError("renderer crashed".to_string()))
        }
    }

    fn app(tmp: &TempDir, builder: BoxedBuilder) -> Router {
        let generator = Generator::new(Settings::new(tmp.path()), builder);
        create_router(AppState::new(generator))
    }

    fn stub_app(tmp: &TempDir) -> Router {
        let builder = StubBuilder {
            output_dir: tmp.path().to_path_buf(),
        };
        app(tmp, Box::new(builder))
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_generate_reports_deck() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = post_json(
            stub_app(&tmp),
            "/api/generate",
            json!({"text": "Roadmap\n\nQ1\n- ship", "state": {"id": 1}}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response: GenerateResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.history.len(), 2);
        assert_eq!(response.history[0].role, Role::User);
        assert_eq!(response.history[0].text, "Roadmap\n\nQ1\n- ship");
        assert_eq!(
            response.history[1].text,
            format!("Deck generated: {}", tmp.path().join("Roadmap.pptx").display())
        );
        assert_eq!(response.state.value(), Some(&json!({"id": 1})));
    }

    #[tokio::test]
    async fn test_generate_without_state() {
        let tmp = TempDir::new().unwrap();
        let (status, body) =
            post_json(stub_app(&tmp), "/api/generate", json!({"text": ""})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], Value::Null);
        assert_eq!(body["history"][0], json!({"text": "", "role": "user"}));
    }

    #[tokio::test]
    async fn test_generate_builder_error_is_a_message() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = post_json(
            app(&tmp, Box::new(BrokenBuilder)),
            "/api/generate",
            json!({"text": "hello", "state": "keep me"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["history"][1]["role"], "assistant");
        let message = body["history"][1]["text"].as_str().unwrap();
        assert!(message.contains("renderer crashed"), "{message}");
        assert_eq!(body["state"], "keep me");
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_text() {
        let tmp = TempDir::new().unwrap();
        let (status, _) = post_json(stub_app(&tmp), "/api/generate", json!({"state": null})).await;

        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_clear() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = post_json(stub_app(&tmp), "/api/clear", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"history": [], "text": ""}));
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let tmp = TempDir::new().unwrap();

        let response = stub_app(&tmp)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&page).contains("/api/generate"));

        let response = stub_app(&tmp)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "healthy");
    }
}
