//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//! Layers: permissive CORS (browser dashboards call it cross-origin) and
//! request tracing.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::config::MAX_IMAGE_BYTES;

/// Multipart framing on top of the image itself.
const MAX_BODY_BYTES: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Build the API router from a prepared `ApiContext`.
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/pollution/analyze", post(endpoints::pollution::analyze))
        .route("/feedback/analyze", post(endpoints::feedback::analyze))
        .route("/chat", post(endpoints::chat::ask))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::pipeline::detection::normalize::sample_png;
    use crate::pipeline::inference::{MockTextClient, MockVisionClient};

    const BOUNDARY: &str = "pollufight-test-boundary";

    fn app(vision: Arc<MockVisionClient>, text: Arc<MockTextClient>) -> Router {
        let ctx = ApiContext::new(Arc::new(AppConfig::default()), vision, text);
        api_router(ctx)
    }

    fn offline_app() -> Router {
        app(
            Arc::new(MockVisionClient::unavailable()),
            Arc::new(MockTextClient::unavailable()),
        )
    }

    enum Part<'a> {
        File { filename: &'a str, bytes: &'a [u8] },
        Text { name: &'a str, value: &'a str },
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File { filename, bytes } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
                Part::Text { name, value } => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}").as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/pollution/analyze")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = offline_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let req = Request::builder()
            .uri("/api/nope")
            .body(Body::empty())
            .unwrap();
        let response = offline_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn pollution_without_file_or_url_is_400() {
        let req = multipart_request(&[Part::Text {
            name: "note",
            value: "nothing here",
        }]);
        let response = offline_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn pollution_demo_filename_skips_inference() {
        let vision = Arc::new(MockVisionClient::unavailable());
        let app = app(vision.clone(), Arc::new(MockTextClient::unavailable()));

        let req = multipart_request(&[Part::File {
            filename: "garbage_pile.jpg",
            bytes: b"not really an image",
        }]);
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(vision.call_count(), 0);
        let json = body_json(response).await;
        assert_eq!(json["pollution_type"], "Solid Waste/Garbage");
        assert_eq!(json["confidence_level"], 0.98);
        assert_eq!(json["details"][0]["source"], "Offline Simulator");
        assert!(json["legal_draft"]
            .as_str()
            .unwrap()
            .contains("Solid Waste Management Rules"));
    }

    #[tokio::test]
    async fn pollution_upload_runs_vision_models() {
        let vision = Arc::new(MockVisionClient::new(
            json!([{"label": "car", "score": 0.91, "box": {"xmin": 1, "ymin": 2, "xmax": 30, "ymax": 40}}]),
            json!([{"label": "sports car", "score": 0.5}]),
        ));
        let app = app(vision.clone(), Arc::new(MockTextClient::unavailable()));

        let png = sample_png(16, 16);
        let req = multipart_request(&[Part::File {
            filename: "street.png",
            bytes: &png,
        }]);
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(vision.call_count(), 2);
        let json = body_json(response).await;
        assert_eq!(json["pollution_type"], "Vehicular Emission");
        assert_eq!(json["confidence_level"], 0.91);
        assert_eq!(json["details"][0]["box"], json!([1, 2, 30, 40]));
    }

    #[tokio::test]
    async fn pollution_undecodable_upload_reports_error_category() {
        let req = multipart_request(&[Part::File {
            filename: "street.jpg",
            bytes: b"\x00\x01\x02 corrupted",
        }]);
        let response = offline_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["pollution_type"], "Error During Detection");
        assert_eq!(json["confidence_level"], 0.0);
    }

    #[tokio::test]
    async fn pollution_unreachable_url_is_400() {
        let req = multipart_request(&[Part::Text {
            name: "image_url",
            value: "http://127.0.0.1:9/missing.jpg",
        }]);
        let response = offline_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn feedback_empty_comments_is_400() {
        let req = json_request("/api/feedback/analyze", json!({"comments": []}));
        let response = offline_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "No comments provided");
    }

    #[tokio::test]
    async fn feedback_returns_dashboard() {
        let text = Arc::new(MockTextClient::new(vec![
            Some(r#"{"support": 20, "neutral": 30, "oppose": 50, "insight": "Anger about noise", "reasoning": "r"}"#.into()),
            None,
            Some(r#"[{"idea": "Quiet hours"}]"#.into()),
        ]));
        let app = app(Arc::new(MockVisionClient::unavailable()), text.clone());

        let req = json_request(
            "/api/feedback/analyze",
            json!({"comments": ["Too loud at night", "Trucks at 3am", "Need quiet hours"]}),
        );
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text.call_count(), 3);
        let json = body_json(response).await;
        assert_eq!(json["vibe_check"]["oppose"], 50.0);
        assert_eq!(json["deep_sentiment"]["insight"], "Anger about noise");
        assert_eq!(json["theme_map"][0]["theme"], "General");
        assert_eq!(json["theme_map"][0]["mentions"], 3);
        assert_eq!(json["innovation_spotter"][0]["idea"], "Quiet hours");
        assert_eq!(
            json["innovation_spotter"][0]["context"],
            "Derived from community feedback."
        );
    }

    #[tokio::test]
    async fn chat_returns_assistant_answer() {
        let text = Arc::new(MockTextClient::new(vec![Some(
            " Report smoke through the AI Lens. ".into(),
        )]));
        let app = app(Arc::new(MockVisionClient::unavailable()), text.clone());

        let req = json_request("/api/chat", json!({"query": "How do I report smoke?"}));
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text.prompts(), vec!["How do I report smoke?".to_string()]);
        let json = body_json(response).await;
        assert_eq!(json["response"], "Report smoke through the AI Lens.");
    }

    #[tokio::test]
    async fn chat_without_model_apologizes() {
        let req = json_request("/api/chat", json!({"query": "What is PM2.5?"}));
        let response = offline_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json["response"],
            crate::pipeline::assistant::APOLOGY_RESPONSE
        );
    }

    #[tokio::test]
    async fn chat_blank_query_is_400() {
        let req = json_request("/api/chat", json!({"query": "   "}));
        let response = offline_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Query cannot be empty");
    }

    #[tokio::test]
    async fn cors_preflight_allowed() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/feedback/analyze")
            .header("Origin", "http://localhost:3000")
            .header("Access-Control-Request-Method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = offline_app().oneshot(req).await.unwrap();

        assert!(response.status().is_success());
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
