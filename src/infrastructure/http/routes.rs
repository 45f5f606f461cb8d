//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping               GET   健康检查
//! - /api/catalog            GET   音色与口音目录
//! - /api/script/synthesize  POST  合成整部剧本并载入试听
//! - /api/preview/toggle     POST  试听播放 / 停止
//! - /api/preview/stop       POST  停止试听
//! - /api/preview/status     GET   试听状态
//! - /api/preview/wav        GET   导出试听音频（WAV）
//! - /api/live/start         POST  开始实时会话
//! - /api/live/stop          POST  停止实时会话
//! - /api/live/mute          POST  切换静音
//! - /api/live/video         POST  切换摄像头
//! - /api/live/status        GET   实时会话状态
//! - /ws/events              WS    工作室事件（会话状态、状态日志、合成结果）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::events_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/catalog", get(handlers::catalog))
        .route("/script/synthesize", post(handlers::synthesize_script))
        .nest("/preview", preview_routes())
        .nest("/live", live_routes())
}

/// Preview 路由
fn preview_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/toggle", post(handlers::toggle_preview))
        .route("/stop", post(handlers::stop_preview))
        .route("/status", get(handlers::preview_status))
        .route("/wav", get(handlers::download_preview_wav))
}

/// Live 路由
fn live_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(handlers::start_live))
        .route("/stop", post(handlers::stop_live))
        .route("/mute", post(handlers::toggle_mute))
        .route("/video", post(handlers::toggle_video))
        .route("/status", get(handlers::live_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{LiveSessionController, LiveSettings, StudioEvent};
    use crate::domain::script::VoiceName;
    use crate::infrastructure::adapters::{
        FakeSpeechClient, FakeSpeechClientConfig, GeminiLiveClient, GeminiLiveConfig,
    };
    use crate::infrastructure::audio::{
        UnavailableMicrophone, VirtualAudioOutput, VirtualOutputFactory,
    };
    use crate::infrastructure::events::EventPublisher;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let publisher = Arc::new(EventPublisher::new());
        let live = LiveSessionController::new(
            Arc::new(GeminiLiveClient::new(GeminiLiveConfig::default())),
            Arc::new(UnavailableMicrophone),
            Arc::new(VirtualOutputFactory),
            publisher.clone(),
            LiveSettings {
                model: "live-model".to_string(),
                persona: "co-host".to_string(),
                voice: VoiceName::Puck,
                frame_size: 4096,
                input_sample_rate: 16000,
                output_sample_rate: 24000,
            },
        );
        let engine = Arc::new(FakeSpeechClient::new(FakeSpeechClientConfig {
            latency_ms: 0,
            ..Default::default()
        }));
        Arc::new(AppState::new(
            engine,
            "offline",
            Arc::new(VirtualAudioOutput::new(24000)),
            live,
            publisher,
        ))
    }

    fn router(state: Arc<AppState>) -> Router {
        create_routes().with_state(state)
    }

    async fn call(state: &Arc<AppState>, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn call_json(state: &Arc<AppState>, method: &str, uri: &str, body: Option<Value>) -> Value {
        let response = call(state, method, uri, body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn script(speakers: &[&str]) -> Value {
        let lines: Vec<Value> = speakers
            .iter()
            .enumerate()
            .map(|(i, id)| json!({"id": i.to_string(), "character_id": id, "text": "Hola a todos"}))
            .collect();
        json!({
            "lines": lines,
            "characters": [
                {"id": "1", "name": "Narrador", "voice": "Kore", "accent": "neutral", "speed": 1.0},
                {"id": "2", "name": "Invitado", "voice": "Puck", "accent": "mexican", "speed": 1.2}
            ]
        })
    }

    #[tokio::test]
    async fn test_ping() {
        let state = test_state();
        let body = call_json(&state, "GET", "/api/ping", None).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["live"], "idle");
    }

    #[tokio::test]
    async fn test_catalog() {
        let state = test_state();
        let body = call_json(&state, "GET", "/api/catalog", None).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["voices"].as_array().unwrap().len(), 5);
        assert_eq!(body["data"]["voices"][0]["name"], "Kore");
        assert_eq!(body["data"]["voices"][0]["gender"], "Female");
        assert_eq!(body["data"]["accents"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_synthesize_loads_preview() {
        let state = test_state();
        let mut events = state.event_publisher.subscribe();

        let body = call_json(&state, "POST", "/api/script/synthesize", Some(script(&["1", "2"]))).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["sample_rate"], 24000);
        assert_eq!(body["data"]["mode"], "multi_speaker");
        assert!(body["data"]["duration_ms"].as_u64().unwrap() > 0);
        assert!(state.preview.is_loaded());

        match events.recv().await.unwrap() {
            StudioEvent::SynthesisCompleted { characters, .. } => assert_eq!(characters, 2),
            other => panic!("unexpected event: {:?}", other),
        }

        let response = call(&state, "GET", "/api/preview/wav", None).await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..4], b"RIFF");

        let body = call_json(&state, "POST", "/api/preview/toggle", None).await;
        assert_eq!(body["data"]["playing"], true);
        let body = call_json(&state, "POST", "/api/preview/toggle", None).await;
        assert_eq!(body["data"]["playing"], false);
        assert_eq!(body["data"]["loaded"], true);
    }

    #[tokio::test]
    async fn test_failed_synthesis_clears_preview() {
        let state = test_state();
        call_json(&state, "POST", "/api/script/synthesize", Some(script(&["1"]))).await;
        call_json(&state, "POST", "/api/preview/toggle", None).await;
        assert!(state.preview.is_playing());

        let mut events = state.event_publisher.subscribe();
        let body = call_json(&state, "POST", "/api/script/synthesize", Some(script(&["9"]))).await;
        assert_eq!(body["errno"], 400);
        assert!(body["data"].is_null());
        assert!(!state.preview.is_loaded());
        assert!(!state.preview.is_playing());
        assert!(matches!(
            events.recv().await.unwrap(),
            StudioEvent::SynthesisFailed { .. }
        ));

        let body = call_json(&state, "GET", "/api/preview/wav", None).await;
        assert_eq!(body["errno"], 404);
    }

    #[tokio::test]
    async fn test_preview_without_audio() {
        let state = test_state();
        let body = call_json(&state, "POST", "/api/preview/toggle", None).await;
        assert_eq!(body["errno"], 409);

        let body = call_json(&state, "POST", "/api/preview/stop", None).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["playing"], false);
    }

    #[tokio::test]
    async fn test_live_start_without_microphone() {
        let state = test_state();
        let body = call_json(&state, "POST", "/api/live/start", None).await;
        assert_eq!(body["errno"], 503);

        let body = call_json(&state, "GET", "/api/live/status", None).await;
        assert_eq!(body["data"]["state"], "idle");
        let log: Vec<String> = serde_json::from_value(body["data"]["log"].clone()).unwrap();
        assert!(log.iter().any(|line| line.starts_with("Error iniciando sesión")));

        let body = call_json(&state, "POST", "/api/live/stop", None).await;
        assert_eq!(body["data"]["state"], "idle");
    }

    #[tokio::test]
    async fn test_live_toggles() {
        let state = test_state();
        let body = call_json(&state, "POST", "/api/live/mute", None).await;
        assert_eq!(body["data"]["enabled"], true);
        let body = call_json(&state, "POST", "/api/live/video", None).await;
        assert_eq!(body["data"]["enabled"], true);

        let body = call_json(&state, "GET", "/api/live/status", None).await;
        assert_eq!(body["data"]["muted"], true);
        assert_eq!(body["data"]["video"], true);
    }
}
