//! Preview Handlers - 试听播放

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, PreviewStateResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn preview_state(state: &AppState) -> PreviewStateResponse {
    PreviewStateResponse {
        playing: state.preview.is_playing(),
        loaded: state.preview.is_loaded(),
    }
}

/// 播放 / 停止切换
pub async fn toggle_preview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<PreviewStateResponse>>, ApiError> {
    state.preview.toggle()?;
    Ok(Json(ApiResponse::success(preview_state(&state))))
}

/// 停止试听
pub async fn stop_preview(State(state): State<Arc<AppState>>) -> Json<ApiResponse<PreviewStateResponse>> {
    state.preview.stop();
    Json(ApiResponse::success(preview_state(&state)))
}

/// 试听状态
pub async fn preview_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<PreviewStateResponse>> {
    Json(ApiResponse::success(preview_state(&state)))
}

/// 导出已载入音频为 WAV
pub async fn download_preview_wav(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let wav = state
        .preview
        .wav()
        .ok_or_else(|| ApiError::NotFound("no audio generated yet".to_string()))?;

    Response::builder()
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, wav.len())
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"podcast.wav\"",
        )
        .body(Body::from(wav))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
