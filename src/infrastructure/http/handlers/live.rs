//! Live Handlers - 实时会话控制

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::LiveStatus;
use crate::infrastructure::http::dto::{ApiResponse, ToggleResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 开始实时会话
///
/// 返回时连接已建立；open 与后续状态通过 /ws/events 推送。
pub async fn start_live(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<LiveStatus>>, ApiError> {
    state.live.start().await?;
    Ok(Json(ApiResponse::success(state.live.status())))
}

/// 停止实时会话，可重复调用
pub async fn stop_live(State(state): State<Arc<AppState>>) -> Json<ApiResponse<LiveStatus>> {
    state.live.stop();
    Json(ApiResponse::success(state.live.status()))
}

/// 切换麦克风静音
pub async fn toggle_mute(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ToggleResponse>> {
    let enabled = state.live.toggle_mute();
    Json(ApiResponse::success(ToggleResponse { enabled }))
}

/// 切换摄像头
pub async fn toggle_video(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ToggleResponse>> {
    let enabled = state.live.toggle_video();
    Json(ApiResponse::success(ToggleResponse { enabled }))
}

/// 会话状态
pub async fn live_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<LiveStatus>> {
    Json(ApiResponse::success(state.live.status()))
}
