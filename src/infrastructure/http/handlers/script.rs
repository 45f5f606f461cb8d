//! Script Handlers - 剧本合成

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{ApplicationError, StudioEvent, StudioEventSink};
use crate::domain::audio::{decode_audio, SYNTHESIS_SAMPLE_RATE};
use crate::infrastructure::http::dto::{ApiResponse, SynthesizeRequest, SynthesizeResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 合成整部剧本
///
/// 先停止并清空当前试听；成功后解码并载入试听播放器。
pub async fn synthesize_script(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Json<ApiResponse<SynthesizeResponse>>, ApiError> {
    state.preview.clear();

    let result = async {
        let response = state.synthesize_handler.handle(req.into()).await?;
        let buffer = decode_audio(&response.audio, SYNTHESIS_SAMPLE_RATE)?;
        Ok::<_, ApplicationError>((response, buffer))
    }
    .await;

    let (response, buffer) = match result {
        Ok(ok) => ok,
        Err(err) => {
            state.event_publisher.publish(StudioEvent::SynthesisFailed {
                error: err.to_string(),
            });
            return Err(err.into());
        }
    };

    let duration_ms = buffer.duration_ms();
    state.preview.load(buffer);
    state.event_publisher.publish(StudioEvent::SynthesisCompleted {
        duration_ms,
        characters: response.active_characters,
    });

    tracing::info!(
        mode = response.mode.as_str(),
        duration_ms = duration_ms,
        "Podcast synthesized"
    );

    Ok(Json(ApiResponse::success(SynthesizeResponse {
        audio: response.audio,
        sample_rate: SYNTHESIS_SAMPLE_RATE,
        duration_ms,
        mode: response.mode.as_str(),
        active_characters: response.active_characters,
    })))
}
