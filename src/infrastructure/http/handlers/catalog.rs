//! Catalog Handler - 可选音色与口音

use axum::Json;

use crate::domain::script::{Accent, VoiceName};
use crate::infrastructure::http::dto::{AccentEntry, ApiResponse, CatalogResponse, VoiceEntry};

/// 角色编辑器可选的音色与口音
pub async fn catalog() -> Json<ApiResponse<CatalogResponse>> {
    let voices = VoiceName::ALL
        .iter()
        .map(|voice| VoiceEntry {
            name: voice.as_str(),
            label: voice.label(),
            gender: voice.gender(),
        })
        .collect();
    let accents = Accent::ALL
        .iter()
        .map(|accent| AccentEntry {
            id: accent.id(),
            label: accent.label(),
        })
        .collect();

    Json(ApiResponse::success(CatalogResponse { voices, accents }))
}
