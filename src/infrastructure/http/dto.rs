//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::SynthesizePodcastCommand;
use crate::domain::script::{Character, Gender, ScriptLine};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// Catalog DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceEntry {
    pub name: &'static str,
    pub label: &'static str,
    pub gender: Gender,
}

#[derive(Debug, Serialize)]
pub struct AccentEntry {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub voices: Vec<VoiceEntry>,
    pub accents: Vec<AccentEntry>,
}

// ============================================================================
// Script DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub lines: Vec<ScriptLine>,
    pub characters: Vec<Character>,
}

impl From<SynthesizeRequest> for SynthesizePodcastCommand {
    fn from(req: SynthesizeRequest) -> Self {
        Self {
            lines: req.lines,
            characters: req.characters,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    /// base64 PCM16
    pub audio: String,
    pub sample_rate: u32,
    pub duration_ms: u64,
    pub mode: &'static str,
    pub active_characters: usize,
}

// ============================================================================
// Preview / Live DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PreviewStateResponse {
    pub playing: bool,
    pub loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub enabled: bool,
}
