//! Speech Synthesis Port - 批量语音合成抽象
//!
//! 定义一次性（请求/响应）合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::script::VoiceName;

/// 合成引擎错误
#[derive(Debug, Error)]
pub enum SpeechEngineError {
    #[error("Missing access credential")]
    MissingCredential,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error ({status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SpeechEngineError {
    /// 远端返回的原始错误信息
    pub fn remote_message(&self) -> String {
        match self {
            Self::ServiceError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// 多说话人配置中的一个槽位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerVoice {
    /// 槽位标签，如 "Speaker A"
    pub speaker: String,
    pub voice: VoiceName,
}

/// 语音配置：单音色或恰好两个槽位
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechConfig {
    SingleVoice(VoiceName),
    MultiSpeaker([SpeakerVoice; 2]),
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 合成模型 ID
    pub model: String,
    /// 表演指导 + 剧本
    pub prompt: String,
    pub speech: SpeechConfig,
}

/// 合成响应
#[derive(Debug, Clone, Default)]
pub struct SynthesisResponse {
    /// 首个候选、首个内容片段中的内联音频（base64 PCM16 @ 24kHz）
    pub audio: Option<String>,
}

/// Speech Synthesis Port
///
/// 外部合成服务的抽象接口。每次调用只发起一次请求，不重试。
#[async_trait]
pub trait SpeechSynthesisPort: Send + Sync {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, SpeechEngineError>;

    /// 检查合成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
