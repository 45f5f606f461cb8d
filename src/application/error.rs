//! 应用层错误定义
//!
//! 合成与实时会话统一的错误类型

use thiserror::Error;

use crate::domain::audio::AudioError;
use crate::domain::script::ScriptError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 剧本中没有可用角色
    #[error("The script is empty or has no assigned characters")]
    EmptyScript,

    /// 远端未返回音频
    #[error("The AI response contains no audio data")]
    EmptyAudioResponse,

    /// 远端拒绝多说话人配置
    #[error("Internal voice configuration error, try again with fewer unique voices: {0}")]
    TooManyVoices(String),

    /// 远端或传输失败
    #[error("Error generating audio: {0}")]
    Synthesis(String),

    /// 音频负载格式错误
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// 麦克风 / 会话建立失败
    #[error("Error starting session: {0}")]
    SessionAcquisition(String),

    /// 未配置访问凭据
    #[error("API key is missing, please check your environment configuration")]
    MissingCredential,

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

impl From<AudioError> for ApplicationError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Decode(msg) => Self::Decode(msg),
        }
    }
}

impl From<ScriptError> for ApplicationError {
    fn from(err: ScriptError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
