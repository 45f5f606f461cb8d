//! Live Agent Port - 实时语音会话抽象
//!
//! 远端语音代理的双向流式会话：connect / send / 事件流 / close

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::audio::PcmBlob;
use crate::domain::script::VoiceName;

/// 实时会话错误
#[derive(Debug, Error)]
pub enum LiveAgentError {
    #[error("Missing access credential")]
    MissingCredential,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Session closed")]
    Closed,

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// 会话建立参数
///
/// 响应模态固定为音频。
#[derive(Debug, Clone)]
pub struct LiveSetup {
    pub model: String,
    /// 系统角色设定
    pub system_instruction: String,
    /// 固定的合成音色
    pub voice: VoiceName,
}

/// 服务端消息
///
/// 音频片段与打断信号相互独立，同一条消息可能同时携带两者。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveServerMessage {
    /// 内联音频片段（base64 PCM16 @ 24kHz）
    pub audio: Option<String>,
    pub interrupted: bool,
    pub turn_complete: bool,
}

/// 会话事件（对应 open / message / close / error 回调）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    Opened,
    Message(LiveServerMessage),
    Closed(Option<String>),
    Error(String),
}

/// 会话上行发送端
#[async_trait]
pub trait LiveSender: Send + Sync {
    /// 发送一帧实时音频
    async fn send_audio(&self, chunk: PcmBlob) -> Result<(), LiveAgentError>;

    /// 关闭会话，可重复调用
    fn close(&self);
}

/// 已建立的会话
pub struct LiveConnection {
    pub sender: Arc<dyn LiveSender>,
    pub events: mpsc::Receiver<LiveEvent>,
}

/// Live Agent Port
#[async_trait]
pub trait LiveAgentPort: Send + Sync {
    async fn connect(&self, setup: LiveSetup) -> Result<LiveConnection, LiveAgentError>;
}
