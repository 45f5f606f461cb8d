//! Gemini Live Client - 实时语音会话
//!
//! 实现 LiveAgentPort，通过 BidiGenerateContent WebSocket 双向流式对话
//!
//! 上行: setup → realtimeInput.mediaChunks（PCM16 @ 16kHz）
//! 下行: setupComplete / serverContent（modelTurn 音频、interrupted、turnComplete）

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::wire::{parse_live_frame, LiveFrame, LiveSetupMessage, RealtimeInputMessage};
use crate::application::ports::{
    LiveAgentError, LiveAgentPort, LiveConnection, LiveEvent, LiveSender, LiveSetup,
};
use crate::domain::audio::PcmBlob;

/// 上行 / 下行通道容量
const CHANNEL_CAPACITY: usize = 64;

/// Gemini Live 配置
#[derive(Debug, Clone)]
pub struct GeminiLiveConfig {
    pub api_key: Option<String>,
    /// WebSocket 端点（不含 key 参数）
    pub url: String,
}

impl Default for GeminiLiveConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent".to_string(),
        }
    }
}

/// Gemini Live 客户端
pub struct GeminiLiveClient {
    config: GeminiLiveConfig,
}

impl GeminiLiveClient {
    pub fn new(config: GeminiLiveConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self) -> Result<String, LiveAgentError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LiveAgentError::MissingCredential)?;
        Ok(format!("{}?key={}", self.config.url, key))
    }
}

#[async_trait]
impl LiveAgentPort for GeminiLiveClient {
    async fn connect(&self, setup: LiveSetup) -> Result<LiveConnection, LiveAgentError> {
        let endpoint = self.endpoint()?;
        let (ws_stream, _) = connect_async(endpoint)
            .await
            .map_err(|e| LiveAgentError::ConnectionFailed(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let setup_message = LiveSetupMessage::new(&setup.model, &setup.system_instruction, setup.voice);
        let setup_json = serde_json::to_string(&setup_message)
            .map_err(|e| LiveAgentError::Protocol(e.to_string()))?;
        write
            .send(Message::Text(setup_json))
            .await
            .map_err(|e| LiveAgentError::ConnectionFailed(e.to_string()))?;

        tracing::info!(model = %setup.model, voice = %setup.voice, "Live setup sent");

        let (events_tx, events_rx) = mpsc::channel::<LiveEvent>(CHANNEL_CAPACITY);
        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Message>(CHANNEL_CAPACITY);

        let reader = tokio::spawn(async move {
            while let Some(msg_result) = read.next().await {
                let msg = match msg_result {
                    Ok(msg) => msg,
                    Err(e) => {
                        let _ = events_tx.send(LiveEvent::Error(e.to_string())).await;
                        return;
                    }
                };

                let text = match msg {
                    Message::Text(text) => text,
                    Message::Binary(data) => match String::from_utf8(data) {
                        Ok(text) => text,
                        Err(_) => continue,
                    },
                    Message::Close(frame) => {
                        let reason = frame.map(|f| f.reason.to_string());
                        let _ = events_tx.send(LiveEvent::Closed(reason)).await;
                        return;
                    }
                    _ => continue,
                };

                let Some(event) = frame_event(&text) else {
                    continue;
                };
                if events_tx.send(event).await.is_err() {
                    return;
                }
            }
            let _ = events_tx.send(LiveEvent::Closed(None)).await;
        });
        let reader_abort = reader.abort_handle();

        tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let is_close = matches!(msg, Message::Close(_));
                if let Err(e) = write.send(msg).await {
                    tracing::debug!(error = %e, "Live socket write failed");
                    break;
                }
                if is_close {
                    break;
                }
            }
            let _ = write.close().await;
            reader_abort.abort();
        });

        Ok(LiveConnection {
            sender: Arc::new(GeminiLiveSender {
                outgoing: outgoing_tx,
                closed: AtomicBool::new(false),
            }),
            events: events_rx,
        })
    }
}

/// 下行文本帧 → 会话事件
fn frame_event(text: &str) -> Option<LiveEvent> {
    match parse_live_frame(text) {
        Ok(LiveFrame::SetupComplete) => Some(LiveEvent::Opened),
        Ok(LiveFrame::Content(message)) => Some(LiveEvent::Message(message)),
        Ok(LiveFrame::Ignored) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse live server message");
            None
        }
    }
}

/// 上行发送端，写入由独立任务串行完成
struct GeminiLiveSender {
    outgoing: mpsc::Sender<Message>,
    closed: AtomicBool,
}

#[async_trait]
impl LiveSender for GeminiLiveSender {
    async fn send_audio(&self, chunk: PcmBlob) -> Result<(), LiveAgentError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(LiveAgentError::Closed);
        }
        let json = serde_json::to_string(&RealtimeInputMessage::audio(&chunk))
            .map_err(|e| LiveAgentError::Protocol(e.to_string()))?;
        self.outgoing
            .send(Message::Text(json))
            .await
            .map_err(|_| LiveAgentError::Closed)
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.outgoing.try_send(Message::Close(None)).is_err() {
            tracing::debug!("Live socket already closed");
        }
    }
}
