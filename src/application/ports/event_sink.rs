//! Event Sink Port - 工作室事件推送

use serde::{Deserialize, Serialize};

/// 工作室事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum StudioEvent {
    /// 实时会话状态变更
    LiveStateChanged {
        state: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },
    /// 实时会话状态日志
    LiveLog { message: String },
    /// 剧本合成完成
    SynthesisCompleted {
        duration_ms: u64,
        characters: usize,
    },
    /// 剧本合成失败
    SynthesisFailed { error: String },
}

/// Event Sink Port
pub trait StudioEventSink: Send + Sync {
    fn publish(&self, event: StudioEvent);
}
