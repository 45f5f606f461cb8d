//! 实时会话状态与资源

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::playback::PlaybackScheduler;
use crate::application::ports::{AudioOutputPort, CaptureTracks, LiveSender};
use crate::domain::script::VoiceName;

/// 状态日志保留条数
pub const STATUS_LOG_CAPACITY: usize = 5;

/// 会话状态
///
/// Idle → Connecting → Open → Closing → Idle，任何错误都经由同一拆除路径回到 Idle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closing,
}

impl LiveState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }
}

/// 实时会话参数
#[derive(Debug, Clone)]
pub struct LiveSettings {
    pub model: String,
    /// 主持人人设（系统指令）
    pub persona: String,
    pub voice: VoiceName,
    /// 每帧采样数，2 的幂
    pub frame_size: usize,
    pub input_sample_rate: u32,
    pub output_sample_rate: u32,
}

/// 会话状态快照
#[derive(Debug, Clone, Serialize)]
pub struct LiveStatus {
    pub state: LiveState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub muted: bool,
    pub video: bool,
    /// 流式队列中尚未播完的片段数
    pub queued: usize,
    pub log: Vec<String>,
}

/// 滚动状态日志
#[derive(Debug, Default)]
pub(crate) struct StatusLog {
    entries: VecDeque<String>,
}

impl StatusLog {
    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == STATUS_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

/// 会话持有的资源，每项只释放一次
#[derive(Default)]
pub(crate) struct SessionResources {
    pub tracks: Option<Box<dyn CaptureTracks>>,
    /// 会话打开前暂存的采集帧流
    pub frames: Option<mpsc::Receiver<Vec<f32>>>,
    pub capture_task: Option<JoinHandle<()>>,
    pub event_task: Option<JoinHandle<()>>,
    pub output: Option<Arc<dyn AudioOutputPort>>,
    pub scheduler: Option<Arc<PlaybackScheduler>>,
    pub sender: Option<Arc<dyn LiveSender>>,
}

impl SessionResources {
    /// 释放全部资源
    pub fn release(mut self) {
        if let Some(tracks) = self.tracks.take() {
            tracks.stop();
        }
        self.frames.take();
        if let Some(task) = self.capture_task.take() {
            task.abort();
        }
        if let Some(task) = self.event_task.take() {
            task.abort();
        }
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.interrupt_all();
        }
        if let Some(output) = self.output.take() {
            output.close();
        }
        if let Some(sender) = self.sender.take() {
            sender.close();
        }
    }
}
