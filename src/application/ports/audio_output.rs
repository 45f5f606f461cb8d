//! Audio Output Port - 音频输出（共享时钟 + 定时播放）
//!
//! 对应一个音频上下文：提供单调时钟，并在指定时刻开始播放缓冲区

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::audio::AudioBuffer;

/// 音频设备错误
#[derive(Debug, Error)]
pub enum AudioDeviceError {
    #[error("No audio device available: {0}")]
    NoDevice(String),

    #[error("Audio stream error: {0}")]
    StreamError(String),

    #[error("Audio output closed")]
    Closed,
}

/// 已调度声音的句柄 ID
pub type SoundId = u64;

/// 已调度的声音
#[derive(Debug)]
pub struct ScheduledSound {
    pub id: SoundId,
    /// 声音结束（自然播完或被停止）时完成；发送端被丢弃同样视为结束
    pub ended: oneshot::Receiver<()>,
}

/// Audio Output Port
pub trait AudioOutputPort: Send + Sync {
    /// 当前时钟时间（秒），单调不减
    fn current_time(&self) -> f64;

    /// 在 `start_at`（秒，时钟时间）开始播放；已过去的时刻立即播放
    fn schedule(
        &self,
        buffer: &AudioBuffer,
        start_at: f64,
    ) -> Result<ScheduledSound, AudioDeviceError>;

    /// 立即停止一个声音，未知或已结束的 ID 忽略
    fn stop(&self, id: SoundId);

    /// 关闭音频上下文，停止所有声音，可重复调用
    fn close(&self);
}

/// 音频输出工厂
///
/// 每个实时会话打开独立的音频上下文，会话结束时关闭。
/// 打开可能要等设备流就绪，因此是异步的。
#[async_trait]
pub trait AudioOutputFactory: Send + Sync {
    async fn open(&self, sample_rate: u32)
        -> Result<Arc<dyn AudioOutputPort>, AudioDeviceError>;
}
