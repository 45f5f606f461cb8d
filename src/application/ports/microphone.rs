//! Microphone Port - 麦克风采集抽象

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// 采集错误
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No capture device: {0}")]
    NoDevice(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture stream error: {0}")]
    StreamError(String),
}

/// 采集参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    /// 输出采样率（单声道）
    pub sample_rate: u32,
    /// 每帧样本数
    pub frame_size: usize,
    /// 是否同时打开摄像头（仅本地预览）
    pub video: bool,
}

/// 采集轨道，停止后释放设备
pub trait CaptureTracks: Send + Sync {
    fn stop(&self);
}

/// 已打开的采集流
pub struct CaptureStream {
    /// 定长单声道 f32 帧
    pub frames: mpsc::Receiver<Vec<f32>>,
    pub tracks: Box<dyn CaptureTracks>,
    pub has_video: bool,
}

/// Microphone Port
#[async_trait]
pub trait MicrophonePort: Send + Sync {
    async fn open(&self, request: CaptureRequest) -> Result<CaptureStream, CaptureError>;
}
