//! 无采集设备时的麦克风实现

use async_trait::async_trait;

use crate::application::ports::{CaptureError, CaptureRequest, CaptureStream, MicrophonePort};

/// 始终返回 NoDevice 的麦克风
#[derive(Debug, Default)]
pub struct UnavailableMicrophone;

#[async_trait]
impl MicrophonePort for UnavailableMicrophone {
    async fn open(&self, request: CaptureRequest) -> Result<CaptureStream, CaptureError> {
        tracing::warn!(
            sample_rate = request.sample_rate,
            "Capture requested but the audio backend has no microphone"
        );
        Err(CaptureError::NoDevice(
            "the virtual audio backend has no capture device".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_fails() {
        let result = UnavailableMicrophone
            .open(CaptureRequest {
                sample_rate: 16000,
                frame_size: 4096,
                video: false,
            })
            .await;
        assert!(matches!(result, Err(CaptureError::NoDevice(_))));
    }
}
