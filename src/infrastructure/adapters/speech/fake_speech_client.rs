//! Fake Speech Client - 离线合成引擎
//!
//! 不调用远端服务，按提示词长度生成一段正弦提示音，用于本地开发与演示

use async_trait::async_trait;
use std::f32::consts::TAU;
use std::time::Duration;

use crate::application::ports::{
    SpeechConfig, SpeechEngineError, SpeechSynthesisPort, SynthesisRequest, SynthesisResponse,
};
use crate::domain::audio::{bytes_to_base64, float_to_pcm16, pcm16_to_bytes, SYNTHESIS_SAMPLE_RATE};

/// Fake Speech Client 配置
#[derive(Debug, Clone)]
pub struct FakeSpeechClientConfig {
    /// 每个提示词字符对应的时长（毫秒）
    pub ms_per_char: u64,
    /// 最长时长（毫秒）
    pub max_duration_ms: u64,
    /// 模拟推理延迟（毫秒）
    pub latency_ms: u64,
}

impl Default for FakeSpeechClientConfig {
    fn default() -> Self {
        Self {
            ms_per_char: 20,
            max_duration_ms: 10_000,
            latency_ms: 200,
        }
    }
}

/// Fake Speech Client
pub struct FakeSpeechClient {
    config: FakeSpeechClientConfig,
}

impl FakeSpeechClient {
    pub fn new(config: FakeSpeechClientConfig) -> Self {
        tracing::info!(
            ms_per_char = config.ms_per_char,
            max_duration_ms = config.max_duration_ms,
            "FakeSpeechClient initialized"
        );
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeSpeechClientConfig::default())
    }

    fn duration_ms(&self, prompt: &str) -> u64 {
        (prompt.chars().count() as u64 * self.config.ms_per_char).min(self.config.max_duration_ms)
    }
}

/// 生成正弦提示音，首尾 10ms 淡入淡出
fn tone(duration_ms: u64, frequency: f32) -> Vec<f32> {
    let rate = SYNTHESIS_SAMPLE_RATE as f32;
    let len = (duration_ms * SYNTHESIS_SAMPLE_RATE as u64 / 1000) as usize;
    let fade = (rate * 0.01) as usize;
    (0..len)
        .map(|i| {
            let envelope = if fade == 0 {
                1.0
            } else {
                (i.min(len - 1 - i) as f32 / fade as f32).min(1.0)
            };
            0.3 * envelope * (TAU * frequency * i as f32 / rate).sin()
        })
        .collect()
}

#[async_trait]
impl SpeechSynthesisPort for FakeSpeechClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, SpeechEngineError> {
        let duration_ms = self.duration_ms(&request.prompt);
        // 多说话人时使用较低音高，便于区分
        let frequency = match request.speech {
            SpeechConfig::SingleVoice(_) => 440.0,
            SpeechConfig::MultiSpeaker(_) => 330.0,
        };

        tracing::debug!(
            prompt_len = request.prompt.len(),
            duration_ms = duration_ms,
            "FakeSpeechClient: generating tone"
        );

        tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;

        let samples = tone(duration_ms, frequency);
        let audio = bytes_to_base64(&pcm16_to_bytes(&float_to_pcm16(&samples)));
        Ok(SynthesisResponse { audio: Some(audio) })
    }
}
