//! Audio Context - 音频上下文
//!
//! 职责:
//! - PCM 编解码（f32 ↔ i16 ↔ 字节 ↔ base64）
//! - base64 音频负载解码为可播放缓冲区
//! - 重采样与下混

mod buffer;
mod errors;
mod pcm;
mod resample;

pub use buffer::{decode_audio, AudioBuffer, CAPTURE_SAMPLE_RATE, SYNTHESIS_SAMPLE_RATE};
pub use errors::AudioError;
pub use pcm::{
    base64_to_bytes, bytes_to_base64, bytes_to_pcm16, float_to_pcm16, pcm16_to_bytes,
    pcm16_to_float, PcmBlob, PCM16_SCALE,
};
pub use resample::{downmix_to_mono, resample_nearest};
