//! Audio Buffer Decoder
//!
//! base64 PCM 负载 → 可播放的单声道 f32 缓冲区

use std::sync::Arc;

use super::pcm::{base64_to_bytes, bytes_to_pcm16, float_to_pcm16, pcm16_to_float};
use super::AudioError;

/// 合成音频采样率（批量合成与实时会话下行）
pub const SYNTHESIS_SAMPLE_RATE: u32 = 24000;

/// 麦克风上行采样率
pub const CAPTURE_SAMPLE_RATE: u32 = 16000;

/// 可播放音频缓冲区
///
/// 不变量:
/// - 单声道
/// - 样本值位于 [-1, 1]
/// - 样本数据不可变，克隆只增加引用计数
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// 共享的样本数据（供播放设备持有）
    pub fn shared_samples(&self) -> Arc<[f32]> {
        self.samples.clone()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 时长（秒）
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// 时长（毫秒）
    pub fn duration_ms(&self) -> u64 {
        (self.duration() * 1000.0).round() as u64
    }

    /// 导出为 16 位单声道 WAV
    pub fn to_wav(&self) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let num_channels: u16 = 1;
        let byte_rate = self.sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
        let block_align = num_channels * (bits_per_sample / 8);

        let pcm_data = float_to_pcm16(&self.samples);
        let data_size = pcm_data.len() * 2;
        let file_size = 36 + data_size;

        let mut wav = Vec::with_capacity(44 + data_size);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(file_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&num_channels.to_le_bytes());
        wav.extend_from_slice(&self.sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());
        for sample in pcm_data {
            wav.extend_from_slice(&sample.to_le_bytes());
        }

        wav
    }
}

/// 解码 base64 音频负载
///
/// 负载视为单声道 16 位小端 PCM。纯函数，仅在 base64 格式错误时失败。
pub fn decode_audio(payload: &str, sample_rate: u32) -> Result<AudioBuffer, AudioError> {
    let bytes = base64_to_bytes(payload)?;
    let pcm = bytes_to_pcm16(&bytes);
    Ok(AudioBuffer::new(pcm16_to_float(&pcm), sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::pcm::{bytes_to_base64, pcm16_to_bytes};

    fn encode(samples: &[i16]) -> String {
        bytes_to_base64(&pcm16_to_bytes(samples))
    }

    #[test]
    fn test_decode_sample_count_and_rate() {
        let payload = encode(&[0, 16384, -16384, -32768]);
        let buffer = decode_audio(&payload, SYNTHESIS_SAMPLE_RATE).unwrap();

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.sample_rate(), 24000);
        assert_eq!(buffer.samples(), &[0.0, 0.5, -0.5, -1.0]);
    }

    #[test]
    fn test_decode_odd_payload() {
        // 3 字节 → 2 个样本，最后一个高字节补 0
        let payload = bytes_to_base64(&[0x00, 0x40, 0x10]);
        let buffer = decode_audio(&payload, SYNTHESIS_SAMPLE_RATE).unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.samples()[1], 16.0 / 32768.0);
    }

    #[test]
    fn test_decode_malformed() {
        assert!(decode_audio("%%%", SYNTHESIS_SAMPLE_RATE).is_err());
    }

    #[test]
    fn test_duration() {
        let buffer = AudioBuffer::new(vec![0.0; 48000], 24000);
        assert_eq!(buffer.duration(), 2.0);
        assert_eq!(buffer.duration_ms(), 2000);
        assert_eq!(AudioBuffer::new(Vec::new(), 0).duration(), 0.0);
    }

    #[test]
    fn test_wav_export() {
        let payload = encode(&[1, -1, 300]);
        let buffer = decode_audio(&payload, 24000).unwrap();
        let wav = buffer.to_wav();

        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 24000);
        assert_eq!(&wav[44..], &pcm16_to_bytes(&[1, -1, 300])[..]);
    }
}
