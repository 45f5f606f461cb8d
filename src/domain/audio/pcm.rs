//! PCM Codec
//!
//! 浮点样本、16 位有符号整数样本与 base64 文本之间的转换。
//! 字节序统一为小端，单声道。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::AudioError;

/// f32 ↔ i16 的换算系数
pub const PCM16_SCALE: f32 = 32768.0;

/// f32 样本转 i16
///
/// 乘以 32768 后向零截断，不做钳位。超出 i16 范围的值按 16 位回绕
/// （1.0 → -32768），与类型化数组写入的行为一致。
pub fn float_to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * PCM16_SCALE) as i32 as i16)
        .collect()
}

/// i16 样本转 f32（除以 32768）
pub fn pcm16_to_float(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / PCM16_SCALE).collect()
}

/// i16 样本序列化为小端字节
pub fn pcm16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// 小端字节解析为 i16 样本
///
/// 奇数长度时补一个尾部零字节，最后一个样本的低字节为原字节、高字节为 0。
pub fn bytes_to_pcm16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks(2)
        .map(|pair| match *pair {
            [lo, hi] => i16::from_le_bytes([lo, hi]),
            [lo] => i16::from_le_bytes([lo, 0]),
            _ => 0,
        })
        .collect()
}

/// 字节编码为标准 base64（带填充，不换行）
pub fn bytes_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// 标准 base64 解码为 16 位对齐的字节缓冲
///
/// 解码结果为奇数长度时补一个尾部零字节。
pub fn base64_to_bytes(text: &str) -> Result<Vec<u8>, AudioError> {
    let mut bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| AudioError::Decode(e.to_string()))?;
    if bytes.len() % 2 != 0 {
        bytes.push(0);
    }
    Ok(bytes)
}

/// 实时会话上行音频帧
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PcmBlob {
    /// base64 编码的 16 位小端 PCM
    pub data: String,
    pub mime_type: String,
}

impl PcmBlob {
    /// 将一帧 f32 采集样本编码为线上格式
    pub fn from_samples(samples: &[f32], sample_rate: u32) -> Self {
        let pcm = float_to_pcm16(samples);
        Self {
            data: bytes_to_base64(&pcm16_to_bytes(&pcm)),
            mime_type: format!("audio/pcm;rate={}", sample_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_to_pcm16_truncates_toward_zero() {
        let pcm = float_to_pcm16(&[0.0, 0.5, -0.5, 0.99999, -0.00002, 0.00002]);
        assert_eq!(pcm, vec![0, 16384, -16384, 32767, 0, 0]);
    }

    #[test]
    fn test_float_to_pcm16_wraps_out_of_range() {
        // 不钳位：1.0 * 32768 = 32768 回绕为 -32768
        let pcm = float_to_pcm16(&[1.0, -1.0, 1.5]);
        assert_eq!(pcm, vec![-32768, -32768, -16384]);
    }

    #[test]
    fn test_round_trip_within_one_step() {
        let samples: Vec<f32> = (0..200).map(|i| -0.999 + i as f32 * 0.00999).collect();
        let restored = pcm16_to_float(&float_to_pcm16(&samples));
        for (a, b) in samples.iter().zip(restored.iter()) {
            assert!((a - b).abs() <= 1.0 / PCM16_SCALE, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_bytes_little_endian() {
        let bytes = pcm16_to_bytes(&[1, -2, 0x1234]);
        assert_eq!(bytes, vec![0x01, 0x00, 0xFE, 0xFF, 0x34, 0x12]);
        assert_eq!(bytes_to_pcm16(&bytes), vec![1, -2, 0x1234]);
    }

    #[test]
    fn test_odd_bytes_pad_low_byte() {
        assert_eq!(bytes_to_pcm16(&[0x01, 0x00, 0x7F]), vec![1, 0x007F]);
    }

    #[test]
    fn test_base64_even_round_trip() {
        let bytes = vec![0u8, 1, 2, 3, 254, 255];
        let text = bytes_to_base64(&bytes);
        assert_eq!(text, "AAECA/7/");
        assert_eq!(base64_to_bytes(&text).unwrap(), bytes);
    }

    #[test]
    fn test_base64_odd_length_is_padded() {
        let text = bytes_to_base64(&[9, 8, 7]);
        assert_eq!(text, "CQgH");
        assert_eq!(base64_to_bytes(&text).unwrap(), vec![9, 8, 7, 0]);
    }

    #[test]
    fn test_base64_malformed() {
        assert!(matches!(
            base64_to_bytes("not base64!!"),
            Err(AudioError::Decode(_))
        ));
    }

    #[test]
    fn test_pcm_blob_wire_format() {
        let blob = PcmBlob::from_samples(&[0.0, 0.5], 16000);
        assert_eq!(blob.mime_type, "audio/pcm;rate=16000");
        assert_eq!(blob.data, bytes_to_base64(&[0x00, 0x00, 0x00, 0x40]));

        let json = serde_json::to_value(&blob).unwrap();
        assert_eq!(json["mimeType"], "audio/pcm;rate=16000");
    }
}
