//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

use crate::domain::audio::{CAPTURE_SAMPLE_RATE, SYNTHESIS_SAMPLE_RATE};
use crate::domain::script::VoiceName;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini 服务配置
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// 实时会话配置
    #[serde(default)]
    pub live: LiveConfig,

    /// 音频后端配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Gemini 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API key，未设置时依次读取 `GEMINI_API_KEY`、`API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// REST 基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 实时会话 WebSocket 端点
    #[serde(default = "default_live_url")]
    pub live_url: String,

    /// 批量合成模型
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// 实时会话模型
    #[serde(default = "default_live_model")]
    pub live_model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// 离线模式：批量合成使用本地提示音引擎
    #[serde(default)]
    pub offline: bool,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_live_url() -> String {
    "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_live_model() -> String {
    "gemini-2.5-flash-native-audio-preview-09-2025".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            live_url: default_live_url(),
            tts_model: default_tts_model(),
            live_model: default_live_model(),
            timeout_secs: default_timeout(),
            offline: false,
        }
    }
}

impl GeminiConfig {
    /// 是否配置了非空 API key
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// 实时会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    /// 主持人人设（系统指令）
    #[serde(default = "default_persona")]
    pub persona: String,

    /// 主持人音色
    #[serde(default = "default_live_voice")]
    pub voice: VoiceName,

    /// 每帧采样数，必须是 2 的幂
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,

    /// 上行采样率（Hz）
    #[serde(default = "default_input_rate")]
    pub input_sample_rate: u32,

    /// 下行采样率（Hz）
    #[serde(default = "default_output_rate")]
    pub output_sample_rate: u32,
}

fn default_persona() -> String {
    "Eres un co-anfitrión de podcast creativo y entusiasta. Ayuda al usuario a hacer una lluvia de ideas para su próximo episodio.".to_string()
}

fn default_live_voice() -> VoiceName {
    VoiceName::Puck
}

fn default_frame_size() -> usize {
    4096
}

fn default_input_rate() -> u32 {
    CAPTURE_SAMPLE_RATE
}

fn default_output_rate() -> u32 {
    SYNTHESIS_SAMPLE_RATE
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            voice: default_live_voice(),
            frame_size: default_frame_size(),
            input_sample_rate: default_input_rate(),
            output_sample_rate: default_output_rate(),
        }
    }
}

/// 音频后端
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioBackend {
    /// 无设备输出，没有麦克风
    #[default]
    Virtual,
    /// 声卡（需要 `device-audio` feature）
    Device,
}

impl AudioBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Virtual => "virtual",
            Self::Device => "device",
        }
    }
}

/// 音频配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub backend: AudioBackend,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5070);
        assert_eq!(config.gemini.tts_model, "gemini-2.5-flash-preview-tts");
        assert_eq!(config.live.voice, VoiceName::Puck);
        assert_eq!(config.live.frame_size, 4096);
        assert_eq!(config.audio.backend, AudioBackend::Virtual);
        assert!(!config.gemini.offline);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5070");
    }

    #[test]
    fn test_has_api_key() {
        let mut config = GeminiConfig::default();
        assert!(!config.has_api_key());
        config.api_key = Some("   ".to_string());
        assert!(!config.has_api_key());
        config.api_key = Some("secret".to_string());
        assert!(config.has_api_key());
    }
}
