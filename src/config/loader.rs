//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// API key 的后备环境变量，按顺序查找
const API_KEY_FALLBACK_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `STUDIO_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `STUDIO_SERVER__PORT=8080`
/// - `STUDIO_GEMINI__OFFLINE=true`
/// - `STUDIO_LIVE__VOICE=Kore`
/// - `STUDIO_AUDIO__BACKEND=device`
/// - `GEMINI_API_KEY=...`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("gemini.timeout_secs", 120)?
        .set_default("gemini.offline", false)?
        .set_default("live.voice", "Puck")?
        .set_default("live.frame_size", 4096)?
        .set_default("live.input_sample_rate", 16000)?
        .set_default("live.output_sample_rate", 24000)?
        .set_default("audio.backend", "virtual")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: STUDIO_GEMINI__LIVE_MODEL=...
    builder = builder.add_source(
        Environment::with_prefix("STUDIO")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    apply_api_key_fallback(&mut app_config, |name| std::env::var(name).ok());

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 未显式配置 API key 时从后备环境变量读取
fn apply_api_key_fallback(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if config.gemini.has_api_key() {
        return;
    }
    config.gemini.api_key = API_KEY_FALLBACK_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|key| !key.trim().is_empty());
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    let required = [
        ("gemini.base_url", &config.gemini.base_url),
        ("gemini.live_url", &config.gemini.live_url),
        ("gemini.tts_model", &config.gemini.tts_model),
        ("gemini.live_model", &config.gemini.live_model),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    if !config.live.frame_size.is_power_of_two() {
        return Err(ConfigError::ValidationError(format!(
            "live.frame_size must be a power of two, got {}",
            config.live.frame_size
        )));
    }

    if config.live.input_sample_rate == 0 || config.live.output_sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Sample rates cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Gemini Base URL: {}", config.gemini.base_url);
    tracing::info!("Gemini Timeout: {}s", config.gemini.timeout_secs);
    tracing::info!("TTS Model: {}", config.gemini.tts_model);
    tracing::info!("Live Model: {}", config.gemini.live_model);
    tracing::info!("API Key: {}", if config.gemini.has_api_key() { "set" } else { "missing" });
    tracing::info!("Offline Synthesis: {}", config.gemini.offline);
    tracing::info!("Live Voice: {}", config.live.voice);
    tracing::info!(
        "Live Audio: frame={} in={}Hz out={}Hz",
        config.live.frame_size,
        config.live.input_sample_rate,
        config.live.output_sample_rate
    );
    tracing::info!("Audio Backend: {}", config.audio.backend.as_str());
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
