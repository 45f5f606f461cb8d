//! Gemini Speech Client - 批量语音合成
//!
//! 实现 SpeechSynthesisPort，调用 generateContent 接口一次性合成整段音频
//!
//! POST {base_url}/v1beta/models/{model}:generateContent
//! Header: x-goog-api-key
//! Response: candidates[0].content.parts[0].inlineData.data (base64 PCM16 @ 24kHz)

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::wire::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::application::ports::{
    SpeechEngineError, SpeechSynthesisPort, SynthesisRequest, SynthesisResponse,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini 客户端配置
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    /// 访问凭据，缺失时每次调用返回 MissingCredential
    pub api_key: Option<String>,
    /// REST 基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for GeminiClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 120,
        }
    }
}

impl GeminiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Gemini 批量合成客户端
pub struct GeminiSpeechClient {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiSpeechClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, SpeechEngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpeechEngineError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    fn api_key(&self) -> Result<&str, SpeechEngineError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SpeechEngineError::MissingCredential)
    }
}

#[async_trait]
impl SpeechSynthesisPort for GeminiSpeechClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, SpeechEngineError> {
        let api_key = self.api_key()?;
        let url = self.generate_url(&request.model);
        let body = GenerateContentRequest::speech(&request.prompt, &request.speech);

        tracing::debug!(
            url = %url,
            prompt_len = request.prompt.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SpeechEngineError::Timeout
                } else if e.is_connect() {
                    SpeechEngineError::NetworkError(format!(
                        "Cannot connect to speech service: {}",
                        e
                    ))
                } else {
                    SpeechEngineError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(error_text);
            return Err(SpeechEngineError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SpeechEngineError::InvalidResponse(e.to_string()))?;
        let audio = payload.first_audio();

        tracing::info!(
            model = %request.model,
            audio_len = audio.as_ref().map(String::len).unwrap_or(0),
            "Speech synthesis completed"
        );

        Ok(SynthesisResponse { audio })
    }

    async fn health_check(&self) -> bool {
        self.api_key().is_ok()
    }
}
