//! Gemini 协议报文
//!
//! generateContent（批量）与 BidiGenerateContent（实时）共用的 JSON 结构，字段为 camelCase

use serde::{Deserialize, Serialize};

use crate::application::ports::{LiveServerMessage, SpeakerVoice, SpeechConfig};
use crate::domain::audio::PcmBlob;
use crate::domain::script::VoiceName;

/// 仅请求音频输出
const AUDIO_MODALITY: &str = "AUDIO";

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, rename = "inlineData", skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

impl VoiceConfig {
    pub fn prebuilt(voice: VoiceName) -> Self {
        Self {
            prebuilt_voice_config: PrebuiltVoiceConfig {
                voice_name: voice.as_str().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerVoiceConfig {
    pub speaker: String,
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MultiSpeakerVoiceConfig {
    pub speaker_voice_configs: Vec<SpeakerVoiceConfig>,
}

/// speechConfig：单音色与多说话人二选一
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireSpeechConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_config: Option<VoiceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_speaker_voice_config: Option<MultiSpeakerVoiceConfig>,
}

impl From<&SpeechConfig> for WireSpeechConfig {
    fn from(config: &SpeechConfig) -> Self {
        match config {
            SpeechConfig::SingleVoice(voice) => Self {
                voice_config: Some(VoiceConfig::prebuilt(*voice)),
                multi_speaker_voice_config: None,
            },
            SpeechConfig::MultiSpeaker(speakers) => Self {
                voice_config: None,
                multi_speaker_voice_config: Some(MultiSpeakerVoiceConfig {
                    speaker_voice_configs: speakers.iter().map(speaker_voice_config).collect(),
                }),
            },
        }
    }
}

fn speaker_voice_config(speaker: &SpeakerVoice) -> SpeakerVoiceConfig {
    SpeakerVoiceConfig {
        speaker: speaker.speaker.clone(),
        voice_config: VoiceConfig::prebuilt(speaker.voice),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    pub speech_config: WireSpeechConfig,
}

impl GenerationConfig {
    pub fn audio(speech_config: WireSpeechConfig) -> Self {
        Self {
            response_modalities: vec![AUDIO_MODALITY.to_string()],
            speech_config,
        }
    }
}

// ============================================================================
// generateContent
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    pub fn speech(prompt: &str, speech: &SpeechConfig) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text(prompt)],
            }],
            generation_config: GenerationConfig::audio(speech.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// 首个候选、首个片段的内联音频
    pub fn first_audio(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .inline_data
            .map(|inline| inline.data)
            .filter(|data| !data.is_empty())
    }
}

/// 错误响应 `{error: {code, message, status}}`，只取 message
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// BidiGenerateContent
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSetupMessage {
    pub setup: LiveSetupBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSetupBody {
    pub model: String,
    pub generation_config: GenerationConfig,
    pub system_instruction: Content,
}

impl LiveSetupMessage {
    pub fn new(model: &str, system_instruction: &str, voice: VoiceName) -> Self {
        let model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        Self {
            setup: LiveSetupBody {
                model,
                generation_config: GenerationConfig::audio(WireSpeechConfig::from(
                    &SpeechConfig::SingleVoice(voice),
                )),
                system_instruction: Content {
                    role: None,
                    parts: vec![Part::text(system_instruction)],
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInputMessage<'a> {
    pub realtime_input: RealtimeInput<'a>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput<'a> {
    pub media_chunks: [&'a PcmBlob; 1],
}

impl<'a> RealtimeInputMessage<'a> {
    pub fn audio(chunk: &'a PcmBlob) -> Self {
        Self {
            realtime_input: RealtimeInput {
                media_chunks: [chunk],
            },
        }
    }
}

/// 服务端下行消息（只取用到的字段）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveServerFrame {
    #[serde(default)]
    pub setup_complete: Option<serde_json::Value>,
    #[serde(default)]
    pub server_content: Option<ServerContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    #[serde(default)]
    pub model_turn: Option<Content>,
    #[serde(default)]
    pub interrupted: bool,
    #[serde(default)]
    pub turn_complete: bool,
}

/// 解析后的下行帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveFrame {
    SetupComplete,
    Content(LiveServerMessage),
    Ignored,
}

/// 解析一条下行 JSON 文本
pub fn parse_live_frame(text: &str) -> Result<LiveFrame, serde_json::Error> {
    let frame: LiveServerFrame = serde_json::from_str(text)?;
    if frame.setup_complete.is_some() {
        return Ok(LiveFrame::SetupComplete);
    }
    let Some(content) = frame.server_content else {
        return Ok(LiveFrame::Ignored);
    };

    let audio = content
        .model_turn
        .and_then(|turn| turn.parts.into_iter().find_map(|part| part.inline_data))
        .map(|inline| inline.data)
        .filter(|data| !data.is_empty());

    Ok(LiveFrame::Content(LiveServerMessage {
        audio,
        interrupted: content.interrupted,
        turn_complete: content.turn_complete,
    }))
}
