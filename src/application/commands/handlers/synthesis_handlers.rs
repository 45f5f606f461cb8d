//! Synthesis Command Handlers
//!
//! 剧本 → 表演指导提示词 → 远端合成 → base64 音频

use std::sync::Arc;

use crate::application::commands::synthesis_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    SpeakerVoice, SpeechConfig, SpeechEngineError, SpeechSynthesisPort, SynthesisRequest,
};
use crate::domain::direction::{assign_slots, multi_voice_prompt, single_voice_prompt, Slot};
use crate::domain::script::active_characters;

/// 远端拒绝多说话人配置时错误信息中出现的字段名
const MULTI_SPEAKER_CONFIG_FIELD: &str = "speakerVoiceConfigs";

/// SynthesizePodcast Handler
pub struct SynthesizePodcastHandler {
    engine: Arc<dyn SpeechSynthesisPort>,
    model: String,
}

impl SynthesizePodcastHandler {
    pub fn new(engine: Arc<dyn SpeechSynthesisPort>, model: impl Into<String>) -> Self {
        Self {
            engine,
            model: model.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: SynthesizePodcastCommand,
    ) -> Result<SynthesizePodcastResponse, ApplicationError> {
        let active = active_characters(&cmd.lines, &cmd.characters);
        if active.is_empty() {
            return Err(ApplicationError::EmptyScript);
        }
        for character in &active {
            character.validate()?;
        }

        let (mode, request) = if let [character] = active.as_slice() {
            let request = SynthesisRequest {
                model: self.model.clone(),
                prompt: single_voice_prompt(character, &cmd.lines),
                speech: SpeechConfig::SingleVoice(character.voice),
            };
            (SynthesisMode::SingleVoice, request)
        } else {
            let assignment = assign_slots(&active).ok_or(ApplicationError::EmptyScript)?;
            let request = SynthesisRequest {
                model: self.model.clone(),
                prompt: multi_voice_prompt(&assignment, &cmd.lines),
                speech: SpeechConfig::MultiSpeaker([Slot::A, Slot::B].map(|slot| SpeakerVoice {
                    speaker: slot.label().to_string(),
                    voice: assignment.voice(slot),
                })),
            };
            (SynthesisMode::MultiSpeaker, request)
        };

        tracing::info!(
            mode = mode.as_str(),
            lines = cmd.lines.len(),
            active_characters = active.len(),
            prompt_len = request.prompt.len(),
            "Submitting podcast synthesis"
        );

        let response = self
            .engine
            .synthesize(request)
            .await
            .map_err(|e| map_engine_error(mode, e))?;

        let audio = response
            .audio
            .filter(|audio| !audio.is_empty())
            .ok_or_else(|| {
                tracing::error!(mode = mode.as_str(), "Empty audio response");
                ApplicationError::EmptyAudioResponse
            })?;

        Ok(SynthesizePodcastResponse {
            audio,
            mode,
            active_characters: active.len(),
        })
    }
}

fn map_engine_error(mode: SynthesisMode, err: SpeechEngineError) -> ApplicationError {
    tracing::error!(mode = mode.as_str(), error = %err, "Podcast synthesis failed");
    match err {
        SpeechEngineError::MissingCredential => ApplicationError::MissingCredential,
        other => {
            let message = other.remote_message();
            if mode == SynthesisMode::MultiSpeaker && message.contains(MULTI_SPEAKER_CONFIG_FIELD) {
                ApplicationError::TooManyVoices(message)
            } else {
                ApplicationError::Synthesis(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::SynthesisResponse;
    use crate::domain::script::{Character, ScriptLine, VoiceName};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 记录请求并返回预设结果的合成引擎
    struct RecordingEngine {
        requests: Mutex<Vec<SynthesisRequest>>,
        reply: Mutex<Option<Result<SynthesisResponse, SpeechEngineError>>>,
    }

    impl RecordingEngine {
        fn replying(reply: Result<SynthesisResponse, SpeechEngineError>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                reply: Mutex::new(Some(reply)),
            })
        }

        fn with_audio(audio: &str) -> Arc<Self> {
            Self::replying(Ok(SynthesisResponse {
                audio: Some(audio.to_string()),
            }))
        }

        fn requests(&self) -> Vec<SynthesisRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpeechSynthesisPort for RecordingEngine {
        async fn synthesize(
            &self,
            request: SynthesisRequest,
        ) -> Result<SynthesisResponse, SpeechEngineError> {
            self.requests.lock().unwrap().push(request);
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(SpeechEngineError::InvalidResponse("no reply".into())))
        }
    }

    fn roster() -> Vec<Character> {
        vec![
            Character::new("1", "Narrador", VoiceName::Kore, "neutral", 1.0),
            Character::new("2", "Entrevistador", VoiceName::Puck, "mexican", 1.1),
            Character::new("3", "Invitada", VoiceName::Kore, "chilean", 0.8),
        ]
    }

    fn command(speakers: &[&str]) -> SynthesizePodcastCommand {
        SynthesizePodcastCommand {
            lines: speakers
                .iter()
                .enumerate()
                .map(|(i, id)| ScriptLine::new(i.to_string(), *id, format!("Línea {}", i)))
                .collect(),
            characters: roster(),
        }
    }

    #[tokio::test]
    async fn test_empty_script_fails_before_network() {
        let engine = RecordingEngine::with_audio("AAAA");
        let handler = SynthesizePodcastHandler::new(engine.clone(), "tts-model");

        let result = handler.handle(command(&[])).await;
        assert!(matches!(result, Err(ApplicationError::EmptyScript)));

        let result = handler.handle(command(&["unknown"])).await;
        assert!(matches!(result, Err(ApplicationError::EmptyScript)));
        assert!(engine.requests().is_empty());
    }

    #[tokio::test]
    async fn test_single_character_uses_single_voice() {
        let engine = RecordingEngine::with_audio("AAAA");
        let handler = SynthesizePodcastHandler::new(engine.clone(), "tts-model");

        let response = handler.handle(command(&["2", "2"])).await.unwrap();
        assert_eq!(response.mode, SynthesisMode::SingleVoice);
        assert_eq!(response.audio, "AAAA");
        assert_eq!(response.active_characters, 1);

        let requests = engine.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "tts-model");
        assert_eq!(requests[0].speech, SpeechConfig::SingleVoice(VoiceName::Puck));
        assert!(requests[0].prompt.contains("Character Profile: Entrevistador."));
        assert!(requests[0].prompt.ends_with("Línea 0\nLínea 1"));
    }

    #[tokio::test]
    async fn test_three_characters_use_exactly_two_slots() {
        let engine = RecordingEngine::with_audio("AAAA");
        let handler = SynthesizePodcastHandler::new(engine.clone(), "tts-model");

        let response = handler.handle(command(&["1", "3", "2", "1"])).await.unwrap();
        assert_eq!(response.mode, SynthesisMode::MultiSpeaker);
        assert_eq!(response.active_characters, 3);

        let requests = engine.requests();
        let SpeechConfig::MultiSpeaker(speakers) = &requests[0].speech else {
            panic!("expected multi speaker config");
        };
        assert_eq!(speakers[0].speaker, "Speaker A");
        assert_eq!(speakers[0].voice, VoiceName::Kore);
        assert_eq!(speakers[1].speaker, "Speaker B");
        // 角色 3 与 A 同音色，B 取第一个不同音色的角色 2
        assert_eq!(speakers[1].voice, VoiceName::Puck);
        assert!(requests[0].prompt.contains(
            "Script:\nSpeaker A: Línea 0\nSpeaker B: Línea 1\nSpeaker A: Línea 2\nSpeaker A: Línea 3"
        ));
    }

    #[tokio::test]
    async fn test_missing_audio() {
        let engine = RecordingEngine::replying(Ok(SynthesisResponse { audio: None }));
        let handler = SynthesizePodcastHandler::new(engine, "tts-model");

        let result = handler.handle(command(&["1"])).await;
        assert!(matches!(result, Err(ApplicationError::EmptyAudioResponse)));
    }

    #[tokio::test]
    async fn test_remote_errors_are_wrapped() {
        let engine = RecordingEngine::replying(Err(SpeechEngineError::ServiceError {
            status: 500,
            message: "backend exploded".to_string(),
        }));
        let handler = SynthesizePodcastHandler::new(engine, "tts-model");

        match handler.handle(command(&["1", "2"])).await {
            Err(ApplicationError::Synthesis(msg)) => assert_eq!(msg, "backend exploded"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multi_speaker_rejection_is_too_many_voices() {
        let reply = || {
            Err(SpeechEngineError::ServiceError {
                status: 400,
                message: "Invalid speakerVoiceConfigs: expected 2".to_string(),
            })
        };

        let handler = SynthesizePodcastHandler::new(RecordingEngine::replying(reply()), "m");
        let result = handler.handle(command(&["1", "2"])).await;
        assert!(matches!(result, Err(ApplicationError::TooManyVoices(_))));

        // 单音色请求不做此映射
        let handler = SynthesizePodcastHandler::new(RecordingEngine::replying(reply()), "m");
        let result = handler.handle(command(&["1"])).await;
        assert!(matches!(result, Err(ApplicationError::Synthesis(_))));
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let engine = RecordingEngine::replying(Err(SpeechEngineError::MissingCredential));
        let handler = SynthesizePodcastHandler::new(engine, "m");
        let result = handler.handle(command(&["1"])).await;
        assert!(matches!(result, Err(ApplicationError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_invalid_active_character() {
        let engine = RecordingEngine::with_audio("AAAA");
        let handler = SynthesizePodcastHandler::new(engine.clone(), "m");
        let mut cmd = command(&["1"]);
        cmd.characters[0].speed = 3.0;

        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
        assert!(engine.requests().is_empty());
    }
}
