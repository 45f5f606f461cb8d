//! Application State
//!
//! 合成处理器、试听播放器与实时会话控制器的共享状态

use std::sync::Arc;

use crate::application::{
    AudioOutputPort, LiveSessionController, PreviewPlayer, SpeechSynthesisPort,
    SynthesizePodcastHandler,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub speech_engine: Arc<dyn SpeechSynthesisPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub synthesize_handler: SynthesizePodcastHandler,

    // ========== Players / Sessions ==========
    pub preview: PreviewPlayer,
    pub live: LiveSessionController,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        speech_engine: Arc<dyn SpeechSynthesisPort>,
        tts_model: impl Into<String>,
        preview_output: Arc<dyn AudioOutputPort>,
        live: LiveSessionController,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            speech_engine: speech_engine.clone(),
            event_publisher,
            synthesize_handler: SynthesizePodcastHandler::new(speech_engine, tts_model),
            preview: PreviewPlayer::new(preview_output),
            live,
        }
    }
}
