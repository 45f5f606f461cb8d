//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（语音合成、实时代理、麦克风、音频输出、事件推送）
//! - commands: 剧本合成命令及处理器
//! - playback: 无缝排队播放
//! - live: 实时会话控制
//! - preview: 合成结果试听
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod live;
pub mod playback;
pub mod ports;
pub mod preview;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use commands::{
    handlers::SynthesizePodcastHandler, SynthesisMode, SynthesizePodcastCommand,
    SynthesizePodcastResponse,
};

pub use error::ApplicationError;

pub use live::{LiveSessionController, LiveSettings, LiveState, LiveStatus};

pub use playback::{PlaybackHandle, PlaybackScheduler};

pub use ports::{
    // Audio output
    AudioDeviceError,
    AudioOutputFactory,
    AudioOutputPort,
    ScheduledSound,
    SoundId,
    // Events
    StudioEvent,
    StudioEventSink,
    // Live agent
    LiveAgentError,
    LiveAgentPort,
    LiveConnection,
    LiveEvent,
    LiveSender,
    LiveServerMessage,
    LiveSetup,
    // Microphone
    CaptureError,
    CaptureRequest,
    CaptureStream,
    CaptureTracks,
    MicrophonePort,
    // Speech synthesis
    SpeakerVoice,
    SpeechConfig,
    SpeechEngineError,
    SpeechSynthesisPort,
    SynthesisRequest,
    SynthesisResponse,
};

pub use preview::PreviewPlayer;
