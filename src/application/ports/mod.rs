//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_output;
mod event_sink;
mod live_agent;
mod microphone;
mod speech_synthesis;

pub use audio_output::{
    AudioDeviceError, AudioOutputFactory, AudioOutputPort, ScheduledSound, SoundId,
};
pub use event_sink::{StudioEvent, StudioEventSink};
pub use live_agent::{
    LiveAgentError, LiveAgentPort, LiveConnection, LiveEvent, LiveSender, LiveServerMessage,
    LiveSetup,
};
pub use microphone::{CaptureError, CaptureRequest, CaptureStream, CaptureTracks, MicrophonePort};
pub use speech_synthesis::{
    SpeakerVoice, SpeechConfig, SpeechEngineError, SpeechSynthesisPort, SynthesisRequest,
    SynthesisResponse,
};
