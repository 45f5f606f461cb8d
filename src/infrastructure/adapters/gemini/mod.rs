//! Gemini Adapter - 批量合成与实时会话

mod live_client;
mod speech_client;
mod wire;

pub use live_client::{GeminiLiveClient, GeminiLiveConfig};
pub use speech_client::{GeminiClientConfig, GeminiSpeechClient};
