//! Speech Adapter - 离线合成引擎

mod fake_speech_client;

pub use fake_speech_client::{FakeSpeechClient, FakeSpeechClientConfig};
