//! Synthesis Commands - 剧本合成命令

use crate::domain::script::{Character, ScriptLine};

/// 合成整部剧本的音频
#[derive(Debug, Clone)]
pub struct SynthesizePodcastCommand {
    /// 台词（顺序即朗读顺序）
    pub lines: Vec<ScriptLine>,
    /// 角色表
    pub characters: Vec<Character>,
}

/// 合成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    SingleVoice,
    MultiSpeaker,
}

impl SynthesisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleVoice => "single_voice",
            Self::MultiSpeaker => "multi_speaker",
        }
    }
}

/// 合成响应
#[derive(Debug, Clone)]
pub struct SynthesizePodcastResponse {
    /// base64 PCM16 @ 24kHz
    pub audio: String,
    pub mode: SynthesisMode,
    /// 出场角色数
    pub active_characters: usize,
}
