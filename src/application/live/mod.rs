//! Live Session - 实时语音会话
//!
//! 与远端语音代理的全双工对话：麦克风帧上行，合成音频下行无缝排队播放。

mod controller;
mod session;

pub use controller::LiveSessionController;
pub use session::{LiveSettings, LiveState, LiveStatus, STATUS_LOG_CAPACITY};
