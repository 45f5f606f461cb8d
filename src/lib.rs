//! Podcast Studio - 多角色播客合成与实时语音会话
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Audio: PCM16 编解码、音频缓冲区、重采样
//! - Script: 角色、台词、音色与口音目录
//! - Direction: 表演指导提示词与说话人槽位分配
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SpeechSynthesis, LiveAgent, Microphone, AudioOutput, EventSink）
//! - Commands: 剧本合成命令处理器
//! - Playback: 无缝排队播放
//! - Live: 实时会话控制器
//! - Preview: 合成结果试听
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Adapters: Gemini 批量合成与实时会话客户端、离线合成引擎
//! - Audio: 虚拟输出与 cpal 声卡后端
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
