//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Audio Context: PCM 编解码与可播放缓冲区
//! - Script Context: 角色与台词
//!
//! 以及表演指导生成（口音 / 语速描述、A/B 槽位分配、提示词）

pub mod audio;
pub mod direction;
pub mod script;
