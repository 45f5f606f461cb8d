//! 应用层 - 命令（写操作）
//!
//! 剧本合成命令

mod synthesis_commands;

pub mod handlers;

pub use synthesis_commands::*;
