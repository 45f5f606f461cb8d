//! Script Context - 剧本上下文
//!
//! 职责:
//! - 角色（音色、口音、语速）
//! - 台词行
//! - 可用音色 / 口音目录

mod entities;
mod errors;
mod value_objects;

pub use entities::{active_characters, Character, ScriptLine};
pub use errors::ScriptError;
pub use value_objects::{Accent, CharacterId, Gender, LineId, VoiceName, MAX_SPEED, MIN_SPEED};
