//! Script Context - Errors

use thiserror::Error;

use super::CharacterId;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("无效的角色名称: {0}")]
    InvalidName(CharacterId),

    #[error("语速超出范围 [0.5, 1.5]: {speed} (角色 {id})")]
    SpeedOutOfRange { id: CharacterId, speed: f32 },
}
