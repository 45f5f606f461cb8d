//! Audio Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("音频负载解码失败: {0}")]
    Decode(String),
}
