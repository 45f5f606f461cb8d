//! Audio Backends - 音频输出与采集实现
//!
//! - virtual: 以 tokio 时间为时钟的无设备输出，服务器部署默认使用
//! - device: 基于 cpal 的声卡输出与麦克风采集（feature `device-audio`）

#[cfg(feature = "device-audio")]
mod cpal_device;
mod unavailable_microphone;
mod virtual_output;

#[cfg(feature = "device-audio")]
pub use cpal_device::{CpalAudioOutput, CpalMicrophone, CpalOutputFactory};
pub use unavailable_microphone::UnavailableMicrophone;
pub use virtual_output::{VirtualAudioOutput, VirtualOutputFactory};
