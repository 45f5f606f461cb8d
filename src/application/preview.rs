//! Preview Player - 合成结果试听
//!
//! 持有最近一次合成的音频，提供播放 / 停止切换与 WAV 导出

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::error::ApplicationError;
use crate::application::playback::{PlaybackHandle, PlaybackScheduler};
use crate::application::ports::AudioOutputPort;
use crate::domain::audio::AudioBuffer;

#[derive(Default)]
struct PreviewState {
    buffer: Option<AudioBuffer>,
    handle: Option<PlaybackHandle>,
}

/// Preview Player
pub struct PreviewPlayer {
    scheduler: PlaybackScheduler,
    state: Mutex<PreviewState>,
}

impl PreviewPlayer {
    pub fn new(output: Arc<dyn AudioOutputPort>) -> Self {
        Self {
            scheduler: PlaybackScheduler::new(output),
            state: Mutex::new(PreviewState::default()),
        }
    }

    /// 载入新的音频，停止正在播放的旧音频
    pub fn load(&self, buffer: AudioBuffer) {
        let mut state = self.lock();
        self.halt(&mut state);
        tracing::debug!(duration_ms = buffer.duration_ms(), "Preview loaded");
        state.buffer = Some(buffer);
    }

    /// 停止并清空
    pub fn clear(&self) {
        let mut state = self.lock();
        self.halt(&mut state);
        state.buffer = None;
    }

    /// 播放 / 停止切换，返回切换后是否在播放
    pub fn toggle(&self) -> Result<bool, ApplicationError> {
        let mut state = self.lock();
        if self.playing(&state) {
            self.halt(&mut state);
            return Ok(false);
        }
        let buffer = state
            .buffer
            .as_ref()
            .ok_or_else(|| ApplicationError::invalid_state("no audio generated yet"))?;
        let handle = self
            .scheduler
            .play(buffer)
            .map_err(|e| ApplicationError::invalid_state(e.to_string()))?;
        state.handle = Some(handle);
        Ok(true)
    }

    pub fn stop(&self) {
        let mut state = self.lock();
        self.halt(&mut state);
    }

    pub fn is_playing(&self) -> bool {
        let state = self.lock();
        self.playing(&state)
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().buffer.is_some()
    }

    /// 导出已载入音频为 WAV
    pub fn wav(&self) -> Option<Vec<u8>> {
        self.lock().buffer.as_ref().map(AudioBuffer::to_wav)
    }

    fn lock(&self) -> MutexGuard<'_, PreviewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn playing(&self, state: &PreviewState) -> bool {
        state
            .handle
            .is_some_and(|handle| self.scheduler.is_playing(handle))
    }

    fn halt(&self, state: &mut PreviewState) {
        if let Some(handle) = state.handle.take() {
            self.scheduler.stop_one(handle);
        }
    }
}
