//! Playback Scheduler - 无缝排队播放
//!
//! 基于音频输出的共享时钟，把依次到达的音频片段首尾相接地排入时间线：
//! - `enqueue`: 流式队列，起播时刻 = max(next_start, now)
//! - `interrupt_all`: 停止全部排队中的声音并重置时间线
//! - `play` / `stop_one`: 单缓冲区预览，不影响流式队列

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::application::ports::{AudioDeviceError, AudioOutputPort, ScheduledSound, SoundId};
use crate::domain::audio::AudioBuffer;

/// 已调度声音的句柄
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackHandle {
    id: SoundId,
    /// 计划起播时刻（时钟秒）
    start_at: f64,
}

impl PlaybackHandle {
    pub fn id(&self) -> SoundId {
        self.id
    }

    pub fn start_at(&self) -> f64 {
        self.start_at
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    /// 下一个片段的起播时刻
    next_start: f64,
    /// 流式队列中尚未结束的声音
    active: HashSet<SoundId>,
    /// 预览声音
    solo: HashSet<SoundId>,
}

/// Playback Scheduler
pub struct PlaybackScheduler {
    output: Arc<dyn AudioOutputPort>,
    state: Arc<Mutex<SchedulerState>>,
}

impl PlaybackScheduler {
    pub fn new(output: Arc<dyn AudioOutputPort>) -> Self {
        Self {
            output,
            state: Arc::new(Mutex::new(SchedulerState::default())),
        }
    }

    /// 排入流式队列，紧接上一个片段播放
    pub fn enqueue(&self, buffer: &AudioBuffer) -> Result<PlaybackHandle, AudioDeviceError> {
        let mut state = self.lock();
        let start_at = state.next_start.max(self.output.current_time());
        let sound = self.output.schedule(buffer, start_at)?;
        state.next_start = start_at + buffer.duration();
        state.active.insert(sound.id);
        let next_start = state.next_start;
        drop(state);

        tracing::debug!(
            sound_id = sound.id,
            start_at = start_at,
            next_start = next_start,
            "Audio fragment enqueued"
        );
        Ok(self.watch(sound, start_at))
    }

    /// 停止流式队列中的全部声音，时间线归零
    pub fn interrupt_all(&self) {
        let ids: Vec<SoundId> = {
            let mut state = self.lock();
            state.next_start = 0.0;
            state.active.drain().collect()
        };
        for id in &ids {
            self.output.stop(*id);
        }
        tracing::debug!(stopped = ids.len(), "Playback interrupted");
    }

    /// 预览：立即播放单个缓冲区
    pub fn play(&self, buffer: &AudioBuffer) -> Result<PlaybackHandle, AudioDeviceError> {
        let start_at = self.output.current_time();
        let sound = self.output.schedule(buffer, start_at)?;
        self.lock().solo.insert(sound.id);
        Ok(self.watch(sound, start_at))
    }

    /// 停止单个声音，已结束的句柄忽略
    pub fn stop_one(&self, handle: PlaybackHandle) {
        let known = {
            let mut state = self.lock();
            state.solo.remove(&handle.id) | state.active.remove(&handle.id)
        };
        if known {
            self.output.stop(handle.id);
        }
    }

    /// 声音是否仍在播放（或等待起播）
    pub fn is_playing(&self, handle: PlaybackHandle) -> bool {
        let state = self.lock();
        state.solo.contains(&handle.id) || state.active.contains(&handle.id)
    }

    pub fn next_start(&self) -> f64 {
        self.lock().next_start
    }

    /// 流式队列中尚未结束的声音数
    pub fn active_count(&self) -> usize {
        self.lock().active.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 声音自然结束后从集合中移除
    fn watch(&self, sound: ScheduledSound, start_at: f64) -> PlaybackHandle {
        let ScheduledSound { id, ended } = sound;
        let state: Weak<Mutex<SchedulerState>> = Arc::downgrade(&self.state);

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    let _ = ended.await;
                    if let Some(state) = state.upgrade() {
                        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                        state.active.remove(&id);
                        state.solo.remove(&id);
                    }
                });
            }
            Err(_) => {
                tracing::warn!(sound_id = id, "No runtime to watch sound completion");
            }
        }

        PlaybackHandle { id, start_at }
    }
}
