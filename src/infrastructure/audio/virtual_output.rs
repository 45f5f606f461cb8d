//! Virtual Audio Output - 无设备音频输出
//!
//! 以 tokio 时间为时钟，声音在计划时长后"播完"，不产生实际声音。
//! 用于无声卡的服务器部署与测试。

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::application::ports::{
    AudioDeviceError, AudioOutputFactory, AudioOutputPort, ScheduledSound, SoundId,
};
use crate::domain::audio::AudioBuffer;

/// 虚拟音频输出
pub struct VirtualAudioOutput {
    origin: Instant,
    next_id: AtomicU64,
    /// 未结束的声音，任务在声音结束时完成
    sounds: DashMap<SoundId, JoinHandle<()>>,
    closed: AtomicBool,
}

impl VirtualAudioOutput {
    pub fn new(sample_rate: u32) -> Self {
        tracing::debug!(sample_rate = sample_rate, "Virtual audio output opened");
        Self {
            origin: Instant::now(),
            next_id: AtomicU64::new(0),
            sounds: DashMap::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// 正在播放或等待起播的声音数
    pub fn playing(&self) -> usize {
        self.sounds.iter().filter(|s| !s.value().is_finished()).count()
    }
}

impl AudioOutputPort for VirtualAudioOutput {
    fn current_time(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn schedule(
        &self,
        buffer: &AudioBuffer,
        start_at: f64,
    ) -> Result<ScheduledSound, AudioDeviceError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AudioDeviceError::Closed);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AudioDeviceError::StreamError(e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let wait = (start_at - self.current_time()).max(0.0);
        let end_at = Duration::from_secs_f64(wait + buffer.duration());
        let (tx, rx) = oneshot::channel();

        let task = runtime.spawn(async move {
            tokio::time::sleep(end_at).await;
            let _ = tx.send(());
        });

        self.sounds.retain(|_, task| !task.is_finished());
        self.sounds.insert(id, task);

        tracing::trace!(
            sound_id = id,
            start_at = start_at,
            duration = buffer.duration(),
            "Virtual sound scheduled"
        );
        Ok(ScheduledSound { id, ended: rx })
    }

    fn stop(&self, id: SoundId) {
        if let Some((_, task)) = self.sounds.remove(&id) {
            task.abort();
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.sounds.retain(|_, task| {
            task.abort();
            false
        });
        tracing::debug!("Virtual audio output closed");
    }
}

/// 虚拟音频输出工厂
#[derive(Debug, Default)]
pub struct VirtualOutputFactory;

#[async_trait]
impl AudioOutputFactory for VirtualOutputFactory {
    async fn open(&self, sample_rate: u32) -> Result<Arc<dyn AudioOutputPort>, AudioDeviceError> {
        Ok(Arc::new(VirtualAudioOutput::new(sample_rate)))
    }
}
