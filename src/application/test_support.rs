//! 测试用端口实现

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

use crate::application::ports::{
    AudioDeviceError, AudioOutputFactory, AudioOutputPort, CaptureError, CaptureRequest,
    CaptureStream, CaptureTracks, LiveAgentError, LiveAgentPort, LiveConnection, LiveEvent,
    LiveSender, LiveSetup, MicrophonePort, ScheduledSound, SoundId, StudioEvent,
    StudioEventSink,
};
use crate::domain::audio::{AudioBuffer, PcmBlob};

/// 让出执行权，等待已派发的任务运行
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Audio output
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledRecord {
    pub id: SoundId,
    pub start_at: f64,
    pub duration: f64,
}

/// 手动时钟的音频输出
#[derive(Default)]
pub struct FakeAudioOutput {
    clock: Mutex<f64>,
    next_id: AtomicU64,
    scheduled: Mutex<Vec<ScheduledRecord>>,
    stopped: Mutex<Vec<SoundId>>,
    ended: Mutex<HashMap<SoundId, oneshot::Sender<()>>>,
    closed: AtomicBool,
}

impl FakeAudioOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_time(&self, seconds: f64) {
        *self.clock.lock().unwrap() = seconds;
    }

    pub fn scheduled(&self) -> Vec<ScheduledRecord> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn stopped(&self) -> Vec<SoundId> {
        self.stopped.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// 模拟自然播放结束
    pub fn finish(&self, id: SoundId) {
        if let Some(tx) = self.ended.lock().unwrap().remove(&id) {
            let _ = tx.send(());
        }
    }
}

impl AudioOutputPort for FakeAudioOutput {
    fn current_time(&self) -> f64 {
        *self.clock.lock().unwrap()
    }

    fn schedule(
        &self,
        buffer: &AudioBuffer,
        start_at: f64,
    ) -> Result<ScheduledSound, AudioDeviceError> {
        if self.is_closed() {
            return Err(AudioDeviceError::Closed);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = oneshot::channel();
        self.ended.lock().unwrap().insert(id, tx);
        self.scheduled.lock().unwrap().push(ScheduledRecord {
            id,
            start_at,
            duration: buffer.duration(),
        });
        Ok(ScheduledSound { id, ended: rx })
    }

    fn stop(&self, id: SoundId) {
        self.stopped.lock().unwrap().push(id);
        self.finish(id);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.ended.lock().unwrap().clear();
    }
}

pub struct FakeOutputFactory {
    pub outputs: Mutex<Vec<Arc<FakeAudioOutput>>>,
    pub fail: AtomicBool,
    /// open 在收到信号前挂起
    pub gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeOutputFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            gate: Mutex::new(None),
        })
    }

    /// 让下一次 open 挂起，返回放行信号
    pub fn hold_open(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn last(&self) -> Option<Arc<FakeAudioOutput>> {
        self.outputs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AudioOutputFactory for FakeOutputFactory {
    async fn open(&self, _sample_rate: u32) -> Result<Arc<dyn AudioOutputPort>, AudioDeviceError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AudioDeviceError::NoDevice("fake".into()));
        }
        let output = FakeAudioOutput::new();
        self.outputs.lock().unwrap().push(output.clone());
        Ok(output)
    }
}

// ============================================================================
// Microphone
// ============================================================================

pub struct FakeTracks {
    stops: Arc<AtomicUsize>,
}

impl CaptureTracks for FakeTracks {
    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// 通过 `frames` 发送端手动推送采集帧
pub struct FakeMicrophone {
    pub frames: Mutex<Option<mpsc::Sender<Vec<f32>>>>,
    pub track_stops: Arc<AtomicUsize>,
    pub requests: Mutex<Vec<CaptureRequest>>,
    pub deny: AtomicBool,
}

impl FakeMicrophone {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            frames: Mutex::new(None),
            track_stops: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
            deny: AtomicBool::new(false),
        })
    }

    pub async fn push_frame(&self, frame: Vec<f32>) {
        let tx = self.frames.lock().unwrap().clone();
        if let Some(tx) = tx {
            let _ = tx.send(frame).await;
        }
    }

    pub fn track_stops(&self) -> usize {
        self.track_stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MicrophonePort for FakeMicrophone {
    async fn open(&self, request: CaptureRequest) -> Result<CaptureStream, CaptureError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(CaptureError::PermissionDenied("denied by test".into()));
        }
        self.requests.lock().unwrap().push(request);
        let (tx, rx) = mpsc::channel(16);
        *self.frames.lock().unwrap() = Some(tx);
        Ok(CaptureStream {
            frames: rx,
            tracks: Box::new(FakeTracks {
                stops: self.track_stops.clone(),
            }),
            has_video: request.video,
        })
    }
}

// ============================================================================
// Live agent
// ============================================================================

#[derive(Default)]
pub struct FakeSender {
    pub sent: Mutex<Vec<PcmBlob>>,
    pub closed: AtomicBool,
}

#[async_trait]
impl LiveSender for FakeSender {
    async fn send_audio(&self, chunk: PcmBlob) -> Result<(), LiveAgentError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(LiveAgentError::Closed);
        }
        self.sent.lock().unwrap().push(chunk);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// 通过 `events` 发送端手动推送服务端事件
pub struct FakeLiveAgent {
    pub events: Mutex<Option<mpsc::Sender<LiveEvent>>>,
    pub sender: Arc<FakeSender>,
    pub setups: Mutex<Vec<LiveSetup>>,
    pub fail: AtomicBool,
    /// connect 在收到信号前挂起
    pub gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeLiveAgent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(None),
            sender: Arc::new(FakeSender::default()),
            setups: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            gate: Mutex::new(None),
        })
    }

    /// 让下一次 connect 挂起，返回放行信号
    pub fn hold_connect(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub async fn emit(&self, event: LiveEvent) {
        let tx = self.events.lock().unwrap().clone();
        if let Some(tx) = tx {
            let _ = tx.send(event).await;
        }
    }

    pub fn sent(&self) -> Vec<PcmBlob> {
        self.sender.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl LiveAgentPort for FakeLiveAgent {
    async fn connect(&self, setup: LiveSetup) -> Result<LiveConnection, LiveAgentError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(LiveAgentError::ConnectionFailed("refused by test".into()));
        }
        self.setups.lock().unwrap().push(setup);
        let (tx, rx) = mpsc::channel(16);
        *self.events.lock().unwrap() = Some(tx);
        Ok(LiveConnection {
            sender: self.sender.clone(),
            events: rx,
        })
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<StudioEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<StudioEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl StudioEventSink for RecordingSink {
    fn publish(&self, event: StudioEvent) {
        self.events.lock().unwrap().push(event);
    }
}
