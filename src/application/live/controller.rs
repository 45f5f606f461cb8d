//! Live Session Controller
//!
//! 麦克风 → 远端语音代理 → 扬声器 的全双工会话生命周期

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::session::{LiveSettings, LiveState, LiveStatus, SessionResources, StatusLog};
use crate::application::error::ApplicationError;
use crate::application::playback::PlaybackScheduler;
use crate::application::ports::{
    AudioOutputFactory, CaptureRequest, CaptureStream, LiveAgentError, LiveAgentPort, LiveEvent,
    LiveSender, LiveServerMessage, LiveSetup, MicrophonePort, StudioEvent, StudioEventSink,
};
use crate::domain::audio::{decode_audio, PcmBlob};

const LOG_STARTING: &str = "Iniciando sesión en vivo...";
const LOG_CONNECTED: &str = "Conectado a Gemini Live.";
const LOG_INTERRUPTED: &str = "Interrupción detectada.";
const LOG_CLOSED: &str = "Conexión cerrada.";
const LOG_ERROR: &str = "Error en la conexión.";
const LOG_FINISHED: &str = "Sesión finalizada.";
const LOG_START_CANCELLED: &str = "Inicio de sesión cancelado.";

#[derive(Default)]
struct ControllerState {
    state: LiveState,
    /// 每次开始 / 停止递增，旧会话的回调据此失效
    generation: u64,
    session_id: Option<String>,
    started_at: Option<DateTime<Utc>>,
    resources: SessionResources,
    log: StatusLog,
}

struct Inner {
    agent: Arc<dyn LiveAgentPort>,
    microphone: Arc<dyn MicrophonePort>,
    outputs: Arc<dyn AudioOutputFactory>,
    events: Arc<dyn StudioEventSink>,
    settings: LiveSettings,
    muted: Arc<AtomicBool>,
    video: AtomicBool,
    state: Mutex<ControllerState>,
}

/// Live Session Controller
///
/// 同一时刻至多一个会话。克隆共享同一会话。
#[derive(Clone)]
pub struct LiveSessionController {
    inner: Arc<Inner>,
}

impl LiveSessionController {
    pub fn new(
        agent: Arc<dyn LiveAgentPort>,
        microphone: Arc<dyn MicrophonePort>,
        outputs: Arc<dyn AudioOutputFactory>,
        events: Arc<dyn StudioEventSink>,
        settings: LiveSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                agent,
                microphone,
                outputs,
                events,
                settings,
                muted: Arc::new(AtomicBool::new(false)),
                video: AtomicBool::new(false),
                state: Mutex::new(ControllerState::default()),
            }),
        }
    }

    /// 开始会话
    ///
    /// 返回时连接已建立（尚未收到 open），或在等待期间被 `stop` 取消。
    /// 返回前 future 被丢弃时，本次会话按失败拆除并回到 Idle。
    pub async fn start(&self) -> Result<(), ApplicationError> {
        let generation = {
            let mut guard = self.inner.lock();
            if guard.state != LiveState::Idle {
                return Err(ApplicationError::invalid_state(format!(
                    "live session is {}",
                    guard.state.as_str()
                )));
            }
            guard.generation += 1;
            guard.session_id = Some(Uuid::new_v4().to_string());
            guard.started_at = Some(Utc::now());
            self.inner.transition(&mut guard, LiveState::Connecting);
            self.inner.log(&mut guard, LOG_STARTING);
            guard.generation
        };

        let pending = PendingStart {
            inner: &self.inner,
            generation,
            armed: true,
        };
        let result = self.acquire(generation).await;
        pending.disarm();

        match result {
            Ok(()) => Ok(()),
            Err(err) if self.inner.fail(generation, &err) => Err(err),
            Err(err) => {
                tracing::debug!(error = %err, "Start failed after the session was stopped");
                Ok(())
            }
        }
    }

    /// 停止会话，任何状态下可重复调用
    pub fn stop(&self) {
        self.inner.shutdown(None, None);
    }

    /// 切换静音，返回新状态
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.inner.muted.fetch_xor(true, Ordering::SeqCst);
        tracing::info!(muted = muted, "Microphone mute toggled");
        muted
    }

    /// 切换摄像头，下次开始会话时生效
    pub fn toggle_video(&self) -> bool {
        let video = !self.inner.video.fetch_xor(true, Ordering::SeqCst);
        tracing::info!(video = video, "Camera toggled");
        video
    }

    pub fn is_muted(&self) -> bool {
        self.inner.muted.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> LiveState {
        self.inner.lock().state
    }

    pub fn status(&self) -> LiveStatus {
        let guard = self.inner.lock();
        LiveStatus {
            state: guard.state,
            session_id: guard.session_id.clone(),
            started_at: guard.started_at,
            muted: self.inner.muted.load(Ordering::SeqCst),
            video: self.inner.video.load(Ordering::SeqCst),
            queued: guard
                .resources
                .scheduler
                .as_ref()
                .map(|s| s.active_count())
                .unwrap_or(0),
            log: guard.log.snapshot(),
        }
    }

    async fn acquire(&self, generation: u64) -> Result<(), ApplicationError> {
        let settings = &self.inner.settings;
        let request = CaptureRequest {
            sample_rate: settings.input_sample_rate,
            frame_size: settings.frame_size,
            video: self.inner.video.load(Ordering::SeqCst),
        };

        let CaptureStream {
            frames,
            tracks,
            has_video,
        } = self
            .inner
            .microphone
            .open(request)
            .await
            .map_err(|e| ApplicationError::SessionAcquisition(e.to_string()))?;

        {
            let mut guard = self.inner.lock();
            if guard.generation != generation {
                tracks.stop();
                return Ok(());
            }
            guard.resources.tracks = Some(tracks);
            guard.resources.frames = Some(frames);
        }
        tracing::debug!(has_video = has_video, "Capture devices acquired");

        // 在锁外打开输出，等待设备就绪期间不阻塞状态查询与停止
        let output = self
            .inner
            .outputs
            .open(settings.output_sample_rate)
            .await
            .map_err(|e| ApplicationError::SessionAcquisition(e.to_string()))?;
        {
            let mut guard = self.inner.lock();
            if guard.generation != generation {
                output.close();
                return Ok(());
            }
            guard.resources.scheduler = Some(Arc::new(PlaybackScheduler::new(output.clone())));
            guard.resources.output = Some(output);
        }

        let setup = LiveSetup {
            model: settings.model.clone(),
            system_instruction: settings.persona.clone(),
            voice: settings.voice,
        };
        let connection = self
            .inner
            .agent
            .connect(setup)
            .await
            .map_err(map_agent_error)?;

        let mut guard = self.inner.lock();
        if guard.generation != generation {
            connection.sender.close();
            return Ok(());
        }
        guard.resources.sender = Some(connection.sender);
        let task = tokio::spawn(pump_events(
            Arc::downgrade(&self.inner),
            generation,
            connection.events,
        ));
        guard.resources.event_task = Some(task);

        tracing::info!(
            session_id = guard.session_id.as_deref().unwrap_or_default(),
            model = %settings.model,
            "Live session connecting"
        );
        Ok(())
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, guard: &mut ControllerState, state: LiveState) {
        guard.state = state;
        self.events.publish(StudioEvent::LiveStateChanged {
            state: state.as_str().to_string(),
            session_id: guard.session_id.clone(),
        });
    }

    fn log(&self, guard: &mut ControllerState, message: impl Into<String>) {
        let message = message.into();
        guard.log.push(message.clone());
        self.events.publish(StudioEvent::LiveLog { message });
    }

    /// 启动失败；会话已被停止时返回 false
    fn fail(&self, generation: u64, err: &ApplicationError) -> bool {
        if self.lock().generation != generation {
            return false;
        }
        tracing::error!(error = %err, "Failed to start live session");
        self.shutdown(Some(generation), Some(format!("Error iniciando sesión: {}", err)));
        true
    }

    /// 拆除会话
    ///
    /// `expected` 为 Some 时仅在仍是该代会话时执行。
    fn shutdown(&self, expected: Option<u64>, message: Option<String>) {
        let (resources, session_id) = {
            let mut guard = self.lock();
            if expected.is_some_and(|generation| generation != guard.generation) {
                return;
            }
            if matches!(guard.state, LiveState::Idle | LiveState::Closing) {
                return;
            }
            guard.generation += 1;
            if let Some(message) = message {
                self.log(&mut guard, message);
            }
            self.transition(&mut guard, LiveState::Closing);
            (
                std::mem::take(&mut guard.resources),
                guard.session_id.clone(),
            )
        };

        resources.release();

        let mut guard = self.lock();
        self.log(&mut guard, LOG_FINISHED);
        guard.session_id = None;
        guard.started_at = None;
        self.transition(&mut guard, LiveState::Idle);
        tracing::info!(
            session_id = session_id.as_deref().unwrap_or_default(),
            "Live session stopped"
        );
    }

    fn on_open(&self, generation: u64) {
        let mut guard = self.lock();
        if guard.generation != generation || guard.state != LiveState::Connecting {
            return;
        }
        self.transition(&mut guard, LiveState::Open);
        self.log(&mut guard, LOG_CONNECTED);

        let frames = guard.resources.frames.take();
        let sender = guard.resources.sender.clone();
        if let (Some(frames), Some(sender)) = (frames, sender) {
            let task = tokio::spawn(pump_frames(
                frames,
                sender,
                self.muted.clone(),
                self.settings.input_sample_rate,
            ));
            guard.resources.capture_task = Some(task);
        }
        tracing::info!(
            session_id = guard.session_id.as_deref().unwrap_or_default(),
            "Live session open"
        );
    }

    fn on_message(&self, generation: u64, message: LiveServerMessage) {
        let scheduler = {
            let guard = self.lock();
            if guard.generation != generation {
                return;
            }
            guard.resources.scheduler.clone()
        };
        let Some(scheduler) = scheduler else {
            return;
        };

        if let Some(audio) = message.audio.as_deref() {
            match decode_audio(audio, self.settings.output_sample_rate) {
                Ok(buffer) => {
                    if let Err(e) = scheduler.enqueue(&buffer) {
                        tracing::warn!(error = %e, "Failed to schedule audio fragment");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Discarding undecodable audio fragment"),
            }
        }

        if message.interrupted {
            scheduler.interrupt_all();
            let mut guard = self.lock();
            if guard.generation == generation {
                self.log(&mut guard, LOG_INTERRUPTED);
            }
        }

        if message.turn_complete {
            tracing::debug!(queued = scheduler.active_count(), "Agent turn complete");
        }
    }
}

/// 进行中的 `start`，未完成即被丢弃时拆除该代会话
struct PendingStart<'a> {
    inner: &'a Inner,
    generation: u64,
    armed: bool,
}

impl PendingStart<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingStart<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(generation = self.generation, "Live session start was cancelled");
        self.inner
            .shutdown(Some(self.generation), Some(LOG_START_CANCELLED.to_string()));
    }
}

fn map_agent_error(err: LiveAgentError) -> ApplicationError {
    match err {
        LiveAgentError::MissingCredential => ApplicationError::MissingCredential,
        other => ApplicationError::SessionAcquisition(other.to_string()),
    }
}

/// 消费远端事件，会话关闭或出错时拆除
async fn pump_events(inner: Weak<Inner>, generation: u64, mut events: mpsc::Receiver<LiveEvent>) {
    while let Some(event) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        match event {
            LiveEvent::Opened => inner.on_open(generation),
            LiveEvent::Message(message) => inner.on_message(generation, message),
            LiveEvent::Closed(reason) => {
                tracing::info!(reason = reason.as_deref().unwrap_or_default(), "Live connection closed");
                inner.shutdown(Some(generation), Some(LOG_CLOSED.to_string()));
                return;
            }
            LiveEvent::Error(error) => {
                tracing::error!(error = %error, "Live connection error");
                inner.shutdown(Some(generation), Some(LOG_ERROR.to_string()));
                return;
            }
        }
    }
    if let Some(inner) = inner.upgrade() {
        inner.shutdown(Some(generation), Some(LOG_CLOSED.to_string()));
    }
}

/// 采集帧上行，静音时丢弃；每帧独立发送，失败忽略
async fn pump_frames(
    mut frames: mpsc::Receiver<Vec<f32>>,
    sender: Arc<dyn LiveSender>,
    muted: Arc<AtomicBool>,
    sample_rate: u32,
) {
    while let Some(frame) = frames.recv().await {
        if muted.load(Ordering::SeqCst) {
            continue;
        }
        let chunk = PcmBlob::from_samples(&frame, sample_rate);
        let sender = sender.clone();
        tokio::spawn(async move {
            if let Err(e) = sender.send_audio(chunk).await {
                tracing::debug!(error = %e, "Audio frame not sent");
            }
        });
    }
}
