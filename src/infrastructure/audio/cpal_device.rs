//! 声卡音频后端（cpal）
//!
//! - CpalOutputFactory: 按设备时钟混音播放所有已调度的声音
//! - CpalMicrophone: 采集默认输入设备，下混为单声道、重采样并切成定长帧
//!
//! cpal 的 Stream 在部分平台上不是 Send，每个流运行在独立线程上，通过通道停止。

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};

use crate::application::ports::{
    AudioDeviceError, AudioOutputFactory, AudioOutputPort, CaptureError, CaptureRequest,
    CaptureStream, CaptureTracks, MicrophonePort, ScheduledSound, SoundId,
};
use crate::domain::audio::{downmix_to_mono, resample_nearest, AudioBuffer};

/// 采集帧通道容量
const FRAME_CHANNEL_CAPACITY: usize = 32;

// ============================================================================
// Output
// ============================================================================

struct MixVoice {
    id: SoundId,
    /// 已重采样到设备采样率
    samples: Arc<[f32]>,
    start_frame: u64,
    ended: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct Mixer {
    frames_played: u64,
    voices: Vec<MixVoice>,
}

impl Mixer {
    /// 混合下一段输出，写入交错的设备缓冲区
    fn render<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: SizedSample + FromSample<f32>,
    {
        let base = self.frames_played;
        let mut frames = 0u64;
        for (i, frame) in data.chunks_mut(channels).enumerate() {
            let t = base + i as u64;
            let mut sum = 0.0f32;
            for voice in &self.voices {
                if t >= voice.start_frame {
                    if let Some(sample) = voice.samples.get((t - voice.start_frame) as usize) {
                        sum += *sample;
                    }
                }
            }
            let value = T::from_sample(sum.clamp(-1.0, 1.0));
            frame.iter_mut().for_each(|s| *s = value);
            frames += 1;
        }
        self.frames_played = base + frames;

        let now = self.frames_played;
        self.voices.retain_mut(|voice| {
            let done = now >= voice.start_frame + voice.samples.len() as u64;
            if done {
                if let Some(ended) = voice.ended.take() {
                    let _ = ended.send(());
                }
            }
            !done
        });
    }
}

/// 声卡输出
pub struct CpalAudioOutput {
    device_rate: u32,
    mixer: Arc<Mutex<Mixer>>,
    next_id: AtomicU64,
    shutdown: Mutex<Option<std_mpsc::Sender<()>>>,
    closed: AtomicBool,
}

impl CpalAudioOutput {
    async fn open() -> Result<Self, AudioDeviceError> {
        let mixer = Arc::new(Mutex::new(Mixer::default()));
        let stream_mixer = mixer.clone();

        let (device_rate, shutdown) = spawn_stream_thread(move || {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| AudioDeviceError::NoDevice("no output device available".into()))?;
            let supported = device
                .default_output_config()
                .map_err(|e| AudioDeviceError::StreamError(e.to_string()))?;
            let rate = supported.sample_rate().0;
            let channels = supported.channels() as usize;
            let config: StreamConfig = supported.clone().into();

            let stream = match supported.sample_format() {
                SampleFormat::F32 => {
                    build_output_stream::<f32>(&device, &config, channels, stream_mixer)?
                }
                SampleFormat::I16 => {
                    build_output_stream::<i16>(&device, &config, channels, stream_mixer)?
                }
                format => {
                    return Err(AudioDeviceError::StreamError(format!(
                        "unsupported sample format: {:?}",
                        format
                    )))
                }
            };
            stream
                .play()
                .map_err(|e| AudioDeviceError::StreamError(e.to_string()))?;
            Ok((stream, rate))
        })
        .await?;

        tracing::info!(device_rate = device_rate, "Audio output opened");
        Ok(Self {
            device_rate,
            mixer,
            next_id: AtomicU64::new(0),
            shutdown: Mutex::new(Some(shutdown)),
            closed: AtomicBool::new(false),
        })
    }

    fn mixer(&self) -> std::sync::MutexGuard<'_, Mixer> {
        self.mixer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_output_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: usize,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<Stream, AudioDeviceError>
where
    T: SizedSample + FromSample<f32> + Send + 'static,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                mixer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .render(data, channels);
            },
            move |err| {
                tracing::error!(error = ?err, "Playback stream error");
            },
            None,
        )
        .map_err(|e| AudioDeviceError::StreamError(e.to_string()))
}

impl AudioOutputPort for CpalAudioOutput {
    fn current_time(&self) -> f64 {
        self.mixer().frames_played as f64 / self.device_rate as f64
    }

    fn schedule(
        &self,
        buffer: &AudioBuffer,
        start_at: f64,
    ) -> Result<ScheduledSound, AudioDeviceError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AudioDeviceError::Closed);
        }
        let samples: Arc<[f32]> = if buffer.sample_rate() == self.device_rate {
            buffer.shared_samples()
        } else {
            resample_nearest(buffer.samples(), buffer.sample_rate(), self.device_rate).into()
        };
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = oneshot::channel();

        let mut mixer = self.mixer();
        let start_frame = ((start_at.max(0.0) * self.device_rate as f64).round() as u64)
            .max(mixer.frames_played);
        mixer.voices.push(MixVoice {
            id,
            samples,
            start_frame,
            ended: Some(tx),
        });
        Ok(ScheduledSound { id, ended: rx })
    }

    fn stop(&self, id: SoundId) {
        self.mixer().voices.retain(|voice| voice.id != id);
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.mixer().voices.clear();
        let shutdown = self
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }
        tracing::debug!("Audio output closed");
    }
}

impl Drop for CpalAudioOutput {
    fn drop(&mut self) {
        self.close();
    }
}

/// 声卡输出工厂
#[derive(Debug, Default)]
pub struct CpalOutputFactory;

#[async_trait]
impl AudioOutputFactory for CpalOutputFactory {
    async fn open(&self, sample_rate: u32) -> Result<Arc<dyn AudioOutputPort>, AudioDeviceError> {
        tracing::debug!(source_rate = sample_rate, "Opening audio output");
        Ok(Arc::new(CpalAudioOutput::open().await?))
    }
}

// ============================================================================
// Capture
// ============================================================================

/// 默认输入设备
#[derive(Debug, Default)]
pub struct CpalMicrophone;

struct CpalTracks {
    shutdown: Mutex<Option<std_mpsc::Sender<()>>>,
}

impl CaptureTracks for CpalTracks {
    fn stop(&self) {
        let shutdown = self
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
            tracing::debug!("Capture tracks stopped");
        }
    }
}

/// 定长分帧
struct Framer {
    native_rate: u32,
    native_channels: usize,
    target_rate: u32,
    frame_size: usize,
    pending: Vec<f32>,
    frames: mpsc::Sender<Vec<f32>>,
}

impl Framer {
    fn push(&mut self, interleaved: &[f32]) {
        let mono = downmix_to_mono(interleaved, self.native_channels);
        self.pending
            .extend(resample_nearest(&mono, self.native_rate, self.target_rate));
        while self.pending.len() >= self.frame_size {
            let frame: Vec<f32> = self.pending.drain(..self.frame_size).collect();
            if self.frames.try_send(frame).is_err() {
                tracing::trace!("Capture frame dropped");
            }
        }
    }
}

fn build_input_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut framer: Framer,
) -> Result<Stream, CaptureError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples: Vec<f32> = data.iter().map(|&s| f32::from_sample(s)).collect();
                framer.push(&samples);
            },
            move |err| {
                tracing::error!(error = ?err, "Capture stream error");
            },
            None,
        )
        .map_err(|e| CaptureError::StreamError(e.to_string()))
}

#[async_trait]
impl MicrophonePort for CpalMicrophone {
    async fn open(&self, request: CaptureRequest) -> Result<CaptureStream, CaptureError> {
        if request.video {
            tracing::warn!("Camera capture is not supported by the device backend");
        }
        let (frames_tx, frames_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();

        std::thread::spawn(move || {
            let built = (|| -> Result<Stream, CaptureError> {
                let host = cpal::default_host();
                let device = host
                    .default_input_device()
                    .ok_or_else(|| CaptureError::NoDevice("no input device available".into()))?;
                let supported = device
                    .default_input_config()
                    .map_err(|e| CaptureError::StreamError(e.to_string()))?;
                let framer = Framer {
                    native_rate: supported.sample_rate().0,
                    native_channels: supported.channels() as usize,
                    target_rate: request.sample_rate,
                    frame_size: request.frame_size,
                    pending: Vec::with_capacity(request.frame_size * 2),
                    frames: frames_tx,
                };
                let config: StreamConfig = supported.clone().into();
                let stream = match supported.sample_format() {
                    SampleFormat::F32 => build_input_stream::<f32>(&device, &config, framer)?,
                    SampleFormat::I16 => build_input_stream::<i16>(&device, &config, framer)?,
                    format => {
                        return Err(CaptureError::StreamError(format!(
                            "unsupported sample format: {:?}",
                            format
                        )))
                    }
                };
                stream
                    .play()
                    .map_err(|e| CaptureError::StreamError(e.to_string()))?;
                Ok(stream)
            })();

            match built {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    let _ = shutdown_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        });

        ready_rx
            .await
            .map_err(|_| CaptureError::StreamError("capture thread exited".into()))??;

        tracing::info!(
            sample_rate = request.sample_rate,
            frame_size = request.frame_size,
            "Microphone capture started"
        );
        Ok(CaptureStream {
            frames: frames_rx,
            tracks: Box::new(CpalTracks {
                shutdown: Mutex::new(Some(shutdown_tx)),
            }),
            has_video: false,
        })
    }
}

/// 在独立线程上构建并持有输出流，直到收到停止信号
///
/// 就绪结果经 oneshot 返回，等待期间不阻塞运行时线程
async fn spawn_stream_thread<F>(build: F) -> Result<(u32, std_mpsc::Sender<()>), AudioDeviceError>
where
    F: FnOnce() -> Result<(Stream, u32), AudioDeviceError> + Send + 'static,
{
    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();

    std::thread::spawn(move || match build() {
        Ok((stream, rate)) => {
            let _ = ready_tx.send(Ok(rate));
            let _ = shutdown_rx.recv();
            drop(stream);
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
        }
    });

    let rate = ready_rx
        .await
        .map_err(|_| AudioDeviceError::StreamError("audio thread exited".into()))??;
    Ok((rate, shutdown_tx))
}
