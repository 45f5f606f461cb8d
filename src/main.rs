//! Podcast Studio - 多角色播客合成与实时语音会话
//!
//! - Domain: audio/, script/, direction
//! - Application: commands, playback, live, preview, ports
//! - Infrastructure: http, adapters, audio, events

use std::sync::Arc;

use podcast_studio::application::{
    AudioOutputFactory, LiveSessionController, LiveSettings, MicrophonePort, SpeechSynthesisPort,
};
use podcast_studio::config::{load_config, print_config, AppConfig, AudioBackend};
use podcast_studio::domain::audio::SYNTHESIS_SAMPLE_RATE;
use podcast_studio::infrastructure::adapters::{
    FakeSpeechClient, GeminiClientConfig, GeminiLiveClient, GeminiLiveConfig, GeminiSpeechClient,
};
use podcast_studio::infrastructure::audio::{UnavailableMicrophone, VirtualOutputFactory};
#[cfg(feature = "device-audio")]
use podcast_studio::infrastructure::audio::{CpalMicrophone, CpalOutputFactory};
use podcast_studio::infrastructure::events::EventPublisher;
use podcast_studio::infrastructure::http::{AppState, HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Podcast Studio");
    print_config(&config);

    if !config.gemini.has_api_key() {
        tracing::warn!("API key is missing, remote synthesis and live sessions will fail until it is set");
    }

    // 批量合成引擎
    let speech_engine: Arc<dyn SpeechSynthesisPort> = if config.gemini.offline {
        Arc::new(FakeSpeechClient::with_defaults())
    } else {
        let mut client_config = GeminiClientConfig::new(config.gemini.base_url.clone())
            .with_timeout(config.gemini.timeout_secs);
        if let Some(api_key) = config.gemini.api_key.clone() {
            client_config = client_config.with_api_key(api_key);
        }
        Arc::new(GeminiSpeechClient::new(client_config)?)
    };

    // 音频后端
    let (outputs, microphone) = audio_backend(config.audio.backend)?;
    let preview_output = outputs.open(SYNTHESIS_SAMPLE_RATE).await?;

    // 创建事件发布器
    let event_publisher = Arc::new(EventPublisher::new());

    // 实时会话
    let live_agent = Arc::new(GeminiLiveClient::new(GeminiLiveConfig {
        api_key: config.gemini.api_key.clone(),
        url: config.gemini.live_url.clone(),
    }));
    let live = LiveSessionController::new(
        live_agent,
        microphone,
        outputs,
        event_publisher.clone(),
        LiveSettings {
            model: config.gemini.live_model.clone(),
            persona: config.live.persona.clone(),
            voice: config.live.voice,
            frame_size: config.live.frame_size,
            input_sample_rate: config.live.input_sample_rate,
            output_sample_rate: config.live.output_sample_rate,
        },
    );

    let state = Arc::new(AppState::new(
        speech_engine,
        config.gemini.tts_model.clone(),
        preview_output.clone(),
        live,
        event_publisher,
    ));

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let server = HttpServer::new(server_config, state.clone());

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    // 释放麦克风、扬声器与远端会话
    state.live.stop();
    state.preview.stop();
    preview_output.close();

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},podcast_studio={},tower_http=debug",
        config.log.level, config.log.level
    );
    let builder = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
    );
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// 按配置选择音频输出与麦克风
fn audio_backend(
    backend: AudioBackend,
) -> anyhow::Result<(Arc<dyn AudioOutputFactory>, Arc<dyn MicrophonePort>)> {
    match backend {
        AudioBackend::Virtual => Ok((Arc::new(VirtualOutputFactory), Arc::new(UnavailableMicrophone))),
        #[cfg(feature = "device-audio")]
        AudioBackend::Device => Ok((Arc::new(CpalOutputFactory), Arc::new(CpalMicrophone))),
        #[cfg(not(feature = "device-audio"))]
        AudioBackend::Device => {
            anyhow::bail!("audio.backend = \"device\" requires the `device-audio` feature")
        }
    }
}
