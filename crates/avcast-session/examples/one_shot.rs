//! Drive one direct-text session end to end against live providers.
//!
//! Requires `OPENAI_API_KEY`, `ELEVEN_LABS_API_KEY`, `ELEVEN_LABS_VOICE_ID`,
//! `HEYGEN_API_KEY`, and `AVATAR_ID` in the environment (a `.env` file
//! works). The rendered video lands in the system temp directory.
//!
//! ```sh
//! cargo run -p avcast-session --example one_shot
//! ```

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use avcast_models::{InputMode, SessionEvent, SessionReply, UserId, VoiceProviderKind};
use avcast_session::SessionRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("avcast=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    let (registry, mut replies) =
        SessionRegistry::from_env().context("building session registry")?;

    let user = UserId::new("one-shot");
    let content = std::env::var("DEMO_SCRIPT").unwrap_or_else(|_| {
        "Rust makes systems programming approachable without giving up control.".to_string()
    });
    let provider: VoiceProviderKind = std::env::var("VOICE_PROVIDER")
        .unwrap_or_else(|_| "eleven_labs".to_string())
        .parse()
        .context("parsing VOICE_PROVIDER")?;

    info!(provider = %provider, "Running one-shot session");

    registry
        .dispatch(SessionEvent::InputModeSelected {
            user: user.clone(),
            mode: InputMode::DirectText,
        })
        .await
        .context("input mode event")?;
    registry
        .dispatch(SessionEvent::ContentSubmitted {
            user: user.clone(),
            content,
        })
        .await
        .context("content event")?;
    registry
        .dispatch(SessionEvent::VoiceProviderSelected {
            user: user.clone(),
            provider,
        })
        .await
        .context("voice provider event")?;
    registry
        .dispatch(SessionEvent::VideoConfirmed { user: user.clone() })
        .await
        .context("confirm event")?;

    while let Some(message) = replies.recv().await {
        match message.reply {
            SessionReply::Prompt { text } | SessionReply::Status { text } => info!("{}", text),
            SessionReply::ScriptPreview { script } => info!("Script:\n{}", script),
            SessionReply::Audio { bytes, caption } => {
                info!("{} ({} bytes)", caption, bytes.len())
            }
            SessionReply::Video { bytes, caption } => {
                let path = std::env::temp_dir().join("avcast_one_shot.mp4");
                tokio::fs::write(&path, &bytes).await?;
                info!("{} -> {} ({} bytes)", caption, path.display(), bytes.len());
                break;
            }
            SessionReply::Error { text } => {
                warn!("{}", text);
                break;
            }
        }
    }

    registry.shutdown().await;
    Ok(())
}
