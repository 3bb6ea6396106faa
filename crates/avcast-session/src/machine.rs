//! Per-user session state machine.
//!
//! A session walks input selection, content, voiceover, and render. Event
//! tasks lock the session only to validate the stage gate and record the
//! transition; every provider exchange runs with the lock released, so one
//! user's render never stalls another user's events.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use avcast_models::{
    InputMode, OutboundMessage, RenderProviderKind, SessionEvent, SessionReply, Stage, UserId,
    VoiceAsset, VoiceProviderKind,
};
use avcast_providers::{RenderClient, ScriptClient, VoiceSynthesizer};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::workspace::SessionWorkspace;

const PROCESSING_TEXT: &str = "\u{1f504} Processing your input...";
const CHOOSE_VOICE_TEXT: &str = "\u{1f5e3}\u{fe0f} Choose a voice provider:";
const GENERATING_VOICE_TEXT: &str = "\u{1f50a} Generating voiceover...";
const VOICE_READY_CAPTION: &str = "\u{1f50a} Voiceover ready! Confirm to create your video.";
const CREATING_VIDEO_TEXT: &str = "\u{1f39e}\u{fe0f} Creating video...";
const VIDEO_CAPTION: &str = "\u{1f3a5} Your Custom Video";
const CANCELLED_TEXT: &str = "\u{274c} Session cancelled.";
const EMPTY_CONTENT_TEXT: &str =
    "\u{26a0}\u{fe0f} That message was empty. Please send your content as text.";

/// Shared services every session task needs.
pub struct SessionContext {
    pub config: SessionConfig,
    pub script: ScriptClient,
    pub voice: VoiceSynthesizer,
    pub render: RenderClient,
    outbound: mpsc::Sender<OutboundMessage>,
}

impl SessionContext {
    pub fn new(
        config: SessionConfig,
        script: ScriptClient,
        voice: VoiceSynthesizer,
        render: RenderClient,
        outbound: mpsc::Sender<OutboundMessage>,
    ) -> Self {
        Self {
            config,
            script,
            voice,
            render,
            outbound,
        }
    }

    /// Push one reply to the transport.
    pub(crate) async fn send(&self, user: &UserId, reply: SessionReply) {
        debug!(user_id = %user, reply = reply.kind(), "Sending reply");
        if self
            .outbound
            .send(OutboundMessage::new(user.clone(), reply))
            .await
            .is_err()
        {
            warn!(user_id = %user, "Outbound channel closed, dropping reply");
        }
    }
}

/// One user's session state.
///
/// Mutated only through the event handlers in this module; the registry
/// reads it for sweeping and teardown.
pub struct Session {
    user: UserId,
    stage: Stage,
    input_mode: Option<InputMode>,
    script: Option<String>,
    voice: Option<VoiceAsset>,
    render_provider: RenderProviderKind,
    workspace: SessionWorkspace,
    cancel: CancellationToken,
    created_at: DateTime<Utc>,
    stage_entered_at: Instant,
}

impl Session {
    /// Create a session in `AwaitingInputMode` with a fresh workspace.
    pub(crate) async fn create(user: UserId, config: &SessionConfig) -> SessionResult<Self> {
        let workspace = SessionWorkspace::create(&config.work_dir).await?;
        Ok(Self {
            user,
            stage: Stage::default(),
            input_mode: None,
            script: None,
            voice: None,
            render_provider: RenderProviderKind::default(),
            workspace,
            cancel: CancellationToken::new(),
            created_at: Utc::now(),
            stage_entered_at: Instant::now(),
        })
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn input_mode(&self) -> Option<InputMode> {
        self.input_mode
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time spent in the current stage.
    pub fn idle_for(&self) -> std::time::Duration {
        self.stage_entered_at.elapsed()
    }

    pub(crate) fn workspace(&self) -> &SessionWorkspace {
        &self.workspace
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn set_stage(&mut self, stage: Stage) {
        debug!(user_id = %self.user, from = %self.stage, to = %stage, "Stage transition");
        self.stage = stage;
        self.stage_entered_at = Instant::now();
    }

    /// Validate that the session sits in `expected`.
    fn gate(&self, expected: Stage) -> SessionResult<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(SessionError::out_of_sequence(self.stage))
        }
    }
}

/// What the registry should do with the session after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    Retain,
    Remove,
}

/// Apply one inbound event to a session, sending any replies.
pub(crate) async fn drive(
    ctx: &SessionContext,
    session: &Arc<Mutex<Session>>,
    event: SessionEvent,
) -> Disposition {
    match event {
        SessionEvent::InputModeSelected { user, mode } => {
            select_input_mode(ctx, session, &user, mode).await
        }
        SessionEvent::ContentSubmitted { user, content } => {
            submit_content(ctx, session, &user, content).await
        }
        SessionEvent::VoiceProviderSelected { user, provider } => {
            select_voice_provider(ctx, session, &user, provider).await
        }
        SessionEvent::VideoConfirmed { user } => confirm_video(ctx, session, &user).await,
        SessionEvent::Cancelled { user } => cancel_session(ctx, session, &user).await,
    }
}

async fn select_input_mode(
    ctx: &SessionContext,
    session: &Arc<Mutex<Session>>,
    user: &UserId,
    mode: InputMode,
) -> Disposition {
    let prompt = {
        let mut s = session.lock().await;
        if let Err(e) = s.gate(Stage::AwaitingInputMode) {
            drop(s);
            return reject(ctx, user, &e).await;
        }
        s.input_mode = Some(mode);
        s.set_stage(Stage::AwaitingContent);
        mode.prompt()
    };

    info!(user_id = %user, mode = %mode, "Input mode selected");
    ctx.send(user, SessionReply::prompt(prompt)).await;
    Disposition::Retain
}

async fn submit_content(
    ctx: &SessionContext,
    session: &Arc<Mutex<Session>>,
    user: &UserId,
    content: String,
) -> Disposition {
    let trimmed = content.trim().to_string();

    let mode = {
        let mut s = session.lock().await;
        if let Err(e) = s.gate(Stage::AwaitingContent) {
            drop(s);
            return reject(ctx, user, &e).await;
        }
        if trimmed.is_empty() {
            drop(s);
            ctx.send(user, SessionReply::error(EMPTY_CONTENT_TEXT)).await;
            return Disposition::Retain;
        }
        let mode = match s.input_mode {
            Some(mode) => mode,
            None => {
                let e = SessionError::out_of_sequence(s.stage());
                drop(s);
                return reject(ctx, user, &e).await;
            }
        };
        if mode.requires_script_generation() {
            s.set_stage(Stage::GeneratingScript);
        } else {
            // Direct text is the script, verbatim; no busy stage needed.
            s.script = Some(trimmed.clone());
            s.set_stage(Stage::AwaitingVoiceProvider);
        }
        mode
    };

    ctx.send(user, SessionReply::status(PROCESSING_TEXT)).await;

    let script = if mode.requires_script_generation() {
        match ctx.script.generate(&trimmed, mode).await {
            Ok(script) => {
                let mut s = session.lock().await;
                s.script = Some(script.clone());
                s.set_stage(Stage::AwaitingVoiceProvider);
                script
            }
            Err(e) => return fail_session(ctx, session, user, e.into()).await,
        }
    } else {
        trimmed
    };

    info!(user_id = %user, mode = %mode, chars = script.len(), "Script ready");
    ctx.send(user, SessionReply::script_preview(script)).await;
    ctx.send(user, SessionReply::prompt(CHOOSE_VOICE_TEXT)).await;
    Disposition::Retain
}

async fn select_voice_provider(
    ctx: &SessionContext,
    session: &Arc<Mutex<Session>>,
    user: &UserId,
    provider: VoiceProviderKind,
) -> Disposition {
    let (script, cancel) = {
        let mut s = session.lock().await;
        if let Err(e) = s.gate(Stage::AwaitingVoiceProvider) {
            drop(s);
            return reject(ctx, user, &e).await;
        }
        let script = match s.script.clone() {
            Some(script) => script,
            None => {
                let e = SessionError::out_of_sequence(s.stage());
                drop(s);
                return reject(ctx, user, &e).await;
            }
        };
        s.set_stage(Stage::GeneratingVoice);
        (script, s.cancel.clone())
    };

    info!(user_id = %user, provider = %provider, "Starting voice synthesis");
    ctx.send(user, SessionReply::status(GENERATING_VOICE_TEXT))
        .await;

    let bytes = match ctx.voice.synthesize(&script, provider, &cancel).await {
        Ok(bytes) => bytes,
        Err(e) if e.is_cancelled() => return teardown_cancelled(session, user).await,
        Err(e) => return fail_session(ctx, session, user, e.into()).await,
    };

    let workspace = { session.lock().await.workspace.clone() };
    let path = match workspace
        .write_voice(&bytes, provider.file_extension())
        .await
    {
        Ok(path) => path,
        Err(e) => return fail_session(ctx, session, user, e).await,
    };

    let asset = VoiceAsset::new(bytes.clone(), path, provider.content_type());
    {
        let mut s = session.lock().await;
        s.voice = Some(asset);
        s.set_stage(Stage::AwaitingVideoConfirm);
    }

    ctx.send(
        user,
        SessionReply::Audio {
            bytes,
            caption: VOICE_READY_CAPTION.to_string(),
        },
    )
    .await;
    Disposition::Retain
}

async fn confirm_video(
    ctx: &SessionContext,
    session: &Arc<Mutex<Session>>,
    user: &UserId,
) -> Disposition {
    let (asset, script, cancel, renderer) = {
        let mut s = session.lock().await;
        if let Err(e) = s.gate(Stage::AwaitingVideoConfirm) {
            drop(s);
            return reject(ctx, user, &e).await;
        }
        let asset = match s.voice.take() {
            Some(asset) => asset,
            None => {
                let e = SessionError::out_of_sequence(s.stage());
                drop(s);
                return reject(ctx, user, &e).await;
            }
        };
        let script = s.script.clone().unwrap_or_default();
        s.set_stage(Stage::GeneratingVideo);
        (asset, script, s.cancel.clone(), s.render_provider)
    };

    info!(
        user_id = %user,
        renderer = %renderer,
        audio_bytes = asset.len(),
        "Starting video render"
    );
    ctx.send(user, SessionReply::status(CREATING_VIDEO_TEXT))
        .await;

    match ctx.render.render(asset, &script, &cancel).await {
        Ok(video) => {
            let workspace = {
                let mut s = session.lock().await;
                s.set_stage(Stage::Delivered);
                s.workspace.clone()
            };
            if let Err(e) = workspace.write_video(&video.bytes).await {
                warn!(user_id = %user, "Failed to persist video copy: {}", e);
            }
            info!(user_id = %user, bytes = video.bytes.len(), "{}", video.message);
            ctx.send(
                user,
                SessionReply::Video {
                    bytes: video.bytes,
                    caption: VIDEO_CAPTION.to_string(),
                },
            )
            .await;
            workspace.cleanup().await;
            Disposition::Remove
        }
        Err(e) if e.is_cancelled() => teardown_cancelled(session, user).await,
        Err(e) => fail_session(ctx, session, user, e.into()).await,
    }
}

async fn cancel_session(
    ctx: &SessionContext,
    session: &Arc<Mutex<Session>>,
    user: &UserId,
) -> Disposition {
    let (stage, workspace) = {
        let mut s = session.lock().await;
        s.cancel.cancel();
        s.voice = None;
        (s.stage(), s.workspace.clone())
    };

    info!(user_id = %user, stage = %stage, "Session cancelled");
    workspace.cleanup().await;
    ctx.send(user, SessionReply::status(CANCELLED_TEXT)).await;
    Disposition::Remove
}

/// Reply to an event that is not valid in the current stage. The session is
/// left untouched.
async fn reject(ctx: &SessionContext, user: &UserId, err: &SessionError) -> Disposition {
    warn!(user_id = %user, "Rejected event: {}", err);
    ctx.send(
        user,
        SessionReply::error(format!("\u{26a0}\u{fe0f} {}", err.user_message())),
    )
    .await;
    Disposition::Retain
}

/// Terminate the session after a failed provider call, cleaning its files.
async fn fail_session(
    ctx: &SessionContext,
    session: &Arc<Mutex<Session>>,
    user: &UserId,
    err: SessionError,
) -> Disposition {
    error!(user_id = %user, "Session failed: {}", err);
    let workspace = {
        let mut s = session.lock().await;
        s.voice = None;
        s.set_stage(Stage::Failed);
        s.workspace.clone()
    };
    workspace.cleanup().await;
    ctx.send(
        user,
        SessionReply::error(format!("\u{26a0}\u{fe0f} Error: {}", err.user_message())),
    )
    .await;
    Disposition::Remove
}

/// A provider call observed the cancel token. The cancel handler owns the
/// user-facing reply; this path only clears local state.
async fn teardown_cancelled(session: &Arc<Mutex<Session>>, user: &UserId) -> Disposition {
    debug!(user_id = %user, "Provider call cancelled mid-flight");
    let workspace = {
        let mut s = session.lock().await;
        s.voice = None;
        s.workspace.clone()
    };
    workspace.cleanup().await;
    Disposition::Remove
}
