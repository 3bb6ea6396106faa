//! Process-wide session registry.
//!
//! Owns the user-to-session map and the services session tasks share. Each
//! inbound event runs on its own task; the map lock is held only for map
//! operations, never across a provider call.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use avcast_models::{OutboundMessage, SessionEvent, SessionReply, UserId};
use avcast_providers::{ProviderResult, RenderClient, ScriptClient, VoiceSynthesizer};

use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::machine::{self, Disposition, Session, SessionContext};

const EXPIRED_TEXT: &str = "\u{23f0} Session expired after inactivity.";

/// Map of live sessions plus the shared provider clients.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<UserId, Arc<Mutex<Session>>>>,
    ctx: SessionContext,
    shutdown: CancellationToken,
}

impl SessionRegistry {
    /// Create a registry and the outbound reply stream for the transport.
    pub fn new(
        config: SessionConfig,
        script: ScriptClient,
        voice: VoiceSynthesizer,
        render: RenderClient,
    ) -> (Arc<Self>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(config.outbound_capacity);
        let ctx = SessionContext::new(config, script, voice, render, tx);
        let registry = Arc::new(Self {
            sessions: Mutex::new(HashMap::new()),
            ctx,
            shutdown: CancellationToken::new(),
        });
        (registry, rx)
    }

    /// Create a registry with all providers configured from the environment.
    pub fn from_env() -> ProviderResult<(Arc<Self>, mpsc::Receiver<OutboundMessage>)> {
        Ok(Self::new(
            SessionConfig::from_env(),
            ScriptClient::from_env()?,
            VoiceSynthesizer::from_env()?,
            RenderClient::from_env()?,
        ))
    }

    /// Route one inbound event to its session on a fresh task.
    ///
    /// Sessions are created lazily on the first event from an unknown user;
    /// events the fresh session cannot accept report out-of-sequence.
    pub fn dispatch(self: &Arc<Self>, event: SessionEvent) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let user = event.user().clone();
            debug!(user_id = %user, event = event.kind(), "Dispatching event");

            let session = match registry.get_or_create(&user).await {
                Ok(session) => session,
                Err(e) => {
                    error!(user_id = %user, "Failed to create session: {}", e);
                    registry
                        .ctx
                        .send(
                            &user,
                            SessionReply::error(format!(
                                "\u{26a0}\u{fe0f} Error: {}",
                                e.user_message()
                            )),
                        )
                        .await;
                    return;
                }
            };

            if machine::drive(&registry.ctx, &session, event).await == Disposition::Remove {
                registry.remove(&user).await;
            }
        })
    }

    async fn get_or_create(&self, user: &UserId) -> SessionResult<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(user) {
            return Ok(Arc::clone(existing));
        }

        let session = Session::create(user.clone(), &self.ctx.config).await?;
        info!(user_id = %user, "Session created");
        let session = Arc::new(Mutex::new(session));
        sessions.insert(user.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Drop a session entry. The caller has already cleaned its files.
    pub(crate) async fn remove(&self, user: &UserId) {
        if self.sessions.lock().await.remove(user).is_some() {
            debug!(user_id = %user, "Session removed");
        }
    }

    /// Number of live sessions.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether `user` has a live session.
    pub async fn contains(&self, user: &UserId) -> bool {
        self.sessions.lock().await.contains_key(user)
    }

    /// Background loop removing sessions stuck in an awaiting stage.
    ///
    /// Busy stages are exempt; their own polling budgets bound them.
    pub async fn run_idle_sweeper(&self) {
        let interval = self.ctx.config.sweep_interval;
        info!("Starting idle session sweeper (interval: {:?})", interval);
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Idle sweeper stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let swept = self.sweep_idle_once().await;
                    if swept > 0 {
                        info!("Swept {} idle sessions", swept);
                    }
                }
            }
        }
    }

    /// Run a single sweep, returning how many sessions were expired. Also
    /// used directly by tests.
    pub async fn sweep_idle_once(&self) -> usize {
        let idle_timeout = self.ctx.config.idle_timeout;
        let mut expired = Vec::new();

        {
            let mut sessions = self.sessions.lock().await;
            sessions.retain(|user, session| {
                // A contended session lock means an event is mid-transition,
                // so the session is not idle.
                match session.try_lock() {
                    Ok(s) => {
                        if !s.stage().is_busy() && s.idle_for() > idle_timeout {
                            expired.push((user.clone(), Arc::clone(session)));
                            false
                        } else {
                            true
                        }
                    }
                    Err(_) => true,
                }
            });
        }

        for (user, session) in &expired {
            let workspace = {
                let s = session.lock().await;
                s.cancel_token().cancel();
                s.workspace().clone()
            };
            workspace.cleanup().await;
            warn!(user_id = %user, "Session expired after inactivity");
            self.ctx.send(user, SessionReply::status(EXPIRED_TEXT)).await;
        }

        expired.len()
    }

    /// Cancel every live session and clean up all workspaces.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let drained: Vec<_> = {
            let mut sessions = self.sessions.lock().await;
            sessions.drain().collect()
        };

        for (user, session) in drained {
            let workspace = {
                let s = session.lock().await;
                s.cancel_token().cancel();
                s.workspace().clone()
            };
            workspace.cleanup().await;
            debug!(user_id = %user, "Session torn down");
        }

        info!("Session registry shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avcast_providers::{DeepLabsConfig, ElevenLabsConfig, RenderConfig, ScriptConfig};

    fn test_registry(
        work_dir: &std::path::Path,
    ) -> (Arc<SessionRegistry>, mpsc::Receiver<OutboundMessage>) {
        let mut config = SessionConfig::default();
        config.work_dir = work_dir.to_path_buf();
        SessionRegistry::new(
            config,
            ScriptClient::new(ScriptConfig::default()).expect("script client"),
            VoiceSynthesizer::new(ElevenLabsConfig::default(), DeepLabsConfig::default())
                .expect("voice synthesizer"),
            RenderClient::new(RenderConfig::default()).expect("render client"),
        )
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_sessions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (registry, _rx) = test_registry(dir.path());
        let user = UserId::new("u1");

        let first = registry.get_or_create(&user).await.expect("create");
        let second = registry.get_or_create(&user).await.expect("lookup");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.active_sessions().await, 1);

        registry.remove(&user).await;
        assert!(!registry.contains(&user).await);
    }

    #[tokio::test]
    async fn test_shutdown_clears_sessions_and_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (registry, _rx) = test_registry(dir.path());

        registry
            .get_or_create(&UserId::new("a"))
            .await
            .expect("create");
        registry
            .get_or_create(&UserId::new("b"))
            .await
            .expect("create");
        assert_eq!(registry.active_sessions().await, 2);

        registry.shutdown().await;
        assert_eq!(registry.active_sessions().await, 0);
        let leftover = std::fs::read_dir(dir.path()).expect("read_dir").count();
        assert_eq!(leftover, 0);
    }
}
