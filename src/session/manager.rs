// src/session/manager.rs
//! Session lifecycle
//!
//! ```text
//! Idle → Starting → Active → Stopping → Idle
//! ```
//!
//! A session binds one target: it opens the store, turns on request
//! interception, installs the request/response hooks and registers itself under
//! the target's identity. Stopping waits for the drain outcome before removing
//! the hooks, so in-flight recordings are never orphaned.

use crate::interception::handlers::{handle_request, handle_response, HandlerContext};
use crate::interception::host::{
    Hook, HookEvent, InterceptedRequest, InterceptedResponse, InterceptionTarget, ListenerId,
    RequestHandler, ResponseHandler, TargetId,
};
use crate::recording::store::{MockStore, StoreConfig};
use crate::recording::tracker::{PendingTracker, TrackerSnapshot};
use crate::session::config::SessionConfig;
use crate::utils::errors::{EngineError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};
use ulid::Ulid;

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting,
    Active,
    Stopping,
}

#[derive(Debug, Clone, Copy)]
struct InstalledHooks {
    request: ListenerId,
    response: ListenerId,
}

/// Live sessions keyed by the target they intercept
type Registry = DashMap<TargetId, Arc<Session>>;

/// One interception session bound to one target
pub struct Session {
    id: Ulid,
    target: Arc<dyn InterceptionTarget>,
    target_id: TargetId,
    context: Arc<HandlerContext>,
    hooks: Mutex<Option<InstalledHooks>>,
    state: Mutex<SessionState>,
    registry: Arc<Registry>,
}

impl Session {
    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn store(&self) -> &MockStore {
        &self.context.store
    }

    pub fn pending(&self) -> TrackerSnapshot {
        self.context.tracker.snapshot()
    }

    /// Wait until every live exchange of this session has been recorded
    pub async fn drain(&self) -> Result<()> {
        self.context.tracker.drain().await
    }

    /// Drain, then remove the hooks and release the target
    ///
    /// Returns whatever the drain produced, after teardown has happened.
    pub async fn stop(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if *state != SessionState::Active {
                return Err(EngineError::NothingToStop);
            }
            *state = SessionState::Stopping;
        }

        info!("Stopping session {} on {}", self.id, self.target_id);

        let outcome = self.drain().await;
        if let Err(e) = &outcome {
            warn!("Session {} drained with failure: {}", self.id, e);
        }

        self.teardown().await;
        *self.state.lock() = SessionState::Idle;

        info!("Session {} stopped", self.id);
        outcome
    }

    fn install_hooks(&self) {
        let ctx = Arc::clone(&self.context);
        let on_request: RequestHandler = Arc::new(
            move |request: Arc<dyn InterceptedRequest>| -> BoxFuture<'static, ()> {
                let ctx = Arc::clone(&ctx);
                async move { handle_request(&ctx, request).await }.boxed()
            },
        );

        let ctx = Arc::clone(&self.context);
        let on_response: ResponseHandler = Arc::new(
            move |response: Arc<dyn InterceptedResponse>| -> BoxFuture<'static, ()> {
                let ctx = Arc::clone(&ctx);
                async move { handle_response(&ctx, response).await }.boxed()
            },
        );

        let hooks = InstalledHooks {
            request: self.target.on(Hook::Request(on_request)),
            response: self.target.on(Hook::Response(on_response)),
        };

        debug!("Installed hooks {:?} on {}", hooks, self.target_id);
        *self.hooks.lock() = Some(hooks);
    }

    async fn teardown(&self) {
        let hooks = self.hooks.lock().take();
        if let Some(hooks) = hooks {
            for (event, listener) in [
                (HookEvent::Request, hooks.request),
                (HookEvent::Response, hooks.response),
            ] {
                self.target.remove_listener(event, listener);
                debug!(
                    "Removed {} hook {:?} from {}",
                    event.as_str(),
                    listener,
                    self.target_id
                );
            }
        }

        self.registry
            .remove_if(&self.target_id, |_, owner| owner.id == self.id);

        if let Err(e) = self.target.set_request_interception(false).await {
            warn!("Failed to disable interception on {}: {}", self.target_id, e);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("target_id", &self.target_id)
            .field("state", &self.state())
            .finish()
    }
}

/// Owns the registry of live sessions, one per target
///
/// Independent managers share nothing, so tests can run several side by side.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: Arc<Registry>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start intercepting on the configured target
    pub async fn start(&self, config: SessionConfig) -> Result<Arc<Session>> {
        let target = config.target.clone().ok_or(EngineError::MissingTarget)?;
        let target_id = target.target_id();
        let options = &config.options;

        let context = Arc::new(HandlerContext {
            policy: options.policy(),
            store: MockStore::new(
                StoreConfig::new(options.work_dir()).with_record_new(!options.ci),
            ),
            tracker: Arc::new(PendingTracker::new(options.ci)),
            skip_query_params: options.skip_query_params.clone(),
            skip_post_params: options.skip_post_params.clone(),
            force: options.force,
            verbose: options.verbose,
        });

        let session = Arc::new(Session {
            id: Ulid::new(),
            target,
            target_id: target_id.clone(),
            context,
            hooks: Mutex::new(None),
            state: Mutex::new(SessionState::Starting),
            registry: Arc::clone(&self.sessions),
        });

        match self.sessions.entry(target_id.clone()) {
            Entry::Occupied(_) => {
                warn!("Second start() on {} without stop()", target_id);
                return Err(EngineError::AlreadyActive(target_id));
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&session));
            }
        }

        debug!("Session {} starting on {}", session.id, target_id);

        if let Err(e) = Self::activate(&session).await {
            self.sessions
                .remove_if(&target_id, |_, owner| owner.id == session.id);
            return Err(e);
        }

        info!(
            "Session {} active on {} (store {:?}, strict: {})",
            session.id,
            session.target_id,
            session.store().work_dir(),
            options.ci
        );

        Ok(session)
    }

    async fn activate(session: &Session) -> Result<()> {
        session.store().create_work_dir().await?;
        session.target.set_request_interception(true).await?;
        session.install_hooks();
        *session.state.lock() = SessionState::Active;
        Ok(())
    }

    /// The live session on a target, if any
    pub fn session(&self, target_id: &TargetId) -> Option<Arc<Session>> {
        self.sessions.get(target_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Every live session
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn is_active(&self, target_id: &TargetId) -> bool {
        self.sessions.contains_key(target_id)
    }

    /// Drain every live session; resolves at once when there is none
    ///
    /// Waits for all of them even if one rejects, then reports the first failure.
    pub async fn drain(&self) -> Result<()> {
        let sessions = self.sessions();
        first_failure(join_all(sessions.iter().map(|session| session.drain())).await)
    }

    /// Drain the session on one target; resolves at once when there is none
    pub async fn drain_target(&self, target_id: &TargetId) -> Result<()> {
        match self.session(target_id) {
            Some(session) => session.drain().await,
            None => Ok(()),
        }
    }

    /// Stop every active session
    ///
    /// Every session is torn down even if one of them rejects; the first
    /// failure is returned afterwards.
    pub async fn stop(&self) -> Result<()> {
        let active: Vec<_> = self
            .sessions()
            .into_iter()
            .filter(|session| session.state() == SessionState::Active)
            .collect();

        if active.is_empty() {
            return Err(EngineError::NothingToStop);
        }

        first_failure(join_all(active.iter().map(|session| session.stop())).await)
    }

    /// Stop the session on one target
    pub async fn stop_target(&self, target_id: &TargetId) -> Result<()> {
        self.session(target_id)
            .ok_or(EngineError::NothingToStop)?
            .stop()
            .await
    }
}

fn first_failure(outcomes: Vec<Result<()>>) -> Result<()> {
    outcomes.into_iter().collect()
}
