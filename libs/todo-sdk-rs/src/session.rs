//! Session lifecycle: startup restore, login/logout, 401 teardown and the
//! expiry watch that warns before the token runs out.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use time::OffsetDateTime;
use todo_types::{AuthUser, time_until_expiry};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SdkError;
use crate::gateway::{RequestGateway, UnauthorizedHandler};
use crate::routes::Route;
use crate::scheduler::RecurringTask;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_WARNING_THRESHOLD: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_WARNING_DURATION: Duration = Duration::from_secs(10);

/// Where the surface moves the user when the session ends.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, route: Route);
}

/// Sink for transient user-facing messages.
pub trait Notifier: Send + Sync {
    fn warning(&self, message: &str, display_for: Duration);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Controller shut down.
    Uninitialized,
    /// Stored session not yet inspected.
    Loading,
    Authenticated(AuthUser),
    Unauthenticated,
}

impl SessionState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub check_interval: Duration,
    /// Warn once when less than this much time is left.
    pub warning_threshold: Duration,
    pub warning_duration: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            warning_duration: DEFAULT_WARNING_DURATION,
        }
    }
}

pub fn expiry_warning_message(minutes: i64) -> String {
    let plural = if minutes == 1 { "" } else { "s" };
    format!("Your session will expire in {minutes} minute{plural}. Please save your work.")
}

struct SessionShared {
    gateway: Arc<RequestGateway>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    config: SessionConfig,
    runtime: Handle,
    state: watch::Sender<SessionState>,
    warning_shown: AtomicBool,
    expiry_watch: Mutex<Option<RecurringTask>>,
}

impl SessionShared {
    /// The expiry watch is started or stopped under the state lock, so it
    /// always matches the state it was started for.
    fn set_state(self: &Arc<Self>, next: SessionState) {
        self.state.send_modify(|state| {
            *state = next;
            if state.is_authenticated() {
                self.start_expiry_watch();
            } else {
                self.stop_expiry_watch();
            }
        });
    }

    fn start_expiry_watch(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let task = RecurringTask::spawn(&self.runtime, self.config.check_interval, move || {
            match weak.upgrade() {
                Some(shared) => shared.check_expiry(),
                None => ControlFlow::Break(()),
            }
        });

        // Replacing aborts any watch left from a previous login.
        *self
            .expiry_watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(task);
    }

    fn stop_expiry_watch(&self) {
        let task = self
            .expiry_watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.cancel();
        }
    }

    fn handle_unauthorized(&self) {
        let tokens = self.gateway.tokens();

        // The watch lock serializes concurrent teardowns; only the first
        // one finds something to tear down. The watch is stopped under the
        // same lock so a login racing in afterwards keeps its own watch.
        let torn_down = self.state.send_if_modified(|state| {
            if *state == SessionState::Unauthenticated && tokens.get_token().is_none() {
                return false;
            }
            tokens.clear();
            *state = SessionState::Unauthenticated;
            self.warning_shown.store(false, Ordering::SeqCst);
            self.stop_expiry_watch();
            true
        });

        if !torn_down {
            debug!("Session already torn down, ignoring unauthorized signal");
            return;
        }

        info!("Session ended by unauthorized response");

        let current = self.navigator.current_path();
        let path = current.split(['?', '#']).next().unwrap_or_default();
        if Route::from_path(path).is_some_and(Route::is_auth_page) {
            debug!(path = %current, "Already on an auth page, not redirecting");
        } else {
            self.navigator.navigate(Route::SignIn);
        }
    }

    fn check_expiry(&self) -> ControlFlow<()> {
        let Some(token) = self.gateway.tokens().get_token() else {
            warn!("Session token vanished during expiry check");
            self.handle_unauthorized();
            return ControlFlow::Break(());
        };

        let remaining = match time_until_expiry(&token, OffsetDateTime::now_utc()) {
            Some(remaining) if remaining.is_positive() => remaining,
            Some(_) => {
                info!("Session token expired");
                self.handle_unauthorized();
                return ControlFlow::Break(());
            }
            None => {
                warn!("Session token has no readable expiry");
                self.handle_unauthorized();
                return ControlFlow::Break(());
            }
        };

        let threshold = time::Duration::try_from(self.config.warning_threshold)
            .unwrap_or(time::Duration::MAX);
        if remaining < threshold && !self.warning_shown.swap(true, Ordering::SeqCst) {
            let minutes = remaining.whole_minutes();
            debug!(minutes, "Session close to expiry, warning user");
            self.notifier.warning(
                &expiry_warning_message(minutes),
                self.config.warning_duration,
            );
        }

        ControlFlow::Continue(())
    }
}

/// Owns the client's authentication state.
///
/// While mounted it is the gateway's unauthorized handler (through a weak
/// reference). Dropping it is the same as [`shutdown`](Self::shutdown).
pub struct SessionController {
    shared: Arc<SessionShared>,
}

impl SessionController {
    /// Must be called inside a tokio runtime; the expiry watch runs on it.
    pub fn mount(
        gateway: Arc<RequestGateway>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        config: SessionConfig,
    ) -> Result<Self, SdkError> {
        let runtime = Handle::try_current()
            .map_err(|e| SdkError::Config(format!("session controller needs a tokio runtime: {e}")))?;
        let (state, _) = watch::channel(SessionState::Loading);

        let shared = Arc::new(SessionShared {
            gateway,
            navigator,
            notifier,
            config,
            runtime,
            state,
            warning_shown: AtomicBool::new(false),
            expiry_watch: Mutex::new(None),
        });

        let weak = Arc::downgrade(&shared);
        let hook: Arc<dyn UnauthorizedHandler> = Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.handle_unauthorized();
            }
        });
        shared.gateway.set_unauthorized_handler(hook);

        Ok(Self { shared })
    }

    /// Restores the stored session, leaving `Loading` for good.
    ///
    /// A stored token is only trusted while its `exp` claim lies in the
    /// future; anything else wipes the store.
    pub fn start(&self) -> SessionState {
        let tokens = self.shared.gateway.tokens();

        let next = match (tokens.get_token(), tokens.get_user()) {
            (Some(token), Some(user)) => {
                match time_until_expiry(&token, OffsetDateTime::now_utc()) {
                    Some(remaining) if remaining.is_positive() => {
                        info!(user_id = %user.id, "Restored stored session");
                        SessionState::Authenticated(user)
                    }
                    Some(_) => {
                        info!("Stored session expired, clearing");
                        tokens.clear();
                        SessionState::Unauthenticated
                    }
                    None => {
                        warn!("Stored token has no readable expiry, clearing");
                        tokens.clear();
                        SessionState::Unauthenticated
                    }
                }
            }
            (None, None) => SessionState::Unauthenticated,
            _ => {
                warn!("Incomplete stored session, clearing");
                tokens.clear();
                SessionState::Unauthenticated
            }
        };

        self.shared.set_state(next.clone());
        next
    }

    /// Stores the pair as-is; expiry is not checked here.
    pub fn login(&self, token: &str, user: AuthUser) {
        info!(user_id = %user.id, "Signed in");
        self.shared.gateway.tokens().set_token(token, &user);
        self.shared.warning_shown.store(false, Ordering::SeqCst);
        self.shared.set_state(SessionState::Authenticated(user));
    }

    pub fn logout(&self) {
        info!("Signed out");
        self.shared.gateway.tokens().clear();
        self.shared.set_state(SessionState::Unauthenticated);
        self.shared.warning_shown.store(false, Ordering::SeqCst);
        self.shared.navigator.navigate(Route::SignIn);
    }

    /// Same teardown the gateway triggers on a 401.
    pub fn handle_unauthorized(&self) {
        self.shared.handle_unauthorized();
    }

    /// Runs one expiry check now, outside the periodic schedule.
    pub fn check_expiry(&self) {
        if self.is_authenticated() {
            let _ = self.shared.check_expiry();
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.shared.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.shared.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.shared.gateway
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Stops the expiry watch and deregisters from the gateway. Stored
    /// tokens are left alone.
    pub fn shutdown(&self) {
        if *self.shared.state.borrow() == SessionState::Uninitialized {
            return;
        }
        self.shared.gateway.clear_unauthorized_handler();
        self.shared.stop_expiry_watch();
        self.shared.state.send_replace(SessionState::Uninitialized);
        debug!("Session controller shut down");
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &*self.shared.state.borrow())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
