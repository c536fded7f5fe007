//! Session controller.
//!
//! One [`Session`] per dashboard. It owns the token store, the rendered
//! view, the cached service status and the two scheduled tasks:
//!
//! - `status` — `GET /` every status interval, first check immediately,
//!   runs regardless of the token
//! - `usage` — one fetch cycle every usage interval, armed by the first
//!   successful cycle and stopped by [`Session::clear_token`]
//!
//! Every token change bumps a generation counter. A fetch cycle remembers
//! the generation it started under and drops its responses if the token
//! changed while the requests were in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::api::{HttpApi, ServiceStatus, UsageApi};
use crate::config::schema::{DashConfig, PollingConfig};
use crate::dashboard::DashboardView;
use crate::dashboard::view::Indicator;
use crate::error::DashError;
use crate::logging;
use crate::scheduler::ScheduledTask;
use crate::token::{self, TokenStore};

/// Timing knobs of a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub status_interval: Duration,
    pub usage_interval: Duration,
    pub banner_ttl: chrono::Duration,
}

impl SessionSettings {
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            status_interval: config.status_interval(),
            usage_interval: config.usage_interval(),
            banner_ttl: config.error_banner_ttl(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

/// What a fetch cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchOutcome {
    /// No token; nothing was requested.
    Skipped,
    /// Both responses arrived and the dashboard was rebuilt.
    Rendered,
    /// The token changed mid-flight; the responses were dropped.
    Discarded,
}

#[derive(Debug)]
struct SessionState {
    tokens: TokenStore,
    generation: u64,
    view: DashboardView,
    cached_status: Option<ServiceStatus>,
}

/// Dashboard controller shared by the surfaces and the scheduled tasks.
pub struct Session<A: UsageApi> {
    api: A,
    settings: SessionSettings,
    state: Mutex<SessionState>,
    status_task: Mutex<ScheduledTask>,
    usage_task: Mutex<ScheduledTask>,
}

impl Session<HttpApi> {
    /// A session talking to the configured service and token slot.
    pub fn from_config(config: &DashConfig) -> Arc<Self> {
        Session::new(
            HttpApi::from_config(&config.api),
            TokenStore::from_config(&config.storage),
            SessionSettings::from_config(&config.polling),
        )
    }
}

impl<A: UsageApi + 'static> Session<A> {
    pub fn new(api: A, tokens: TokenStore, settings: SessionSettings) -> Arc<Self> {
        Arc::new(Self {
            status_task: Mutex::new(ScheduledTask::new("status", settings.status_interval)),
            usage_task: Mutex::new(ScheduledTask::new("usage", settings.usage_interval)),
            api,
            settings,
            state: Mutex::new(SessionState {
                tokens,
                generation: 0,
                view: DashboardView::default(),
                cached_status: None,
            }),
        })
    }

    // -- Lifecycle --

    /// Startup: start the status poller, then restore the persisted token
    /// and, if there is one, run a fetch cycle right away.
    pub fn start(self: &Arc<Self>) {
        self.start_status_poller();

        if self.restore_token() {
            if let Err(err) = self.fetch_cycle() {
                logging::warn(&format!("initial fetch failed: {err}"));
            }
        }
    }

    /// Load the persisted token into the session without fetching.
    ///
    /// Returns whether a token was found.
    pub fn restore_token(&self) -> bool {
        let mut state = self.lock_state();
        let Some(restored) = state.tokens.restore() else {
            return false;
        };
        state.generation += 1;
        state.view.token_input = Some(token::mask(&restored));
        logging::info("restored persisted token");
        true
    }

    /// Stop both scheduled tasks. Safe to call more than once; dropping the
    /// session stops them as well.
    pub fn shutdown(&self) {
        lock(&self.usage_task).stop();
        lock(&self.status_task).stop();
    }

    // -- Token store actions --

    /// Store a user-supplied token and run one fetch cycle with it.
    ///
    /// An empty token shows the error banner and requests nothing. A token
    /// that cannot be persisted is still used for this session.
    pub fn submit_token(self: &Arc<Self>, raw: &str) -> Result<FetchOutcome, DashError> {
        {
            let mut state = self.lock_state();
            match state.tokens.submit(raw) {
                Err(DashError::EmptyToken) => {
                    let ttl = self.settings.banner_ttl;
                    state
                        .view
                        .show_error(DashError::EmptyToken.to_string(), ttl, Utc::now());
                    return Err(DashError::EmptyToken);
                }
                Err(err) => logging::warn(&format!("token not persisted: {err}")),
                Ok(_) => logging::info("token submitted"),
            }
            state.generation += 1;
            state.view.token_input = state.tokens.current().map(token::mask);
        }
        self.fetch_cycle()
    }

    /// Forget the token, hide the dashboard and stop auto-refresh.
    ///
    /// Cycles already in flight are discarded when they return.
    pub fn clear_token(&self) {
        {
            let mut state = self.lock_state();
            state.generation += 1;
            if let Err(err) = state.tokens.clear() {
                logging::warn(&format!("token slot not removed: {err}"));
            }
            state.cached_status = None;
            state.view.token_input = None;
            state.view.status = Indicator::Idle;
            state.view.hide_dashboard();
        }
        lock(&self.usage_task).stop();
        logging::info("token cleared");
    }

    // -- Usage fetcher --

    /// Manual refresh; identical to a scheduled fetch cycle.
    pub fn refresh(self: &Arc<Self>) -> Result<FetchOutcome, DashError> {
        logging::debug("manual refresh");
        self.fetch_cycle()
    }

    /// One fetch cycle: key-info and usage-history concurrently, then render.
    ///
    /// On failure the banner and status indicator report it and every other
    /// region keeps its previous content.
    pub fn fetch_cycle(self: &Arc<Self>) -> Result<FetchOutcome, DashError> {
        let (token, generation) = {
            let mut state = self.lock_state();
            let Some(token) = state.tokens.current().map(str::to_string) else {
                return Ok(FetchOutcome::Skipped);
            };
            state.view.status = Indicator::Loading;
            (token, state.generation)
        };

        let (key_info, history) = thread::scope(|s| {
            let key_info = s.spawn(|| self.api.key_info(&token));
            let history = s.spawn(|| self.api.usage_history(&token));
            (join_request(key_info), join_request(history))
        });
        let responses = key_info.and_then(|key| history.map(|history| (key, history)));
        let now = Utc::now();

        {
            let mut state = self.lock_state();
            if state.generation != generation {
                logging::info("discarding usage response for a replaced token");
                return Ok(FetchOutcome::Discarded);
            }

            match responses {
                Err(err) => {
                    logging::warn(&format!("fetch cycle failed: {err:?}"));
                    state
                        .view
                        .show_error(err.to_string(), self.settings.banner_ttl, now);
                    state.view.status = Indicator::Error;
                    return Err(err);
                }
                Ok((key, history)) => {
                    let state = &mut *state;
                    state.view.render_key_usage(&key, &history, now);
                    if let Some(status) = &state.cached_status {
                        state.view.render_global_stats(status);
                    }
                    state.view.show_dashboard();
                    state.view.hide_error();
                    state.view.status = Indicator::Live;
                    logging::debug(&format!(
                        "fetch cycle rendered ({} history points)",
                        history.data.len()
                    ));
                }
            }
        }

        self.arm_auto_refresh(generation);
        Ok(FetchOutcome::Rendered)
    }

    /// Arm the usage task unless it is running or the token moved on.
    fn arm_auto_refresh(self: &Arc<Self>, generation: u64) {
        let mut task = lock(&self.usage_task);
        if task.is_running() || self.lock_state().generation != generation {
            return;
        }
        let weak = Arc::downgrade(self);
        task.start(false, move || {
            let Some(session) = weak.upgrade() else {
                return false;
            };
            let _ = session.fetch_cycle();
            true
        });
    }

    // -- Status poller --

    /// One unauthenticated status check. Failures are logged and shown as
    /// "offline"; they never propagate.
    pub fn check_status(&self) -> bool {
        let result = self.api.service_status();
        let mut state = self.lock_state();
        match result {
            Ok(status) => {
                state.view.render_service_online(&status);
                if state.view.visible {
                    state.view.render_global_stats(&status);
                }
                state.cached_status = Some(status);
                true
            }
            Err(err) => {
                state.view.render_service_offline();
                logging::error(&format!("service status check failed: {err:?}"));
                false
            }
        }
    }

    /// Start the status task (first check immediately). No-op if running.
    pub fn start_status_poller(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        lock(&self.status_task).start(true, move || {
            let Some(session) = weak.upgrade() else {
                return false;
            };
            session.check_status();
            true
        });
    }

    // -- Accessors --

    /// The view as it looks now (expired banner dropped).
    pub fn view(&self) -> DashboardView {
        self.lock_state().view.snapshot(Utc::now())
    }

    pub fn cached_status(&self) -> Option<ServiceStatus> {
        self.lock_state().cached_status.clone()
    }

    pub fn has_token(&self) -> bool {
        self.lock_state().tokens.current().is_some()
    }

    pub fn is_auto_refresh_armed(&self) -> bool {
        lock(&self.usage_task).is_running()
    }

    pub fn is_status_polling(&self) -> bool {
        lock(&self.status_task).is_running()
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn join_request<T>(
    handle: thread::ScopedJoinHandle<'_, Result<T, DashError>>,
) -> Result<T, DashError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(DashError::Network("request thread panicked".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{KeyInfo, RateLimit, UsageHistory};

    struct Offline;

    impl UsageApi for Offline {
        fn service_status(&self) -> Result<ServiceStatus, DashError> {
            Err(DashError::Network("dns".to_string()))
        }
        fn key_info(&self, _token: &str) -> Result<KeyInfo, DashError> {
            Ok(KeyInfo {
                username: "u".to_string(),
                plan: "free".to_string(),
                admin: false,
                banned: false,
                ban_reason: None,
                ban_expires: None,
                rpm: RateLimit::Limited(10),
                rpm_used: 1,
                rpd: RateLimit::Limited(100),
                rpd_used: 1,
                total_usage: 1,
                total_tokens_used: 1,
            })
        }
        fn usage_history(&self, _token: &str) -> Result<UsageHistory, DashError> {
            Err(DashError::Network("reset".to_string()))
        }
    }

    fn session() -> Arc<Session<Offline>> {
        Session::new(Offline, TokenStore::in_memory(), SessionSettings::default())
    }

    #[test]
    fn fetch_without_token_is_skipped() {
        let s = session();
        assert_eq!(s.fetch_cycle(), Ok(FetchOutcome::Skipped));
        assert_eq!(s.view().status, Indicator::Idle);
    }

    #[test]
    fn one_failed_request_fails_the_cycle() {
        let s = session();
        let err = s.submit_token("tok").unwrap_err();
        assert!(matches!(err, DashError::Network(_)));
        let view = s.view();
        assert_eq!(view.status, Indicator::Error);
        assert!(!view.visible);
        assert!(view.user.is_none());
        assert!(!s.is_auto_refresh_armed());
    }

    #[test]
    fn status_failure_goes_offline() {
        let s = session();
        assert!(!s.check_status());
        assert!(s.view().service.offline);
        assert!(s.cached_status().is_none());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let s = session();
        s.start_status_poller();
        assert!(s.is_status_polling());
        s.shutdown();
        s.shutdown();
        assert!(!s.is_status_polling());
    }
}
