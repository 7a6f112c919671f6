//! The check-in agent
//!
//! Single orchestrating component. One run is strictly sequential:
//! load-or-login, verify, fall back to the legacy protocol if needed,
//! fetch the profile best-effort, walk the board list, notify.
//!
//! Session acquisition is the only step that can fail the run; everything
//! after it is absorbed into the summary counts.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::api::{md5_hex, FloorApi, LoginResponse};
use crate::config::DeviceProfile;
use crate::error::{FloorsignError, Result};
use crate::notify::Notifier;
use crate::retry::RetryPolicy;
use crate::session::{Session, SessionStore};

/// Placeholder nickname when the profile fetch fails
const UNKNOWN_USER: &str = "unknown user";

/// Pause after every board attempt, to stay under the upstream rate limit
const CHECK_IN_PACING: Duration = Duration::from_secs(2);

/// Aggregate outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInSummary {
    pub success_count: usize,
    pub total_count: usize,
    pub nickname: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginProtocol {
    Ios,
    Android,
}

impl fmt::Display for LoginProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginProtocol::Ios => write!(f, "iOS"),
            LoginProtocol::Android => write!(f, "Android"),
        }
    }
}

/// Performs the daily check-in for one account
pub struct SessionAgent {
    api: Arc<dyn FloorApi>,
    store: SessionStore,
    boards: BTreeMap<String, String>,
    device: DeviceProfile,
    notifier: Option<Arc<dyn Notifier>>,
    login_retry: RetryPolicy,
    pacing: Duration,
}

impl SessionAgent {
    pub fn new(
        api: Arc<dyn FloorApi>,
        store: SessionStore,
        boards: BTreeMap<String, String>,
        device: DeviceProfile,
    ) -> Self {
        Self {
            api,
            store,
            boards,
            device,
            notifier: None,
            login_retry: RetryPolicy::login(),
            pacing: CHECK_IN_PACING,
        }
    }

    /// Attach a summary notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Override the login retry policy
    pub fn with_login_retry(mut self, policy: RetryPolicy) -> Self {
        self.login_retry = policy;
        self
    }

    /// Override the pause between board attempts
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run the whole flow for one account.
    ///
    /// Fails only when no login path produces a session; every later
    /// problem is logged and reflected in the summary counts instead.
    pub async fn perform_daily_check_in(
        &self,
        account: &str,
        password: &str,
    ) -> Result<CheckInSummary> {
        let session = self.acquire_session(account, password).await?;
        let nickname = self.fetch_nickname(&session).await;

        if self.boards.is_empty() {
            warn!("no boards configured, skipping check-in");
            return Ok(CheckInSummary {
                success_count: 0,
                total_count: 0,
                nickname,
            });
        }

        let total_count = self.boards.len();
        let mut success_count = 0;
        info!(total = total_count, "checking in to all boards");

        for (board_id, board_name) in &self.boards {
            if self.check_in_board(&session, board_id, board_name).await {
                success_count += 1;
            }
            tokio::time::sleep(self.pacing).await;
        }

        info!(success = success_count, total = total_count, "check-in finished");

        let summary = CheckInSummary {
            success_count,
            total_count,
            nickname,
        };
        self.notify(account, &summary).await;
        Ok(summary)
    }

    /// Reuse the cached session when it still verifies, otherwise log in
    async fn acquire_session(&self, account: &str, password: &str) -> Result<Session> {
        if let Some(cached) = self.store.load(account) {
            // The cache is never trusted blindly
            if self.verify(&cached).await {
                info!(user_id = %cached.user_id, "cached session verified");
                return Ok(cached);
            }
            info!("cached session failed verification, performing a fresh login");
        }

        self.fresh_login(account, password).await
    }

    async fn verify(&self, session: &Session) -> bool {
        match self
            .api
            .user_info(&session.session_key, &session.user_id)
            .await
        {
            Ok(response) => response.ok(),
            Err(e) => {
                warn!(error = %e, "session verification request failed");
                false
            }
        }
    }

    /// Primary protocol first, legacy protocol as the one fallback
    async fn fresh_login(&self, account: &str, password: &str) -> Result<Session> {
        let password_md5 = md5_hex(password);

        let response = match self
            .login(LoginProtocol::Ios, account, &password_md5)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "iOS login failed, falling back to the Android API");
                self.login(LoginProtocol::Android, account, &password_md5)
                    .await
                    .map_err(|e| FloorsignError::Auth {
                        reason: e.to_string(),
                    })?
            }
        };

        let session = Session::new(response.key, response.user.user_id, &self.device);
        if !session.is_complete() {
            return Err(FloorsignError::Auth {
                reason: "login response was missing the session key or user id".to_string(),
            });
        }

        info!(user_id = %session.user_id, "login succeeded");
        if let Err(e) = self.store.save(account, &session) {
            warn!(error = %e, "could not persist the session to the cache");
        }
        Ok(session)
    }

    async fn login(
        &self,
        protocol: LoginProtocol,
        account: &str,
        password_md5: &str,
    ) -> Result<LoginResponse> {
        self.login_retry
            .run(|| self.login_once(protocol, account, password_md5))
            .await
    }

    /// One login attempt; a vendor rejection is terminal for the protocol
    async fn login_once(
        &self,
        protocol: LoginProtocol,
        account: &str,
        password_md5: &str,
    ) -> Result<LoginResponse> {
        info!(account, %protocol, "logging in");
        let response = match protocol {
            LoginProtocol::Ios => self.api.login_ios(account, password_md5).await?,
            LoginProtocol::Android => self.api.login_android(account, password_md5).await?,
        };

        if response.ok() {
            return Ok(response);
        }

        if protocol == LoginProtocol::Ios && response.msg.contains("QQ") {
            warn!("the account appears to be QQ-bound and may need unbinding before password login works");
        }
        Err(FloorsignError::Api {
            status: response.status,
            message: response.msg,
        })
    }

    /// Best-effort profile fetch; the run continues either way
    async fn fetch_nickname(&self, session: &Session) -> String {
        match self
            .api
            .user_info(&session.session_key, &session.user_id)
            .await
        {
            Ok(response) if response.ok() => {
                info!(nick = %response.user.nick, level = response.user.level, "fetched user profile");
                if response.user.nick.is_empty() {
                    UNKNOWN_USER.to_string()
                } else {
                    response.user.nick
                }
            }
            Ok(response) => {
                warn!(msg = %response.msg, "profile fetch rejected");
                UNKNOWN_USER.to_string()
            }
            Err(e) => {
                warn!(error = %e, "profile fetch failed");
                UNKNOWN_USER.to_string()
            }
        }
    }

    /// One board, one attempt; failures only affect the count
    async fn check_in_board(&self, session: &Session, board_id: &str, board_name: &str) -> bool {
        match self
            .api
            .sign_in(&session.session_key, &session.user_id, board_id)
            .await
        {
            Ok(response) if response.ok() => {
                info!(board = %board_name, "checked in");
                true
            }
            Ok(response) => {
                warn!(board = %board_name, msg = %response.msg, "board rejected the check-in");
                false
            }
            Err(e) => {
                error!(board = %board_name, error = %e, "check-in request failed");
                false
            }
        }
    }

    /// Fire-and-forget summary delivery
    async fn notify(&self, account: &str, summary: &CheckInSummary) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let message = format!(
            "Account {} ({}) finished the daily check-in\nSucceeded on {}/{} boards",
            account, summary.nickname, summary.success_count, summary.total_count
        );
        if let Err(e) = notifier.send(&message).await {
            warn!(error = %e, "summary notification failed");
        }
    }
}
