use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OnceCell, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::BodsConfig;
use crate::errors::ConfigError;
use crate::http::{CsrfError, CsrfStrategy, HttpClient, HttpError};
use crate::timeout::view::TimeoutView;
use crate::view::TerminalAction;

/// Extends the server-side session.
pub trait KeepAlive: Send + Sync + 'static {
    fn keep_alive(&self, path: &str) -> impl Future<Output = Result<(), HttpError>> + Send;
}

impl KeepAlive for HttpClient {
    async fn keep_alive(&self, path: &str) -> Result<(), HttpError> {
        self.post_json(path, &serde_json::json!({})).await.map(|_| ())
    }
}

/// Keep-alive that resolves the CSRF token on the first extension.
///
/// A countdown that is never extended never needs a token, so a missing
/// cookie or form only surfaces as a failed extension.
#[derive(Debug)]
pub struct CsrfKeepAlive {
    client: HttpClient,
    strategy: CsrfStrategy,
    form_path: String,
    authorised: OnceCell<HttpClient>,
}

impl CsrfKeepAlive {
    pub fn new(client: HttpClient, strategy: CsrfStrategy, form_path: impl Into<String>) -> Self {
        Self {
            client,
            strategy,
            form_path: form_path.into(),
            authorised: OnceCell::new(),
        }
    }

    pub fn from_config(config: &BodsConfig) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(
            HttpClient::from_config(config)?,
            CsrfStrategy::from_config(&config.csrf)?,
            config.csrf.form_path(),
        ))
    }

    async fn authorised(&self) -> Result<&HttpClient, CsrfError> {
        self.authorised
            .get_or_try_init(|| async {
                let token = self
                    .client
                    .resolve_csrf(&self.strategy, &self.form_path)
                    .await?;
                Ok::<_, CsrfError>(self.client.clone().with_csrf_token(token))
            })
            .await
    }
}

impl KeepAlive for CsrfKeepAlive {
    async fn keep_alive(&self, path: &str) -> Result<(), HttpError> {
        let client = self.authorised().await.map_err(|e| match e {
            CsrfError::FormFetch { source } => source,
            other => {
                warn!(event = "core.timeout.csrf_unavailable", error = %other);
                HttpError::MissingCsrfToken {
                    url: path.to_string(),
                }
            }
        })?;
        client.keep_alive(path).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutState {
    Active,
    /// Inside the warning window; the dialog is visible.
    Warning,
    Expired,
}

impl TimeoutState {
    pub fn at(remaining: Duration, warning: Duration) -> Self {
        if remaining.is_zero() {
            TimeoutState::Expired
        } else if remaining <= warning {
            TimeoutState::Warning
        } else {
            TimeoutState::Active
        }
    }
}

/// Requests an extension from outside the countdown.
#[derive(Debug, Clone)]
pub struct TimeoutHandle(mpsc::Sender<()>);

impl TimeoutHandle {
    /// Ask for the session to be extended. Returns false once the countdown
    /// has finished. Repeated requests before the first is handled collapse
    /// into one.
    pub fn extend(&self) -> bool {
        match self.0.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutReport {
    pub extensions: usize,
    pub action: TerminalAction,
}

#[derive(Debug)]
pub struct SessionTimeout {
    timeout: Duration,
    warning: Duration,
    keep_alive_path: String,
    logout_url: String,
    auto_extend: bool,
    tick: Duration,
    tx: mpsc::Sender<()>,
    rx: mpsc::Receiver<()>,
}

impl SessionTimeout {
    pub fn new(
        timeout: Duration,
        warning: Duration,
        keep_alive_path: impl Into<String>,
        logout_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        if warning >= timeout {
            return Err(ConfigError::InvalidConfiguration {
                message: format!(
                    "session timeout warning ({}s) must be shorter than the timeout ({}s)",
                    warning.as_secs(),
                    timeout.as_secs()
                ),
            });
        }

        let (tx, rx) = mpsc::channel(1);
        Ok(Self {
            timeout,
            warning,
            keep_alive_path: keep_alive_path.into(),
            logout_url: logout_url.into(),
            auto_extend: false,
            tick: Duration::from_secs(1),
            tx,
            rx,
        })
    }

    pub fn from_config(config: &BodsConfig) -> Result<Self, ConfigError> {
        let timeout = &config.session_timeout;
        let logout_url = format!(
            "{}{}",
            config.portal.base_url().trim_end_matches('/'),
            timeout.logout_path()
        );
        Self::new(
            timeout.timeout(),
            timeout.warning(),
            timeout.keep_alive_path(),
            logout_url,
        )
    }

    /// Extend automatically as soon as the warning appears.
    pub fn with_auto_extend(mut self, auto_extend: bool) -> Self {
        self.auto_extend = auto_extend;
        self
    }

    pub fn handle(&self) -> TimeoutHandle {
        TimeoutHandle(self.tx.clone())
    }

    /// Count down until the session expires.
    pub async fn run<K, V>(self, keep_alive: Arc<K>, view: &mut V) -> TimeoutReport
    where
        K: KeepAlive,
        V: TimeoutView + ?Sized,
    {
        let SessionTimeout {
            timeout,
            warning,
            keep_alive_path,
            logout_url,
            auto_extend,
            tick,
            tx,
            mut rx,
        } = self;
        drop(tx);

        info!(
            event = "core.timeout.countdown_started",
            timeout_secs = timeout.as_secs(),
            warning_secs = warning.as_secs(),
            auto_extend = auto_extend
        );

        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut deadline = Instant::now() + timeout;
        let mut state = TimeoutState::Active;
        let mut extensions = 0;
        let mut handles_open = true;

        loop {
            let extend_requested = tokio::select! {
                _ = ticker.tick() => false,
                msg = rx.recv(), if handles_open => {
                    if msg.is_none() {
                        handles_open = false;
                    }
                    msg.is_some()
                }
            };

            if !extend_requested {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match (state, TimeoutState::at(remaining, warning)) {
                    (_, TimeoutState::Expired) => {
                        info!(
                            event = "core.timeout.session_expired",
                            extensions = extensions,
                            logout_url = %logout_url
                        );
                        view.expired(&logout_url);
                        return TimeoutReport {
                            extensions,
                            action: TerminalAction::Redirect { url: logout_url },
                        };
                    }
                    (TimeoutState::Warning, TimeoutState::Warning) => {
                        view.update_countdown(remaining);
                        continue;
                    }
                    (_, TimeoutState::Warning) => {
                        info!(
                            event = "core.timeout.warning_shown",
                            remaining_secs = remaining.as_secs()
                        );
                        state = TimeoutState::Warning;
                        view.show_warning(remaining);
                        if !auto_extend {
                            continue;
                        }
                    }
                    (_, TimeoutState::Active) => {
                        state = TimeoutState::Active;
                        continue;
                    }
                }
            }

            match extend(keep_alive.as_ref(), &keep_alive_path).await {
                Ok(()) => {
                    deadline = Instant::now() + timeout;
                    extensions += 1;
                    if state == TimeoutState::Warning {
                        view.hide_warning();
                    }
                    state = TimeoutState::Active;
                }
                Err(e) => {
                    warn!(
                        event = "core.timeout.extend_failed",
                        path = %keep_alive_path,
                        error = %e
                    );
                }
            }
        }
    }
}

async fn extend<K: KeepAlive>(keep_alive: &K, path: &str) -> Result<(), HttpError> {
    info!(event = "core.timeout.extend_started", path = path);
    keep_alive.keep_alive(path).await?;
    info!(event = "core.timeout.extend_completed", path = path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClientSettings;
    use crate::http::client::test_server::{response, serve};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeKeepAlive {
        failures: Mutex<VecDeque<bool>>,
        calls: AtomicUsize,
    }

    impl FakeKeepAlive {
        /// `true` entries fail, in call order; later calls succeed.
        fn failing(pattern: Vec<bool>) -> Self {
            Self {
                failures: Mutex::new(pattern.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl KeepAlive for FakeKeepAlive {
        async fn keep_alive(&self, _path: &str) -> Result<(), HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.failures.lock().unwrap().pop_front().unwrap_or(false);
            if fail {
                Err(HttpError::Status {
                    status: 403,
                    status_text: "Forbidden".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Recorded {
        warnings: Vec<u64>,
        countdown: Vec<u64>,
        hidden: usize,
        expired: Vec<String>,
    }

    impl TimeoutView for Recorded {
        fn show_warning(&mut self, remaining: Duration) {
            self.warnings.push(remaining.as_secs());
        }

        fn update_countdown(&mut self, remaining: Duration) {
            self.countdown.push(remaining.as_secs());
        }

        fn hide_warning(&mut self) {
            self.hidden += 1;
        }

        fn expired(&mut self, logout_url: &str) {
            self.expired.push(logout_url.to_string());
        }
    }

    fn countdown() -> SessionTimeout {
        SessionTimeout::new(
            Duration::from_secs(10),
            Duration::from_secs(3),
            "/account/keep-alive/",
            "https://publish.example/account/logout/",
        )
        .unwrap()
    }

    #[test]
    fn test_state_at() {
        let warning = Duration::from_secs(3);
        assert_eq!(
            TimeoutState::at(Duration::from_secs(10), warning),
            TimeoutState::Active
        );
        assert_eq!(
            TimeoutState::at(Duration::from_secs(3), warning),
            TimeoutState::Warning
        );
        assert_eq!(TimeoutState::at(Duration::ZERO, warning), TimeoutState::Expired);
    }

    #[test]
    fn test_warning_must_be_shorter_than_timeout() {
        assert!(
            SessionTimeout::new(Duration::from_secs(5), Duration::from_secs(5), "/k/", "/l/")
                .is_err()
        );
    }

    #[test]
    fn test_from_config_builds_logout_url() {
        let mut config = BodsConfig::default();
        config.portal.base_url = Some("https://publish.example/".to_string());
        let timeout = SessionTimeout::from_config(&config).unwrap();
        assert_eq!(timeout.logout_url, "https://publish.example/account/logout/");
        assert_eq!(timeout.keep_alive_path, "/account/keep-alive/");
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_expires_and_redirects() {
        let keep_alive = Arc::new(FakeKeepAlive::default());
        let mut view = Recorded::default();
        let started = Instant::now();

        let report = countdown().run(Arc::clone(&keep_alive), &mut view).await;

        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(view.warnings, vec![3]);
        assert_eq!(view.countdown, vec![2, 1]);
        assert_eq!(view.expired, vec!["https://publish.example/account/logout/"]);
        assert_eq!(
            report,
            TimeoutReport {
                extensions: 0,
                action: TerminalAction::Redirect {
                    url: "https://publish.example/account/logout/".to_string()
                },
            }
        );
        assert_eq!(keep_alive.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_extend_until_keep_alive_fails() {
        let keep_alive = Arc::new(FakeKeepAlive::failing(vec![false, true]));
        let mut view = Recorded::default();
        let started = Instant::now();

        let report = countdown()
            .with_auto_extend(true)
            .run(Arc::clone(&keep_alive), &mut view)
            .await;

        // Extended at t=7, warned again at t=14, extension refused, expired at t=17.
        assert_eq!(started.elapsed(), Duration::from_secs(17));
        assert_eq!(report.extensions, 1);
        assert_eq!(view.hidden, 1);
        assert_eq!(view.warnings, vec![3, 3]);
        assert_eq!(keep_alive.calls.load(Ordering::SeqCst), 2);
    }

    fn portal_client(base_url: &str, cookie: Option<&str>) -> HttpClient {
        HttpClient::new(HttpClientSettings {
            base_url: base_url.to_string(),
            cookie: cookie.map(str::to_string),
            csrf_header: "X-CSRFToken".to_string(),
            timeout: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_csrf_keep_alive_without_cookie_fails_only_on_use() {
        let keep_alive = CsrfKeepAlive::new(
            portal_client("http://127.0.0.1:9", None),
            CsrfStrategy::Cookie {
                name: "csrftoken".to_string(),
            },
            "/",
        );

        let err = keep_alive.keep_alive("/account/keep-alive/").await.unwrap_err();
        assert!(matches!(err, HttpError::MissingCsrfToken { .. }));
    }

    #[tokio::test]
    async fn test_csrf_keep_alive_resolves_token_once() {
        let form = r#"<input type="hidden" name="csrfmiddlewaretoken" value="from-form">"#;
        let (base, server) = serve(vec![
            response("200 OK", form),
            response("200 OK", "{}"),
            response("200 OK", ""),
        ])
        .await;
        let keep_alive = CsrfKeepAlive::new(
            portal_client(&base, Some("sessionid=s1")),
            CsrfStrategy::HiddenField {
                name: "csrfmiddlewaretoken".to_string(),
            },
            "/account/",
        );

        keep_alive.keep_alive("/account/keep-alive/").await.unwrap();
        keep_alive.keep_alive("/account/keep-alive/").await.unwrap();

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].starts_with("GET /account/ HTTP/1.1"));
        for post in &requests[1..] {
            assert!(post.starts_with("POST /account/keep-alive/ HTTP/1.1"));
            assert!(post.to_lowercase().contains("x-csrftoken: from-form"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_extends_session() {
        let keep_alive = Arc::new(FakeKeepAlive::default());
        let mut view = Recorded::default();
        let timeout = countdown();
        let handle = timeout.handle();
        assert!(handle.extend());

        let started = Instant::now();
        let report = timeout.run(Arc::clone(&keep_alive), &mut view).await;

        assert_eq!(report.extensions, 1);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(view.hidden, 0);
        assert!(!handle.extend());
    }
}
