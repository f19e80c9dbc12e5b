use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::http::HttpError;
use crate::page::PageContext;
use crate::poller::errors::PollError;
use crate::poller::policy::PollPolicy;
use crate::poller::source::StatusSource;
use crate::status::{self, Classification, SessionStatus, Transition, UnknownCause};
use crate::view::{StatusView, TerminalOutcome};

/// One widget's view of one long-running server job.
///
/// A session is consumed by [`PollSession::run`], so a finished session can
/// never be restarted.
#[derive(Debug)]
pub struct PollSession<P: PollPolicy> {
    name: String,
    endpoint: String,
    interval: Duration,
    sequencing: bool,
    policy: P,
    page: PageContext,
    status: SessionStatus,
    last_progress: Option<u8>,
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub outcome: TerminalOutcome,
    pub last_progress: Option<u8>,
    /// Requests issued, including any still in flight when the session ended.
    pub requests: usize,
}

impl<P: PollPolicy> PollSession<P> {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        interval: Duration,
        policy: P,
        page: PageContext,
    ) -> Result<Self, PollError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(PollError::EmptyEndpoint { endpoint });
        }
        if interval.is_zero() {
            return Err(PollError::ZeroInterval);
        }

        Ok(Self {
            name: name.into(),
            endpoint,
            interval,
            sequencing: false,
            policy,
            page,
            status: SessionStatus::Pending,
            last_progress: None,
        })
    }

    /// Drop responses issued before the newest response already applied.
    ///
    /// Off by default: responses apply in the order they resolve, so a slow
    /// early response can overwrite a faster later one.
    pub fn with_sequencing(mut self, sequencing: bool) -> Self {
        self.sequencing = sequencing;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Poll until the job reaches a terminal status.
    ///
    /// The first request goes out immediately, then one per interval. Ticks
    /// do not wait for earlier requests, so several may be in flight at once.
    /// Requests still in flight when the session finishes are dropped and
    /// their responses never reach the view.
    pub async fn run<S, V>(mut self, source: Arc<S>, view: &mut V) -> PollReport
    where
        S: StatusSource,
        V: StatusView + ?Sized,
    {
        info!(
            event = "core.poll.session_started",
            session = %self.name,
            policy = self.policy.name(),
            endpoint = %self.endpoint,
            interval_ms = self.interval.as_millis() as u64,
            sequencing = self.sequencing
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight = FuturesUnordered::new();
        let mut requests: usize = 0;
        let mut newest_applied: Option<usize> = None;

        let outcome = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let seq = requests;
                    requests += 1;
                    debug!(
                        event = "core.poll.tick_started",
                        session = %self.name,
                        seq = seq,
                        in_flight = in_flight.len()
                    );
                    let source = Arc::clone(&source);
                    let endpoint = self.endpoint.clone();
                    in_flight.push(async move { (seq, source.fetch(&endpoint).await) });
                }
                Some((seq, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    if self.sequencing && newest_applied.is_some_and(|newest| seq < newest) {
                        debug!(
                            event = "core.poll.stale_response_dropped",
                            session = %self.name,
                            seq = seq
                        );
                        continue;
                    }
                    newest_applied = Some(newest_applied.map_or(seq, |newest| newest.max(seq)));

                    if let Some(outcome) = self.apply(result, view) {
                        break outcome;
                    }
                }
            }
        };

        info!(
            event = "core.poll.session_completed",
            session = %self.name,
            status = %outcome.status,
            requests = requests,
            abandoned = in_flight.len()
        );

        PollReport {
            outcome,
            last_progress: self.last_progress,
            requests,
        }
    }

    /// Apply one response. Returns the outcome once the session is terminal.
    fn apply<V>(
        &mut self,
        result: Result<serde_json::Value, HttpError>,
        view: &mut V,
    ) -> Option<TerminalOutcome>
    where
        V: StatusView + ?Sized,
    {
        let reading = self.read(result);
        match status::apply(self.status, self.last_progress, reading) {
            Transition::Ignored => None,
            Transition::Waiting { status } => {
                self.status = status;
                None
            }
            Transition::Progressed { progress, changed } => {
                self.status = SessionStatus::InProgress;
                if changed {
                    debug!(
                        event = "core.poll.progress_changed",
                        session = %self.name,
                        progress = progress
                    );
                    self.last_progress = Some(progress);
                    view.render_progress(progress);
                }
                None
            }
            Transition::Finished { status, cause } => {
                self.status = status;
                if let Some(cause) = &cause {
                    error!(
                        event = "core.poll.session_unknown",
                        session = %self.name,
                        cause = %cause,
                        "Cannot determine job status, giving up"
                    );
                }
                let outcome = TerminalOutcome {
                    session: self.name.clone(),
                    status,
                    cause,
                    action: self.policy.terminal_action(status, &self.page),
                };
                view.render_terminal(&outcome);
                Some(outcome)
            }
        }
    }

    fn read(
        &self,
        result: Result<serde_json::Value, HttpError>,
    ) -> Result<Classification, UnknownCause> {
        let body = result.map_err(|e| UnknownCause::Transport {
            message: e.to_string(),
        })?;
        let response: P::Response =
            serde_json::from_value(body).map_err(|e| UnknownCause::Malformed {
                message: e.to_string(),
            })?;
        Ok(self.policy.classify(&response))
    }
}

/// Run independent sessions concurrently on the current task, one view each.
///
/// Sessions share nothing but the source; reports come back in input order.
pub async fn run_all<P, S, V>(
    sessions: Vec<(PollSession<P>, V)>,
    source: Arc<S>,
) -> Vec<(PollReport, V)>
where
    P: PollPolicy,
    S: StatusSource,
    V: StatusView,
{
    let runs = sessions.into_iter().map(|(session, mut view)| {
        let source = Arc::clone(&source);
        async move {
            let report = session.run(source, &mut view).await;
            (report, view)
        }
    });
    futures::future::join_all(runs).await
}
