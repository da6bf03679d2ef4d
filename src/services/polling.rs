use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::models::VisualizationSuggestion;
use crate::services::backend_client::AnalysisBackend;

const STATUS_COMPLETED: &str = "completed";
const STATUS_ERROR: &str = "error";
const DEFAULT_ANALYSIS_ERROR: &str = "analysis failed";

/// Attempt budget and fixed delay between status checks. No backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Idle,
    /// `attempts` status checks have come back with a non-terminal status so far.
    Polling { attempts: u32 },
    Completed(Vec<VisualizationSuggestion>),
    Errored(String),
    TimedOut,
    /// A newer session superseded this one.
    Cancelled,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Idle | PollState::Polling { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PollState::Polling { .. })
    }
}

pub type TransitionFn = Arc<dyn Fn(&str, &PollState) + Send + Sync>;

/// Polls the analysis service for one session until it completes, fails,
/// runs out of attempts or is cancelled.
///
/// A controller runs once: [`run`](Self::run) and [`start`](Self::start)
/// consume it. A new upload gets a new controller.
pub struct JobPollingController {
    backend: Arc<dyn AnalysisBackend>,
    policy: PollPolicy,
    session_id: String,
    cancel: CancellationToken,
    state: PollState,
    on_transition: Option<TransitionFn>,
}

impl JobPollingController {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        policy: PollPolicy,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            policy,
            session_id: session_id.into(),
            cancel: CancellationToken::new(),
            state: PollState::Idle,
            on_transition: None,
        }
    }

    /// Called with the session id on every state change, including the
    /// terminal one.
    pub fn on_transition(mut self, callback: TransitionFn) -> Self {
        self.on_transition = Some(callback);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Spawns the polling loop on the runtime.
    pub fn start(self) -> PollHandle {
        let session_id = self.session_id.clone();
        let cancel = self.cancel.clone();
        let task = tokio::spawn(self.run());

        PollHandle {
            session_id,
            cancel,
            task,
        }
    }

    /// Runs the polling loop to a terminal state and returns it.
    ///
    /// Attempts are strictly sequential. A failed status request ends the run
    /// immediately; only in-progress statuses are retried.
    pub async fn run(mut self) -> PollState {
        let mut attempts = 0u32;
        self.transition(PollState::Polling { attempts });
        tracing::info!("Polling analysis status for session {}", self.session_id);

        loop {
            let response = tokio::select! {
                _ = self.cancel.cancelled() => None,
                response = self.backend.fetch_status(&self.session_id) => Some(response),
            };

            let status = match response {
                None => return self.finish(PollState::Cancelled),
                Some(Ok(status)) => status,
                Some(Err(e)) => {
                    tracing::warn!("Polling stopped for session {}: {}", self.session_id, e);
                    return self.finish(PollState::Errored(e.to_string()));
                }
            };

            match status.status.as_str() {
                STATUS_COMPLETED => {
                    let visualizations = status.visualizations.unwrap_or_default();
                    tracing::info!(
                        "Analysis for session {} completed with {} visualizations",
                        self.session_id,
                        visualizations.len()
                    );
                    return self.finish(PollState::Completed(visualizations));
                }
                STATUS_ERROR => {
                    let message = status
                        .error
                        .unwrap_or_else(|| DEFAULT_ANALYSIS_ERROR.to_string());
                    tracing::warn!("Session {}: {}", self.session_id, AppError::Analysis(message.clone()));
                    return self.finish(PollState::Errored(message));
                }
                other => {
                    attempts += 1;
                    tracing::debug!(
                        "Session {} still {} after attempt {}/{}",
                        self.session_id,
                        other,
                        attempts,
                        self.policy.max_attempts
                    );
                    if attempts >= self.policy.max_attempts {
                        tracing::warn!(
                            "Session {}: {} after {} attempts",
                            self.session_id,
                            AppError::AnalysisTimeout,
                            attempts
                        );
                        return self.finish(PollState::TimedOut);
                    }
                    self.transition(PollState::Polling { attempts });
                }
            }

            let cancelled = tokio::select! {
                _ = self.cancel.cancelled() => true,
                _ = tokio::time::sleep(self.policy.interval) => false,
            };
            if cancelled {
                return self.finish(PollState::Cancelled);
            }
        }
    }

    fn transition(&mut self, next: PollState) {
        if let Some(callback) = &self.on_transition {
            callback(&self.session_id, &next);
        }
        self.state = next;
    }

    fn finish(mut self, terminal: PollState) -> PollState {
        if terminal == PollState::Cancelled {
            tracing::info!("Polling cancelled for session {}", self.session_id);
        }
        self.transition(terminal);
        self.state
    }
}

/// A running poll loop.
#[derive(Debug)]
pub struct PollHandle {
    session_id: String,
    cancel: CancellationToken,
    task: JoinHandle<PollState>,
}

impl PollHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Stops the loop at its next suspension point. No further transitions
    /// are reported after `Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> PollState {
        self.task.await.unwrap_or_else(|e| {
            tracing::error!("Polling task for session {} failed: {}", self.session_id, e);
            PollState::Errored(format!("polling task failed: {}", e))
        })
    }
}
