use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{AnalysisResult, QuickAnalysis, VisualizationSuggestion};
use crate::services::backend_client::AnalysisBackend;
use crate::services::chart::{self, ArcSlice, DistributionBucket};
use crate::services::polling::{JobPollingController, PollHandle, PollPolicy, PollState};
use crate::services::upload::{format_file_size, FileKind, UploadFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Polling,
    Completed,
    Errored,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub kind: FileKind,
    pub size: usize,
    pub size_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub rows: u64,
    pub columns: u64,
    pub memory_usage: String,
    pub typed_columns: usize,
}

/// One column of the dataset structure view, in file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub raw_type: String,
}

/// Lists `column_names` in order. Columns missing from `dtypes` show as `object`.
fn column_structure(quick: &QuickAnalysis) -> Vec<ColumnInfo> {
    quick
        .column_names
        .iter()
        .map(|name| ColumnInfo {
            name: name.clone(),
            raw_type: quick
                .dtypes
                .get(name)
                .cloned()
                .unwrap_or_else(|| "object".to_string()),
        })
        .collect()
}

/// Everything the dashboard shows at one point in time. Never mutated after
/// it is published; each transition publishes a fresh snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub session: Option<SessionInfo>,
    pub loading: bool,
    pub file: Option<FileInfo>,
    pub summary: Option<SummaryMetrics>,
    pub quick_analysis: Option<QuickAnalysis>,
    pub columns: Vec<ColumnInfo>,
    pub distribution: Vec<DistributionBucket>,
    pub visualizations: Vec<VisualizationSuggestion>,
}

impl DashboardSnapshot {
    pub fn status(&self) -> Option<SessionStatus> {
        self.session.as_ref().map(|s| s.status)
    }

    pub fn chart_slices(&self, diameter: f64) -> Vec<ArcSlice> {
        chart::layout(&self.distribution, diameter)
    }

    pub fn chart_svg(&self, diameter: f64) -> String {
        chart::render_donut(&self.distribution, diameter)
    }

    /// The full analysis, once the session has completed.
    pub fn result(&self) -> Option<AnalysisResult> {
        if self.status() != Some(SessionStatus::Completed) {
            return None;
        }
        self.quick_analysis.as_ref().map(|quick| AnalysisResult {
            visualizations: self.visualizations.clone(),
            quick_summary: quick.clone(),
        })
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    generation: u64,
    snapshot: Arc<DashboardSnapshot>,
}

/// Single slot holding the current dashboard snapshot.
///
/// Writes name the upload generation or session they belong to and are
/// dropped when that upload or session is no longer the current one.
#[derive(Debug, Default)]
pub struct DashboardStore {
    inner: RwLock<StoreInner>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.inner.read().snapshot.clone()
    }

    /// Clears the previous session and returns the generation of the new upload.
    pub fn begin_upload(&self, file: &UploadFile) -> u64 {
        let mut inner = self.inner.write();
        inner.generation += 1;
        inner.snapshot = Arc::new(DashboardSnapshot {
            loading: true,
            file: Some(FileInfo {
                name: file.file_name.clone(),
                kind: file.kind,
                size: file.size(),
                size_label: format_file_size(file.size() as u64),
            }),
            ..Default::default()
        });
        inner.generation
    }

    pub fn upload_failed(&self, generation: u64) -> bool {
        self.update_if(
            |inner| inner.generation == generation,
            |next| next.loading = false,
        )
        .is_some()
    }

    /// Publishes the new session and returns the snapshot it produced, or
    /// `None` when a newer upload has taken over.
    pub fn session_started(
        &self,
        generation: u64,
        session_id: &str,
        quick: QuickAnalysis,
    ) -> Option<Arc<DashboardSnapshot>> {
        let now = Utc::now();
        self.update_if(
            |inner| inner.generation == generation && inner.snapshot.session.is_none(),
            |next| {
                next.session = Some(SessionInfo {
                    id: session_id.to_string(),
                    status: SessionStatus::Pending,
                    started_at: now,
                    updated_at: now,
                });
                next.loading = true;
                next.summary = Some(SummaryMetrics {
                    rows: quick.rows,
                    columns: quick.columns,
                    memory_usage: quick.memory_usage.clone(),
                    typed_columns: quick.dtypes.len(),
                });
                next.columns = column_structure(&quick);
                next.distribution = chart::aggregate(&quick.dtypes);
                next.visualizations.clear();
                next.quick_analysis = Some(quick);
            },
        )
    }

    /// Applies a polling transition for `session_id`. Returns `false` when the
    /// session is no longer current and the transition was dropped.
    pub fn apply_poll_state(&self, session_id: &str, state: &PollState) -> bool {
        let is_current = |inner: &StoreInner| {
            inner
                .snapshot
                .session
                .as_ref()
                .is_some_and(|s| s.id == session_id)
        };

        self.update_if(is_current, |next| {
            let status = match state {
                PollState::Idle => None,
                PollState::Polling { .. } => Some(SessionStatus::Polling),
                PollState::Completed(visualizations) => {
                    next.visualizations = visualizations.clone();
                    Some(SessionStatus::Completed)
                }
                PollState::Errored(_) => Some(SessionStatus::Errored),
                PollState::TimedOut => Some(SessionStatus::TimedOut),
                PollState::Cancelled => None,
            };

            next.loading = state.is_loading();
            if let (Some(session), Some(status)) = (next.session.as_mut(), status) {
                session.status = status;
                session.updated_at = Utc::now();
            }
        })
        .is_some()
    }

    fn update_if(
        &self,
        accept: impl FnOnce(&StoreInner) -> bool,
        apply: impl FnOnce(&mut DashboardSnapshot),
    ) -> Option<Arc<DashboardSnapshot>> {
        let mut inner = self.inner.write();
        if !accept(&*inner) {
            return None;
        }
        let mut next = (*inner.snapshot).clone();
        apply(&mut next);
        inner.snapshot = Arc::new(next);
        Some(inner.snapshot.clone())
    }
}

/// Wires uploads to polling and keeps the dashboard store current.
///
/// At most one poll runs at a time: a new upload cancels the previous
/// session's poll before it starts.
pub struct SessionOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    policy: PollPolicy,
    store: Arc<DashboardStore>,
    active: Mutex<Option<PollHandle>>,
    max_file_size: usize,
}

impl SessionOrchestrator {
    pub fn new(backend: Arc<dyn AnalysisBackend>, policy: PollPolicy, max_file_size: usize) -> Self {
        Self {
            backend,
            policy,
            store: Arc::new(DashboardStore::new()),
            active: Mutex::new(None),
            max_file_size,
        }
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.store.snapshot()
    }

    /// Sends the file and starts polling the new session.
    ///
    /// Upload failures are returned to the caller. Anything that goes wrong
    /// afterwards only shows up in the snapshot status and the logs.
    pub async fn upload(&self, file: UploadFile) -> Result<Arc<DashboardSnapshot>, AppError> {
        if file.size() > self.max_file_size {
            tracing::warn!(
                "{} is {}, above the recommended {}",
                file.file_name,
                format_file_size(file.size() as u64),
                format_file_size(self.max_file_size as u64)
            );
        }

        self.cancel_active();
        let generation = self.store.begin_upload(&file);

        let response = match self.backend.upload(file).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Upload failed: {}", e);
                self.store.upload_failed(generation);
                return Err(e);
            }
        };

        tracing::info!(
            "Session {} created: {} rows, {} columns",
            response.session_id,
            response.quick_analysis.rows,
            response.quick_analysis.columns
        );

        let Some(started) =
            self.store.session_started(generation, &response.session_id, response.quick_analysis)
        else {
            tracing::info!("Session {} superseded by a newer upload", response.session_id);
            return Err(AppError::Superseded);
        };

        self.start_polling(response.session_id);
        Ok(started)
    }

    fn start_polling(&self, session_id: String) {
        let store = self.store.clone();
        let handle = JobPollingController::new(self.backend.clone(), self.policy, session_id)
            .on_transition(Arc::new(move |id: &str, state: &PollState| {
                if !store.apply_poll_state(id, state) {
                    tracing::debug!("Dropped {:?} for stale session {}", state, id);
                }
            }))
            .start();

        if let Some(previous) = self.active.lock().replace(handle) {
            previous.cancel();
        }
    }

    /// Cancels the running poll, if any.
    pub fn cancel_active(&self) {
        if let Some(previous) = self.active.lock().take() {
            if !previous.is_finished() {
                tracing::info!("Cancelling poll for session {}", previous.session_id());
            }
            previous.cancel();
        }
    }

    /// Waits for the running poll to reach its terminal state.
    pub async fn wait_for_active(&self) -> Option<PollState> {
        let handle = self.active.lock().take();
        match handle {
            Some(handle) => Some(handle.join().await),
            None => None,
        }
    }
}
