//! In-memory analysis service for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::AppError;
use crate::models::{QuickAnalysis, StatusResponse, UploadResponse, VisualizationSuggestion};
use crate::services::backend_client::AnalysisBackend;
use crate::services::upload::UploadFile;

type StatusScript = VecDeque<Result<StatusResponse, AppError>>;
type UploadScript = VecDeque<(Duration, Result<UploadResponse, AppError>)>;

/// Replays scripted responses, then falls back to a fixed status.
pub struct ScriptedBackend {
    uploads: Mutex<UploadScript>,
    statuses: Mutex<StatusScript>,
    per_session: Mutex<HashMap<String, StatusScript>>,
    fallback: StatusResponse,
    status_calls: AtomicU32,
    calls_by_session: Mutex<HashMap<String, u32>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<StatusResponse, AppError>>, fallback: StatusResponse) -> Self {
        Self {
            uploads: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(script.into()),
            per_session: Mutex::new(HashMap::new()),
            fallback,
            status_calls: AtomicU32::new(0),
            calls_by_session: Mutex::new(HashMap::new()),
        }
    }

    pub fn always(status: StatusResponse) -> Self {
        Self::new(Vec::new(), status)
    }

    pub fn with_upload(self, response: Result<UploadResponse, AppError>) -> Self {
        self.with_slow_upload(Duration::ZERO, response)
    }

    /// Queues an upload response that only arrives after `delay`.
    pub fn with_slow_upload(self, delay: Duration, response: Result<UploadResponse, AppError>) -> Self {
        self.uploads.lock().push_back((delay, response));
        self
    }

    pub fn with_session_script(
        self,
        session_id: &str,
        script: Vec<Result<StatusResponse, AppError>>,
    ) -> Self {
        self.per_session
            .lock()
            .insert(session_id.to_string(), script.into());
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, session_id: &str) -> u32 {
        self.calls_by_session
            .lock()
            .get(session_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn upload(&self, _file: UploadFile) -> Result<UploadResponse, AppError> {
        let next = self.uploads.lock().pop_front();
        let Some((delay, response)) = next else {
            return Err(AppError::Upload("no upload scripted".to_string()));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        response
    }

    async fn fetch_status(&self, session_id: &str) -> Result<StatusResponse, AppError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_session
            .lock()
            .entry(session_id.to_string())
            .or_insert(0) += 1;

        if let Some(next) = self
            .per_session
            .lock()
            .get_mut(session_id)
            .and_then(VecDeque::pop_front)
        {
            return next;
        }

        let next = self.statuses.lock().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

pub fn pending() -> StatusResponse {
    StatusResponse {
        status: "processing".to_string(),
        visualizations: None,
        error: None,
    }
}

pub fn completed(visualizations: Vec<VisualizationSuggestion>) -> StatusResponse {
    StatusResponse {
        status: "completed".to_string(),
        visualizations: Some(visualizations),
        error: None,
    }
}

pub fn error_status(message: Option<&str>) -> StatusResponse {
    StatusResponse {
        status: "error".to_string(),
        visualizations: None,
        error: message.map(str::to_string),
    }
}

pub fn uploaded(session_id: &str, dtypes: &[(&str, &str)]) -> UploadResponse {
    UploadResponse {
        session_id: session_id.to_string(),
        quick_analysis: QuickAnalysis {
            rows: 120,
            columns: dtypes.len() as u64,
            memory_usage: "0.02 MB".to_string(),
            dtypes: dtypes
                .iter()
                .map(|(name, raw)| (name.to_string(), raw.to_string()))
                .collect(),
            column_names: dtypes.iter().map(|(name, _)| name.to_string()).collect(),
            missing_values: None,
        },
    }
}
