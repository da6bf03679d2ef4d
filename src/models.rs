use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column name to raw backend type label, in the order the backend sent them.
pub type ColumnTypeMap = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickAnalysis {
    pub rows: u64,
    pub columns: u64,
    pub memory_usage: String,
    #[serde(default)]
    pub dtypes: ColumnTypeMap,
    #[serde(default)]
    pub column_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_values: Option<IndexMap<String, u64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub quick_analysis: QuickAnalysis,
}

/// Body of a non-success upload response.
#[derive(Debug, Default, Deserialize)]
pub struct UploadErrorBody {
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartParameters {
    #[serde(default)]
    pub x_axis: Option<String>,
    #[serde(default)]
    pub y_axis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSuggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub insight: String,
    pub chart_type: String,
    #[serde(default)]
    pub parameters: ChartParameters,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub visualizations: Option<Vec<VisualizationSuggestion>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub visualizations: Vec<VisualizationSuggestion>,
    pub quick_summary: QuickAnalysis,
}
