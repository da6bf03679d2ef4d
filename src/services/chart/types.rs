use std::fmt;

use serde::{Serialize, Serializer};

/// Fixed legend palette, assigned by bucket index and cycled past six buckets.
pub const PALETTE: [&str; 6] = ["#3b82f6", "#8b5cf6", "#10b981", "#f59e0b", "#ef4444", "#06b6d4"];

/// Display category of a column.
///
/// `Other` keeps the raw backend label so unknown types still get their own
/// legend entry under their original name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Integer,
    Float,
    Text,
    Date,
    Other(String),
}

impl SemanticType {
    pub fn label(&self) -> &str {
        match self {
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Text => "text",
            SemanticType::Date => "date",
            SemanticType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for SemanticType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub category: SemanticType,
    pub count: usize,
    /// Rounded independently per bucket, so a set of buckets may not sum to 100.
    pub percentage: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceLabel {
    pub position: Point,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcSlice {
    pub category: SemanticType,
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
    pub sweep_angle_deg: f64,
    pub large_arc: bool,
    pub path: String,
    pub label: Option<SliceLabel>,
    pub color: &'static str,
}

/// Centered disk drawn over the slices, turning the pie into a donut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InnerDisk {
    pub center: Point,
    pub radius: f64,
    pub caption: &'static str,
}
