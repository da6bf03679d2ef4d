use std::path::Path;

use bytes::Bytes;
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
}

impl FileKind {
    /// Detects the kind from the file extension, ignoring case.
    pub fn from_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())?;

        match extension.as_str() {
            "csv" => Some(FileKind::Csv),
            "xlsx" => Some(FileKind::Xlsx),
            "xls" => Some(FileKind::Xls),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            FileKind::Csv => "text/csv",
            FileKind::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            FileKind::Xls => "application/vnd.ms-excel",
        }
    }
}

/// A file selected by the user, ready to be sent to the analysis service.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub kind: FileKind,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Result<Self, AppError> {
        let file_name = file_name.into();
        let kind = FileKind::from_name(&file_name).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Unsupported file type: {} (supported: .csv, .xlsx, .xls)",
                file_name
            ))
        })?;

        Ok(Self {
            file_name,
            kind,
            data: data.into(),
        })
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Human readable size using 1024-based units, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut exponent = 0;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, UNITS[exponent])
}
