use super::types::SemanticType;

/// Substring rules checked in order; the first hit wins.
const RULES: [(&str, SemanticType); 4] = [
    ("int", SemanticType::Integer),
    ("float", SemanticType::Float),
    ("object", SemanticType::Text),
    ("datetime", SemanticType::Date),
];

/// Maps a raw backend dtype label (`int64`, `float32`, `object`,
/// `datetime64[ns]`, ...) to its display category.
///
/// Matching is case-sensitive. Labels matching no rule fall back to
/// [`SemanticType::Other`] carrying the label unchanged, except labels that
/// already spell a category name, which resolve to that category. `Other`
/// never carries a built-in name.
pub fn normalize(raw_type: &str) -> SemanticType {
    RULES
        .iter()
        .find(|(needle, _)| raw_type.contains(*needle))
        .map(|(_, category)| category.clone())
        .unwrap_or_else(|| match raw_type {
            "text" => SemanticType::Text,
            "date" => SemanticType::Date,
            _ => SemanticType::Other(raw_type.to_string()),
        })
}
