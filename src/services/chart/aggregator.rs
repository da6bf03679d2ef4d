use indexmap::IndexMap;

use super::normalizer::normalize;
use super::types::{DistributionBucket, SemanticType, PALETTE};
use crate::models::ColumnTypeMap;

/// Groups columns by display category.
///
/// Buckets come out in the order each category is first seen while walking
/// the columns, which fixes both legend order and color assignment. An empty
/// map yields no buckets.
pub fn aggregate(column_types: &ColumnTypeMap) -> Vec<DistributionBucket> {
    let total = column_types.len();
    if total == 0 {
        return Vec::new();
    }

    let mut counts: IndexMap<SemanticType, usize> = IndexMap::new();
    for raw_type in column_types.values() {
        *counts.entry(normalize(raw_type)).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, (category, count))| DistributionBucket {
            category,
            count,
            percentage: rounded_percentage(count, total),
            color: PALETTE[index % PALETTE.len()],
        })
        .collect()
}

fn rounded_percentage(count: usize, total: usize) -> u32 {
    (100.0 * count as f64 / total as f64).round() as u32
}
