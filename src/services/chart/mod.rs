pub mod aggregator;
pub mod geometry;
pub mod normalizer;
pub mod svg;
pub mod types;

pub use aggregator::aggregate;
pub use geometry::{inner_disk, layout};
pub use normalizer::normalize;
pub use svg::render_donut;
pub use types::{ArcSlice, DistributionBucket, InnerDisk, SemanticType};
