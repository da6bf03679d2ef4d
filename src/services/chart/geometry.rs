use super::types::{ArcSlice, DistributionBucket, InnerDisk, Point, SliceLabel};

/// Slices at or above this sweep are drawn as a full circle.
const FULL_CIRCLE_DEG: f64 = 359.999;
/// Slices must cover strictly more than this share (percent) to get a label.
const LABEL_MIN_SHARE: f64 = 10.0;
/// Radii below are percentages of the chart radius.
const LABEL_RADIUS_PCT: f64 = 70.0;
const INNER_DISK_PCT: f64 = 30.0;
pub const INNER_DISK_CAPTION: &str = "Tipos";

/// Lays out one sector per bucket on a circle of the given diameter.
///
/// Angles start at 0° on the positive x axis and grow clockwise in screen
/// space. Sweeps are computed from raw counts, so they always add up to 360°
/// even when the rounded percentages do not add up to 100.
pub fn layout(buckets: &[DistributionBucket], diameter: f64) -> Vec<ArcSlice> {
    let total: usize = buckets.iter().map(|b| b.count).sum();
    if total == 0 {
        return Vec::new();
    }

    let radius = diameter / 2.0;
    let mut current_angle = 0.0_f64;

    buckets
        .iter()
        .map(|bucket| {
            let share_pct = 100.0 * bucket.count as f64 / total as f64;
            let sweep = 360.0 * (bucket.count as f64 / total as f64);
            let start = current_angle;
            let end = current_angle + sweep;
            let large_arc = sweep > 180.0;

            let path = if sweep >= FULL_CIRCLE_DEG {
                full_circle_path(radius, start)
            } else {
                sector_path(radius, start, end, large_arc)
            };

            let label = (share_pct > LABEL_MIN_SHARE).then(|| SliceLabel {
                position: point_on_circle(radius, radius * LABEL_RADIUS_PCT / 100.0, start + sweep / 2.0),
                text: format!("{}%", bucket.percentage),
            });

            current_angle = end;

            ArcSlice {
                category: bucket.category.clone(),
                start_angle_deg: start,
                end_angle_deg: end,
                sweep_angle_deg: sweep,
                large_arc,
                path,
                label,
                color: bucket.color,
            }
        })
        .collect()
}

/// The donut hole drawn on top of the slices.
pub fn inner_disk(diameter: f64) -> InnerDisk {
    let radius = diameter / 2.0;
    InnerDisk {
        center: Point { x: radius, y: radius },
        radius: radius * INNER_DISK_PCT / 100.0,
        caption: INNER_DISK_CAPTION,
    }
}

fn point_on_circle(center: f64, radius: f64, angle_deg: f64) -> Point {
    let theta = angle_deg.to_radians();
    Point {
        x: center + radius * theta.cos(),
        y: center + radius * theta.sin(),
    }
}

fn sector_path(radius: f64, start_deg: f64, end_deg: f64, large_arc: bool) -> String {
    let from = point_on_circle(radius, radius, start_deg);
    let to = point_on_circle(radius, radius, end_deg);
    format!(
        "M {c} {c} L {} {} A {r} {r} 0 {} 1 {} {} Z",
        coord(from.x),
        coord(from.y),
        u8::from(large_arc),
        coord(to.x),
        coord(to.y),
        c = coord(radius),
        r = coord(radius),
    )
}

// Start and end coincide on a full turn, so a single arc command would draw
// nothing. Two half arcs through the opposite point close the circle.
fn full_circle_path(radius: f64, start_deg: f64) -> String {
    let from = point_on_circle(radius, radius, start_deg);
    let opposite = point_on_circle(radius, radius, start_deg + 180.0);
    format!(
        "M {c} {c} L {x1} {y1} A {r} {r} 0 1 1 {x2} {y2} A {r} {r} 0 1 1 {x1} {y1} Z",
        c = coord(radius),
        r = coord(radius),
        x1 = coord(from.x),
        y1 = coord(from.y),
        x2 = coord(opposite.x),
        y2 = coord(opposite.y),
    )
}

/// Three decimals, trailing zeros dropped, no negative zero.
pub(crate) fn coord(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0 + 0.0;
    format!("{}", rounded)
}
