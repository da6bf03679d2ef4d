use super::geometry::{coord, inner_disk, layout};
use super::types::DistributionBucket;

const SLICE_STROKE: &str = "#0f172a";
const DISK_FILL: &str = "#1e293b";

/// Renders the type distribution as a standalone SVG donut chart.
///
/// With no buckets the document is empty apart from the root element.
pub fn render_donut(buckets: &[DistributionBucket], size: f64) -> String {
    let side = coord(size);
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{side}" height="{side}" viewBox="0 0 {side} {side}">"#
    );

    let slices = layout(buckets, size);
    if slices.is_empty() {
        svg.push_str("</svg>");
        return svg;
    }

    for slice in &slices {
        svg.push_str(&format!(
            r#"<g><path d="{}" fill="{}" stroke="{SLICE_STROKE}" stroke-width="2"/>"#,
            slice.path, slice.color
        ));
        if let Some(label) = &slice.label {
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" fill="white" font-size="12" font-weight="bold">{}</text>"#,
                coord(label.position.x),
                coord(label.position.y),
                label.text
            ));
        }
        svg.push_str("</g>");
    }

    let disk = inner_disk(size);
    svg.push_str(&format!(
        r#"<circle cx="{cx}" cy="{cy}" r="{}" fill="{DISK_FILL}"/><text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="middle" fill="white" font-size="14" font-weight="bold">{}</text>"#,
        coord(disk.radius),
        disk.caption,
        cx = coord(disk.center.x),
        cy = coord(disk.center.y),
    ));

    svg.push_str("</svg>");
    svg
}
