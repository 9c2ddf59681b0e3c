//! Shape generation for wheel sectors and labels
//!
//! Works in a 100×100 box centred on (50, 50), matching the SVG viewBox the
//! DOM renderer uses. Label positions are percentages of the wheel element.

use glam::DVec2;

use crate::consts::FULL_TURN_DEG;
use crate::polar_to_cartesian;
use crate::wheel::{WeightPartition, WheelArc};

/// Sector fill colors, cycled in partition order
pub const PALETTE: [&str; 10] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#d35400", "#34495e",
    "#e67e22", "#16a085",
];

const CENTER: DVec2 = DVec2::new(50.0, 50.0);
const RADIUS: f64 = 50.0;

/// A sector ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct SectorShape {
    pub arc: WheelArc,
    pub color: &'static str,
    /// SVG path data
    pub path: String,
    pub label: LabelShape,
}

/// A sector label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelShape {
    pub text: String,
    /// Position in percent of the wheel box
    pub pos: DVec2,
    pub font_px: u32,
}

/// SVG path for a pie sector from `start_deg` to `end_deg` (clockwise, screen space)
pub fn sector_path(start_deg: f64, end_deg: f64) -> String {
    let span = end_deg - start_deg;

    if span >= FULL_TURN_DEG - 1e-6 {
        // A single arc command cannot close a full circle; draw two halves
        let top = CENTER + DVec2::new(0.0, -RADIUS);
        let bottom = CENTER + DVec2::new(0.0, RADIUS);
        return format!(
            "M {:.4} {:.4} A {r} {r} 0 1 1 {:.4} {:.4} A {r} {r} 0 1 1 {:.4} {:.4} Z",
            top.x,
            top.y,
            bottom.x,
            bottom.y,
            top.x,
            top.y,
            r = RADIUS
        );
    }

    let start = CENTER + polar_to_cartesian(RADIUS, start_deg);
    let end = CENTER + polar_to_cartesian(RADIUS, end_deg);
    let large_arc = if span > 180.0 { 1 } else { 0 };

    format!(
        "M {} {} L {:.4} {:.4} A {r} {r} 0 {} 1 {:.4} {:.4} Z",
        CENTER.x,
        CENTER.y,
        start.x,
        start.y,
        large_arc,
        end.x,
        end.y,
        r = RADIUS
    )
}

/// Label anchor: sector mid-angle at 70% radius, 50% for narrow sectors
pub fn label_position(start_deg: f64, span_deg: f64) -> DVec2 {
    let ratio = if span_deg < 20.0 { 0.5 } else { 0.7 };
    CENTER + polar_to_cartesian(RADIUS * ratio, start_deg + span_deg / 2.0)
}

/// Font size shrinks with the sector
pub fn label_font_px(span_deg: f64) -> u32 {
    if span_deg < 15.0 {
        14
    } else if span_deg < 30.0 {
        16
    } else {
        18
    }
}

/// Build every sector of a wheel
pub fn wheel_shapes(partition: &WeightPartition) -> Vec<SectorShape> {
    partition
        .arcs()
        .into_iter()
        .zip(partition.entries())
        .enumerate()
        .map(|(i, (arc, entry))| {
            let span = arc.end_deg - arc.start_deg;
            let label = LabelShape {
                text: format!("{} ({:.1}%)", entry.key, partition.percentage(entry)),
                pos: label_position(arc.start_deg, span),
                font_px: label_font_px(span),
            };
            SectorShape {
                path: sector_path(arc.start_deg, arc.end_deg),
                color: PALETTE[i % PALETTE.len()],
                label,
                arc,
            }
        })
        .collect()
}

/// Escape text for HTML/SVG markup
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup for the whole wheel: one `.roulette-section` per sector
pub fn wheel_markup(shapes: &[SectorShape]) -> String {
    let mut html = String::new();
    for shape in shapes {
        let key = escape_markup(&shape.arc.key.to_string());
        html.push_str(&format!(
            concat!(
                r#"<div class="roulette-section" data-item="{key}" data-start-angle="{start:.4}" data-end-angle="{end:.4}">"#,
                r#"<svg viewBox="0 0 100 100" preserveAspectRatio="xMidYMid meet" style="position:absolute;width:100%;height:100%;top:0;left:0">"#,
                r#"<path d="{path}" fill="{color}"></path></svg>"#,
                r#"<div class="section-label" style="position:absolute;left:{x:.2}%;top:{y:.2}%;transform:translate(-50%, -50%);font-size:{font}px">{label}</div>"#,
                "</div>"
            ),
            key = key,
            start = shape.arc.start_deg,
            end = shape.arc.end_deg,
            path = shape.path,
            color = shape.color,
            x = shape.label.pos.x,
            y = shape.label.pos.y,
            font = shape.label.font_px,
            label = escape_markup(&shape.label.text),
        ));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::OutcomeKey;

    fn partition(pairs: &[(&str, i64)]) -> WeightPartition {
        let weights: Vec<_> = pairs.iter().map(|(k, w)| (OutcomeKey::parse(k), *w)).collect();
        WeightPartition::build(&weights).unwrap()
    }

    #[test]
    fn test_sector_path_quarter() {
        let d = sector_path(0.0, 90.0);
        assert_eq!(d, "M 50 50 L 100.0000 50.0000 A 50 50 0 0 1 50.0000 100.0000 Z");
    }

    #[test]
    fn test_sector_path_large_arc_flag() {
        assert!(sector_path(0.0, 270.0).contains(" 0 1 1 "));
        assert!(sector_path(0.0, 180.0).contains(" 0 0 1 "));
    }

    #[test]
    fn test_sector_path_full_circle() {
        let d = sector_path(0.0, 360.0);
        assert_eq!(d.matches(" A ").count(), 2);
    }

    #[test]
    fn test_label_position_narrow_sector_moves_inward() {
        let wide = label_position(0.0, 40.0);
        let narrow = label_position(0.0, 10.0);
        assert!((wide - CENTER).length() > (narrow - CENTER).length());
        assert!(((narrow - CENTER).length() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_shapes() {
        let p = partition(&[("+1日", 25), ("-1日", 75)]);
        let shapes = wheel_shapes(&p);
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].label.text, "+1日 (25.0%)");
        assert_eq!(shapes[1].color, PALETTE[1]);
        assert_eq!(shapes[1].arc.end_deg, 360.0);
        assert_eq!(shapes[0].label.font_px, 18);
    }

    #[test]
    fn test_wheel_markup_escapes_keys() {
        let p = partition(&[("<b>&", 1)]);
        let html = wheel_markup(&wheel_shapes(&p));
        assert!(html.contains("data-item=\"&lt;b&gt;&amp;\""));
        assert!(!html.contains("<b>&"));
        assert!(html.contains("data-end-angle=\"360.0000\""));
    }
}
