//! SVG export of draw instructions
//!
//! Writes one `<line>` element per instruction, in instruction order, so later
//! segments paint over earlier ones exactly as on the canvas.

use std::fmt::Write;

use crate::renderer::DrawInstruction;

/// Serialize draw instructions as a standalone SVG document
pub fn render_svg(instructions: &[DrawInstruction], width: f64, height: f64) -> String {
    let mut svg = String::with_capacity(128 + instructions.len() * 96);

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    );
    let _ = writeln!(
        svg,
        r##"  <rect width="100%" height="100%" fill="#ffffff"/>"##
    );

    for instruction in instructions {
        let _ = writeln!(
            svg,
            r#"  <line class="{}" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}" stroke-linecap="round"/>"#,
            instruction.kind.as_str(),
            instruction.from.x,
            instruction.from.y,
            instruction.to.x,
            instruction.to.y,
            instruction.style.color,
            instruction.style.width
        );
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::render;
    use crate::result::{Point, Segment, SegmentKind};

    #[test]
    fn test_one_line_per_instruction() {
        let segments = [
            Segment::new(SegmentKind::Travel, Point::new(0.0, 0.0), Point::new(5.0, 5.0)),
            Segment::new(SegmentKind::Cut, Point::new(5.0, 5.0), Point::new(10.0, 5.0)),
        ];
        let svg = render_svg(&render(&segments, 400.0, 400.0), 400.0, 400.0);

        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<line ").count(), 2);

        let travel = svg.find(r#"class="travel""#).unwrap();
        let cut = svg.find(r#"class="cut""#).unwrap();
        assert!(travel < cut);

        assert!(svg.contains(r##"x1="0.00" y1="400.00" x2="5.00" y2="395.00" stroke="#0074d9""##));
        assert!(svg.contains(r##"stroke="#ff4136" stroke-width="1.5""##));
    }

    #[test]
    fn test_empty_document() {
        let svg = render_svg(&[], 320.0, 240.0);
        assert!(svg.contains(r#"viewBox="0 0 320 240""#));
        assert!(!svg.contains("<line"));
    }
}
