//! 2D toolpath renderer
//!
//! Maps program-space segments onto a fixed-size canvas. Program coordinates
//! are y-up and canvas coordinates are y-down, so every point is flipped with
//! `y' = canvas_height - y`. The flip uses the canvas height, not the toolpath
//! bounds, and nothing is scaled or clipped: points outside the canvas pass
//! through untouched. Output order is input order.

use serde::Serialize;

use crate::result::{Point, Segment, SegmentKind};

/// Stroke width shared by every segment kind, in canvas pixels.
pub const STROKE_WIDTH: f64 = 1.5;

/// Stroke appearance of one draw instruction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrokeStyle {
    /// CSS color
    pub color: &'static str,
    pub width: f64,
}

/// Hot color for beam-on moves.
pub const CUT_STYLE: StrokeStyle = StrokeStyle {
    color: "#ff4136",
    width: STROKE_WIDTH,
};

/// Cold color for beam-off moves.
pub const TRAVEL_STYLE: StrokeStyle = StrokeStyle {
    color: "#0074d9",
    width: STROKE_WIDTH,
};

impl StrokeStyle {
    pub fn for_kind(kind: SegmentKind) -> Self {
        match kind {
            SegmentKind::Cut => CUT_STYLE,
            SegmentKind::Travel => TRAVEL_STYLE,
        }
    }
}

/// A point in canvas space (y-down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

/// One line to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawInstruction {
    pub kind: SegmentKind,
    pub from: CanvasPoint,
    pub to: CanvasPoint,
    pub style: StrokeStyle,
}

impl DrawInstruction {
    /// Whether both endpoints lie on the canvas
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        [self.from, self.to]
            .iter()
            .all(|p| (0.0..=width).contains(&p.x) && (0.0..=height).contains(&p.y))
    }
}

/// Renderer bound to one canvas size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolpathRenderer {
    width: f64,
    height: f64,
}

impl ToolpathRenderer {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn to_canvas(&self, point: Point) -> CanvasPoint {
        CanvasPoint {
            x: point.x,
            y: self.height - point.y,
        }
    }

    pub fn render_segment(&self, segment: &Segment) -> DrawInstruction {
        DrawInstruction {
            kind: segment.kind,
            from: self.to_canvas(segment.start()),
            to: self.to_canvas(segment.end()),
            style: StrokeStyle::for_kind(segment.kind),
        }
    }

    /// Draw instructions for every segment, in input order
    pub fn render(&self, segments: &[Segment]) -> Vec<DrawInstruction> {
        let instructions: Vec<DrawInstruction> =
            segments.iter().map(|s| self.render_segment(s)).collect();

        let outside = instructions
            .iter()
            .filter(|i| !i.is_within(self.width, self.height))
            .count();
        tracing::debug!(
            "Rendered {} segments on {}x{} canvas ({} extend past the edge)",
            instructions.len(),
            self.width,
            self.height,
            outside
        );

        instructions
    }
}

/// Render segments onto a canvas of the given size
pub fn render(segments: &[Segment], canvas_width: f64, canvas_height: f64) -> Vec<DrawInstruction> {
    ToolpathRenderer::new(canvas_width, canvas_height).render(segments)
}
