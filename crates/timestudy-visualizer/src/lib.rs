//! # timestudy Visualizer
//!
//! Turns analysis service responses into typed results and draws their
//! toolpaths on a 2D canvas.

pub mod renderer;
pub mod result;
pub mod svg;

pub use renderer::{
    render, CanvasPoint, DrawInstruction, StrokeStyle, ToolpathRenderer, CUT_STYLE, STROKE_WIDTH,
    TRAVEL_STYLE,
};
pub use result::{
    interpret, AnalysisResult, FinalModes, Point, ResultInterpreter, Segment, SegmentKind,
    TotalCheck,
};
pub use svg::render_svg;
