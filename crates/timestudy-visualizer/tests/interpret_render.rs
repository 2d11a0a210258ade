use proptest::prelude::*;
use serde_json::json;
use timestudy_core::{MismatchSeverity, Positioning, SchemaError, Units};
use timestudy_visualizer::{
    interpret, render, render_svg, CanvasPoint, Point, ResultInterpreter, Segment, SegmentKind,
    TotalCheck, CUT_STYLE, TRAVEL_STYLE,
};

fn bracket_response() -> serde_json::Value {
    json!({
        "filename": "bracket.nc",
        "cut_time_sec": 42.125,
        "travel_time_sec": 6.5,
        "pierce_time_sec": 1.5,
        "dwell_time_sec": 0.0,
        "lifter_time_sec": 0.3,
        "total_time_sec": 50.425,
        "pierce_count": 3,
        "beam_cycles": 3,
        "final_modes": { "units": "inch", "positioning": "absolute" },
        "toolpath": [
            { "type": "travel", "points": [[0.0, 0.0], [1.0, 1.0]] },
            { "type": "cut", "points": [[1.0, 1.0], [4.0, 1.0]] },
            { "type": "cut", "points": [[4.0, 1.0], [4.0, 3.0]] },
            { "type": "travel", "points": [[4.0, 3.0], [0.0, 0.0]] }
        ]
    })
}

#[test]
fn test_interpret_then_render() {
    let body = serde_json::to_vec(&bracket_response()).unwrap();
    let result = ResultInterpreter::default().interpret(&body).unwrap();

    assert_eq!(result.filename, "bracket.nc");
    assert_eq!(result.pierce_count, 3);
    let modes = result.final_modes.unwrap();
    assert_eq!(modes.units, Units::Inch);
    assert_eq!(modes.positioning, Positioning::Absolute);
    assert_eq!(result.cut_segments(), 2);
    assert_eq!(result.travel_segments(), 2);

    let drawn = render(&result.toolpath, 400.0, 400.0);
    assert_eq!(drawn.len(), 4);
    assert_eq!(drawn[0].style, TRAVEL_STYLE);
    assert_eq!(drawn[1].style, CUT_STYLE);
    assert_eq!(drawn[1].from, CanvasPoint { x: 1.0, y: 399.0 });
    assert_eq!(drawn[2].to, CanvasPoint { x: 4.0, y: 397.0 });

    let svg = render_svg(&drawn, 400.0, 400.0);
    assert_eq!(svg.matches("<line ").count(), 4);
}

#[test]
fn test_interpretation_is_repeatable() {
    let body = serde_json::to_vec(&bracket_response()).unwrap();
    assert_eq!(interpret(&body), interpret(&body));
}

#[test]
fn test_mismatch_policy() {
    let mut response = bracket_response();
    response["total_time_sec"] = json!(60.0);
    let body = serde_json::to_vec(&response).unwrap();

    // Warn keeps the service's total untouched
    let result = ResultInterpreter::new(0.01, MismatchSeverity::Warn)
        .interpret(&body)
        .unwrap();
    assert_eq!(result.total_time_sec, 60.0);
    assert!(matches!(
        result.check_total(0.01),
        TotalCheck::Mismatch { .. }
    ));

    let err = ResultInterpreter::new(0.01, MismatchSeverity::Error)
        .interpret(&body)
        .unwrap_err();
    assert!(matches!(err, SchemaError::TotalMismatch { reported, .. } if reported == 60.0));
}

#[test]
fn test_bad_segment_yields_no_result() {
    let mut response = bracket_response();
    response["toolpath"][2]["points"] = json!([[4.0, 1.0]]);
    let body = serde_json::to_vec(&response).unwrap();

    assert!(matches!(
        interpret(&body),
        Err(SchemaError::WrongLength { expected: 2, found: 1, .. })
    ));
}

fn segment_strategy() -> impl Strategy<Value = Segment> {
    (
        prop::bool::ANY,
        -1000.0f64..1000.0,
        -1000.0f64..1000.0,
        -1000.0f64..1000.0,
        -1000.0f64..1000.0,
    )
        .prop_map(|(cut, x1, y1, x2, y2)| {
            let kind = if cut { SegmentKind::Cut } else { SegmentKind::Travel };
            Segment::new(kind, Point::new(x1, y1), Point::new(x2, y2))
        })
}

proptest! {
    #[test]
    fn prop_render_preserves_order_and_flips(
        segments in prop::collection::vec(segment_strategy(), 0..50),
        height in 1.0f64..2000.0,
    ) {
        let drawn = render(&segments, 500.0, height);
        prop_assert_eq!(drawn.len(), segments.len());

        for (segment, instruction) in segments.iter().zip(&drawn) {
            prop_assert_eq!(instruction.kind, segment.kind);
            prop_assert_eq!(instruction.from.x, segment.start().x);
            prop_assert_eq!(instruction.from.y, height - segment.start().y);
            prop_assert_eq!(instruction.to.x, segment.end().x);
            prop_assert_eq!(instruction.to.y, height - segment.end().y);
        }
    }
}
