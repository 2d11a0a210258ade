//! Analysis result interpretation
//!
//! Converts the untyped JSON body returned by the analysis service into a
//! statically typed [`AnalysisResult`], or a [`SchemaError`] naming the first
//! offending field. Interpretation is all-or-nothing: nothing partially built
//! ever leaves this module.
//!
//! Numbers are surfaced exactly as the service sent them. The reported total is
//! not recomputed, but [`AnalysisResult::check_total`] lets callers compare it
//! with the sum of its components.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use timestudy_core::{
    MismatchSeverity, Positioning, SchemaError, Units, DEFAULT_TOTAL_TOLERANCE_SEC,
};

/// Kind of toolpath segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Beam on
    Cut,
    /// Beam off positioning
    Travel,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Travel => "travel",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "cut" => Some(Self::Cut),
            "travel" => Some(Self::Travel),
            _ => None,
        }
    }
}

/// A point in program units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.x, self.y].serialize(serializer)
    }
}

/// One straight toolpath segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub points: [Point; 2],
}

impl Segment {
    pub fn new(kind: SegmentKind, from: Point, to: Point) -> Self {
        Self {
            kind,
            points: [from, to],
        }
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[1]
    }
}

/// Modal state when the program finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinalModes {
    pub units: Units,
    pub positioning: Positioning,
}

/// Time-study metrics and toolpath for one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub cut_time_sec: f64,
    pub travel_time_sec: f64,
    pub pierce_time_sec: f64,
    pub dwell_time_sec: f64,
    pub lifter_time_sec: f64,
    pub total_time_sec: f64,
    pub pierce_count: u64,
    pub beam_cycles: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_modes: Option<FinalModes>,
    pub toolpath: Vec<Segment>,
}

/// Outcome of comparing the reported total with its components
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TotalCheck {
    Consistent {
        sum: f64,
    },
    Mismatch {
        reported: f64,
        computed: f64,
        difference: f64,
    },
}

impl TotalCheck {
    pub fn is_consistent(&self) -> bool {
        matches!(self, Self::Consistent { .. })
    }
}

impl AnalysisResult {
    /// Sum of cut, travel, pierce, dwell and lifter time
    pub fn component_sum(&self) -> f64 {
        self.cut_time_sec
            + self.travel_time_sec
            + self.pierce_time_sec
            + self.dwell_time_sec
            + self.lifter_time_sec
    }

    /// Compare `total_time_sec` with [`component_sum`](Self::component_sum)
    pub fn check_total(&self, tolerance: f64) -> TotalCheck {
        let computed = self.component_sum();
        let difference = (self.total_time_sec - computed).abs();
        if difference <= tolerance {
            TotalCheck::Consistent { sum: computed }
        } else {
            TotalCheck::Mismatch {
                reported: self.total_time_sec,
                computed,
                difference,
            }
        }
    }

    pub fn cut_segments(&self) -> usize {
        self.toolpath
            .iter()
            .filter(|s| s.kind == SegmentKind::Cut)
            .count()
    }

    pub fn travel_segments(&self) -> usize {
        self.toolpath.len() - self.cut_segments()
    }
}

/// Validates response bodies and applies the total-mismatch policy
#[derive(Debug, Clone, Copy)]
pub struct ResultInterpreter {
    tolerance: f64,
    severity: MismatchSeverity,
}

impl Default for ResultInterpreter {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_TOLERANCE_SEC, MismatchSeverity::default())
    }
}

impl ResultInterpreter {
    pub fn new(tolerance: f64, severity: MismatchSeverity) -> Self {
        Self {
            tolerance,
            severity,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Interpret a response body
    ///
    /// Schema violations always fail. A total mismatch is logged as a warning
    /// or rejected, depending on the configured severity.
    pub fn interpret(&self, raw_body: &[u8]) -> Result<AnalysisResult, SchemaError> {
        let result = interpret(raw_body)?;

        if let TotalCheck::Mismatch {
            reported,
            computed,
            difference,
        } = result.check_total(self.tolerance)
        {
            match self.severity {
                MismatchSeverity::Warn => {
                    tracing::warn!(
                        "Reported total {}s differs from component sum {}s by {}s",
                        reported,
                        computed,
                        difference
                    );
                }
                MismatchSeverity::Error => {
                    return Err(SchemaError::TotalMismatch { reported, computed });
                }
            }
        }

        Ok(result)
    }
}

/// Strictly parse a response body into an [`AnalysisResult`]
pub fn interpret(raw_body: &[u8]) -> Result<AnalysisResult, SchemaError> {
    let value: Value = serde_json::from_slice(raw_body).map_err(|e| SchemaError::Malformed {
        reason: e.to_string(),
    })?;

    let obj = match &value {
        Value::Object(obj) => obj,
        other => {
            return Err(SchemaError::NotAnObject {
                found: json_type(other),
            })
        }
    };

    let result = AnalysisResult {
        filename: string_field(obj, "filename")?,
        cut_time_sec: metric(obj, "cut_time_sec")?,
        travel_time_sec: metric(obj, "travel_time_sec")?,
        pierce_time_sec: metric(obj, "pierce_time_sec")?,
        dwell_time_sec: metric(obj, "dwell_time_sec")?,
        lifter_time_sec: metric(obj, "lifter_time_sec")?,
        total_time_sec: metric(obj, "total_time_sec")?,
        pierce_count: counter(obj, "pierce_count")?,
        beam_cycles: counter(obj, "beam_cycles")?,
        final_modes: final_modes(obj)?,
        toolpath: toolpath(obj)?,
    };

    tracing::debug!(
        "Interpreted result for {}: {} segments, total {}s",
        result.filename,
        result.toolpath.len(),
        result.total_time_sec
    );

    Ok(result)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(field: impl Into<String>, expected: &'static str, found: &Value) -> SchemaError {
    let found = match found {
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string \"{}\"", s),
        other => json_type(other).to_string(),
    };
    SchemaError::WrongType {
        field: field.into(),
        expected,
        found,
    }
}

fn require<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, SchemaError> {
    obj.get(field).ok_or_else(|| SchemaError::MissingField {
        field: field.to_string(),
    })
}

fn string_field(obj: &Map<String, Value>, field: &str) -> Result<String, SchemaError> {
    match require(obj, field)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(wrong_type(field, "a string", other)),
    }
}

fn metric(obj: &Map<String, Value>, field: &str) -> Result<f64, SchemaError> {
    let value = require(obj, field)?;
    match value.as_f64() {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(wrong_type(field, "a non-negative number", value)),
    }
}

fn counter(obj: &Map<String, Value>, field: &str) -> Result<u64, SchemaError> {
    let value = require(obj, field)?;
    value
        .as_u64()
        .ok_or_else(|| wrong_type(field, "a non-negative integer", value))
}

fn enum_field<T>(
    obj: &Map<String, Value>,
    parent: &str,
    field: &str,
) -> Result<T, SchemaError>
where
    T: std::str::FromStr,
{
    let path = format!("{}.{}", parent, field);
    match obj.get(field) {
        None => Err(SchemaError::MissingField { field: path }),
        Some(Value::String(s)) => s.parse::<T>().map_err(|_| SchemaError::UnknownVariant {
            field: path,
            value: s.clone(),
        }),
        Some(other) => Err(wrong_type(path, "a string", other)),
    }
}

fn final_modes(obj: &Map<String, Value>) -> Result<Option<FinalModes>, SchemaError> {
    match obj.get("final_modes") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(modes)) => Ok(Some(FinalModes {
            units: enum_field(modes, "final_modes", "units")?,
            positioning: enum_field(modes, "final_modes", "positioning")?,
        })),
        Some(other) => Err(wrong_type("final_modes", "an object", other)),
    }
}

fn toolpath(obj: &Map<String, Value>) -> Result<Vec<Segment>, SchemaError> {
    let segments = match require(obj, "toolpath")? {
        Value::Array(items) => items,
        other => return Err(wrong_type("toolpath", "an array", other)),
    };

    segments
        .iter()
        .enumerate()
        .map(|(index, item)| segment(index, item))
        .collect()
}

fn segment(index: usize, item: &Value) -> Result<Segment, SchemaError> {
    let path = format!("toolpath[{}]", index);
    let obj = match item {
        Value::Object(obj) => obj,
        other => return Err(wrong_type(path, "an object", other)),
    };

    let kind_path = format!("{}.type", path);
    let kind = match obj.get("type") {
        None => return Err(SchemaError::MissingField { field: kind_path }),
        Some(Value::String(s)) => {
            SegmentKind::from_wire(s).ok_or_else(|| SchemaError::UnknownVariant {
                field: kind_path,
                value: s.clone(),
            })?
        }
        Some(other) => return Err(wrong_type(kind_path, "a string", other)),
    };

    let points_path = format!("{}.points", path);
    let points = match obj.get("points") {
        None => return Err(SchemaError::MissingField { field: points_path }),
        Some(Value::Array(points)) => points,
        Some(other) => return Err(wrong_type(points_path, "an array", other)),
    };

    if points.len() != 2 {
        return Err(SchemaError::WrongLength {
            field: points_path,
            expected: 2,
            found: points.len(),
        });
    }

    let from = point(&format!("{}[0]", points_path), &points[0])?;
    let to = point(&format!("{}[1]", points_path), &points[1])?;

    Ok(Segment::new(kind, from, to))
}

fn point(path: &str, value: &Value) -> Result<Point, SchemaError> {
    let coords = match value {
        Value::Array(coords) => coords,
        other => return Err(wrong_type(path, "an [x, y] array", other)),
    };

    if coords.len() != 2 {
        return Err(SchemaError::WrongLength {
            field: path.to_string(),
            expected: 2,
            found: coords.len(),
        });
    }

    let coord = |i: usize| -> Result<f64, SchemaError> {
        coords[i]
            .as_f64()
            .ok_or_else(|| wrong_type(format!("{}[{}]", path, i), "a number", &coords[i]))
    };

    Ok(Point::new(coord(0)?, coord(1)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "filename": "bracket.nc",
            "cut_time_sec": 10.0,
            "travel_time_sec": 5.0,
            "pierce_time_sec": 2.0,
            "dwell_time_sec": 1.0,
            "lifter_time_sec": 0.5,
            "total_time_sec": 18.5,
            "pierce_count": 2,
            "beam_cycles": 4,
            "toolpath": [
                {"type": "travel", "points": [[0.0, 0.0], [5.0, 5.0]]},
                {"type": "cut", "points": [[5.0, 5.0], [10.0, 5.0]]}
            ],
            "final_modes": {"units": "metric", "positioning": "absolute"}
        })
    }

    fn body(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn test_interpret_valid_body() {
        let result = interpret(&body(&sample())).unwrap();
        assert_eq!(result.filename, "bracket.nc");
        assert_eq!(result.pierce_count, 2);
        assert_eq!(result.beam_cycles, 4);
        assert_eq!(result.toolpath.len(), 2);
        assert_eq!(result.toolpath[1].kind, SegmentKind::Cut);
        assert_eq!(result.toolpath[1].end(), Point::new(10.0, 5.0));
        assert_eq!(
            result.final_modes,
            Some(FinalModes {
                units: Units::Metric,
                positioning: Positioning::Absolute,
            })
        );
    }

    #[test]
    fn test_final_modes_optional() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("final_modes");
        assert_eq!(interpret(&body(&value)).unwrap().final_modes, None);

        value["final_modes"] = Value::Null;
        assert_eq!(interpret(&body(&value)).unwrap().final_modes, None);
    }

    #[test]
    fn test_malformed_final_modes_rejected() {
        let mut value = sample();
        value["final_modes"] = json!({"units": "furlong", "positioning": "absolute"});
        assert_eq!(
            interpret(&body(&value)),
            Err(SchemaError::UnknownVariant {
                field: "final_modes.units".to_string(),
                value: "furlong".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_total_rejected() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("total_time_sec");
        assert_eq!(
            interpret(&body(&value)),
            Err(SchemaError::MissingField {
                field: "total_time_sec".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_segment_type_rejected() {
        let mut value = sample();
        value["toolpath"][1]["type"] = json!("laser");
        assert_eq!(
            interpret(&body(&value)),
            Err(SchemaError::UnknownVariant {
                field: "toolpath[1].type".to_string(),
                value: "laser".to_string(),
            })
        );
    }

    #[test]
    fn test_wrong_primitive_types_rejected() {
        let mut value = sample();
        value["cut_time_sec"] = json!("10");
        assert!(matches!(
            interpret(&body(&value)),
            Err(SchemaError::WrongType { ref field, .. }) if field == "cut_time_sec"
        ));

        let mut value = sample();
        value["pierce_count"] = json!(2.5);
        assert!(matches!(
            interpret(&body(&value)),
            Err(SchemaError::WrongType { ref field, .. }) if field == "pierce_count"
        ));

        let mut value = sample();
        value["toolpath"] = json!({});
        assert!(matches!(
            interpret(&body(&value)),
            Err(SchemaError::WrongType { ref field, .. }) if field == "toolpath"
        ));
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut value = sample();
        value["dwell_time_sec"] = json!(-1.0);
        assert!(interpret(&body(&value)).is_err());

        let mut value = sample();
        value["beam_cycles"] = json!(-1);
        assert!(interpret(&body(&value)).is_err());
    }

    #[test]
    fn test_point_arity_enforced() {
        let mut value = sample();
        value["toolpath"][0]["points"] = json!([[0.0, 0.0]]);
        assert_eq!(
            interpret(&body(&value)),
            Err(SchemaError::WrongLength {
                field: "toolpath[0].points".to_string(),
                expected: 2,
                found: 1,
            })
        );

        let mut value = sample();
        value["toolpath"][0]["points"] = json!([[0.0, 0.0, 1.0], [1.0, 1.0]]);
        assert_eq!(
            interpret(&body(&value)),
            Err(SchemaError::WrongLength {
                field: "toolpath[0].points[0]".to_string(),
                expected: 2,
                found: 3,
            })
        );

        let mut value = sample();
        value["toolpath"][0]["points"] = json!([[0.0, "a"], [1.0, 1.0]]);
        assert!(matches!(
            interpret(&body(&value)),
            Err(SchemaError::WrongType { ref field, .. }) if field == "toolpath[0].points[0][1]"
        ));
    }

    #[test]
    fn test_non_json_and_non_object_rejected() {
        assert!(matches!(
            interpret(b"<html>Bad Gateway</html>"),
            Err(SchemaError::Malformed { .. })
        ));
        assert_eq!(
            interpret(b"[1, 2]"),
            Err(SchemaError::NotAnObject { found: "array" })
        );
    }

    #[test]
    fn test_empty_toolpath_is_valid() {
        let mut value = sample();
        value["toolpath"] = json!([]);
        let result = interpret(&body(&value)).unwrap();
        assert!(result.toolpath.is_empty());
        assert_eq!(result.cut_segments(), 0);
    }

    #[test]
    fn test_integer_metrics_accepted() {
        let mut value = sample();
        value["cut_time_sec"] = json!(10);
        assert_eq!(interpret(&body(&value)).unwrap().cut_time_sec, 10.0);
    }

    #[test]
    fn test_component_sum_and_check() {
        let result = interpret(&body(&sample())).unwrap();
        assert_eq!(result.component_sum(), 18.5);
        assert!(result.check_total(DEFAULT_TOTAL_TOLERANCE_SEC).is_consistent());

        let mut value = sample();
        value["total_time_sec"] = json!(20.0);
        let result = interpret(&body(&value)).unwrap();
        assert_eq!(
            result.check_total(DEFAULT_TOTAL_TOLERANCE_SEC),
            TotalCheck::Mismatch {
                reported: 20.0,
                computed: 18.5,
                difference: 1.5,
            }
        );
    }

    #[test]
    fn test_interpreter_severity() {
        let mut value = sample();
        value["total_time_sec"] = json!(20.0);
        let raw = body(&value);

        let lenient = ResultInterpreter::new(0.01, MismatchSeverity::Warn);
        assert_eq!(lenient.interpret(&raw).unwrap().total_time_sec, 20.0);

        let strict = ResultInterpreter::new(0.01, MismatchSeverity::Error);
        assert_eq!(
            strict.interpret(&raw),
            Err(SchemaError::TotalMismatch {
                reported: 20.0,
                computed: 18.5,
            })
        );
    }
}
