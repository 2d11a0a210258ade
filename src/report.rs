//! Plain-text reports for the command line

use std::fmt::Write;

use timestudy_core::format_duration;
use timestudy_settings::{ConfigField, FieldValue};
use timestudy_visualizer::{AnalysisResult, TotalCheck};

/// Time breakdown, counters and final modes of one result
pub fn metrics_table(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Program: {}", result.filename);
    let _ = writeln!(out);

    let rows = [
        ("Cut", result.cut_time_sec),
        ("Travel", result.travel_time_sec),
        ("Pierce", result.pierce_time_sec),
        ("Dwell", result.dwell_time_sec),
        ("Lifter", result.lifter_time_sec),
    ];
    for (label, seconds) in rows {
        let _ = writeln!(out, "  {:<8} {:>12}", label, format_duration(seconds));
    }
    let _ = writeln!(out, "  {:<8} {:>12}", "", "------------");
    let _ = writeln!(
        out,
        "  {:<8} {:>12}",
        "Total",
        format_duration(result.total_time_sec)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "  Pierces      {}", result.pierce_count);
    let _ = writeln!(out, "  Beam cycles  {}", result.beam_cycles);
    let _ = writeln!(
        out,
        "  Segments     {} cut, {} travel",
        result.cut_segments(),
        result.travel_segments()
    );

    if let Some(modes) = &result.final_modes {
        let _ = writeln!(
            out,
            "  Final modes  {}, {}",
            modes.units, modes.positioning
        );
    }

    out
}

/// Warning line for a total that disagrees with its components
pub fn mismatch_line(check: &TotalCheck) -> Option<String> {
    match check {
        TotalCheck::Consistent { .. } => None,
        TotalCheck::Mismatch {
            reported,
            computed,
            difference,
        } => Some(format!(
            "warning: reported total {:.3}s differs from component sum {:.3}s by {:.3}s",
            reported, computed, difference
        )),
    }
}

/// One line per configuration field: name, current value, description
pub fn fields_table<'a>(fields: impl Iterator<Item = (ConfigField, &'a FieldValue)>) -> String {
    let mut out = String::new();
    for (field, value) in fields {
        let shown = match value {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Flag(b) => b.to_string(),
            FieldValue::Invalid { raw, .. } => format!("{} (invalid)", raw),
        };
        let _ = writeln!(
            out,
            "{:<20} {:<10} {}",
            field.name(),
            shown,
            field.description()
        );
    }
    out
}
