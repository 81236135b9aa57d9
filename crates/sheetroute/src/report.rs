use chrono::NaiveDateTime;
use sheetroute_common::Key;
use sheetroute_pipeline::PivotEntry;
use std::fmt::Write as _;
use std::path::PathBuf;

/// `sheetroute-<stage>-<YYYYMMDD-HHMMSS>.xlsx`
pub fn default_output_name(stage: &str, at: NaiveDateTime) -> PathBuf {
    PathBuf::from(format!(
        "sheetroute-{stage}-{}.xlsx",
        at.format("%Y%m%d-%H%M%S")
    ))
}

/// Two aligned columns, one owner per line, under an `owner_header` heading.
pub fn render_pivot(entries: &[PivotEntry], owner_header: &str) -> String {
    let name_width = entries
        .iter()
        .map(|e| e.name.chars().count())
        .chain(std::iter::once(owner_header.chars().count()))
        .max()
        .unwrap_or(0);
    let count_width = entries
        .iter()
        .map(|e| e.count.to_string().len())
        .chain(std::iter::once("Count".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{owner_header:<name_width$}  {:>count_width$}", "Count");
    for e in entries {
        let _ = writeln!(out, "{:<name_width$}  {:>count_width$}", e.name, e.count);
    }
    out
}

/// Integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    match Key::new(value).to_cell() {
        sheetroute_common::CellValue::Int(i) => i.to_string(),
        _ => value.to_string(),
    }
}

/// JSON array of numbers; integral values are emitted as integers.
pub fn numbers_json(values: &[f64]) -> serde_json::Value {
    values
        .iter()
        .map(|v| match Key::new(*v).to_cell() {
            sheetroute_common::CellValue::Int(i) => serde_json::Value::from(i),
            _ => serde_json::Value::from(*v),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn output_name_carries_stage_and_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        assert_eq!(
            default_output_name("assigned", at),
            PathBuf::from("sheetroute-assigned-20240309-070501.xlsx")
        );
    }

    #[test]
    fn pivot_columns_align() {
        let entries = vec![
            PivotEntry {
                name: "Alice".into(),
                count: 12,
            },
            PivotEntry {
                name: "UNASSIGNED_CN".into(),
                count: 3,
            },
        ];
        let text = render_pivot(&entries, "Assignee");
        assert_eq!(
            text,
            "Assignee       Count\nAlice             12\nUNASSIGNED_CN      3\n"
        );
    }

    #[test]
    fn numbers_drop_integral_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(numbers_json(&[1.0, 2.5]).to_string(), "[1,2.5]");
    }
}
