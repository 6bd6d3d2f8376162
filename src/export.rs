use std::path::Path;

use anyhow::{Context, Result};

use crate::data::model::Table;
use crate::report::{compose, pptx::write_pptx};

pub const CSV_FILE_NAME: &str = "processed_paid_media_data.csv";

/// Serialize the table as CSV: header row, then one record per row.
/// Missing cells become empty fields.
pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;
    for r in 0..table.row_count() {
        writer
            .write_record(table.row(r).iter().map(|v| v.to_string()))
            .with_context(|| format!("writing CSV row {r}"))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))
}

pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let bytes = to_csv(table)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} rows to {}", table.row_count(), path.display());
    Ok(())
}

/// `paid_media_report_<metric>.pptx`, keeping only `[A-Za-z0-9_-]`.
pub fn report_file_name(metric: &str) -> String {
    let safe: String = metric
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("paid_media_report_{safe}.pptx")
}

/// Compose and serialize the slide deck for `metric`.
pub fn report_bytes(table: &Table, metric: &str) -> Result<Vec<u8>> {
    let report = compose(table, metric);
    write_pptx(&report).with_context(|| format!("building report for {metric}"))
}

pub fn write_report(table: &Table, metric: &str, path: &Path) -> Result<()> {
    let bytes = report_bytes(table, metric)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {metric} report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::loader::{load_csv, load_file};
    use crate::data::model::{CellValue, Column};

    fn table() -> Table {
        let day = |d| {
            CellValue::Date(
                NaiveDate::from_ymd_opt(2024, 3, d)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .unwrap(),
            )
        };
        Table::new(vec![
            Column::new("Date", vec![day(1), day(2), day(3)]),
            Column::new(
                "Campaign",
                vec![
                    CellValue::String("Spring, promo".into()),
                    CellValue::Null,
                    CellValue::String("Brand \"A\"".into()),
                ],
            ),
            Column::new(
                "Cost",
                vec![CellValue::Float(12.5), CellValue::Null, CellValue::Float(0.1)],
            ),
            Column::new(
                "Clicks",
                vec![CellValue::Integer(3), CellValue::Integer(0), CellValue::Integer(-7)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_csv_round_trip_preserves_shape_and_values() {
        let original = table();
        let bytes = to_csv(&original).unwrap();
        let reloaded = load_csv(csv::Reader::from_reader(bytes.as_slice())).unwrap();

        assert_eq!(reloaded.row_count(), original.row_count());
        assert_eq!(reloaded.column_names(), original.column_names());
        for (a, b) in original.columns().iter().zip(reloaded.columns()) {
            assert_eq!(a.values, b.values, "column {}", a.name);
        }
    }

    #[test]
    fn test_missing_values_are_empty_fields() {
        let text = String::from_utf8(to_csv(&table()).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Campaign,Cost,Clicks");
        assert_eq!(lines[2], "2024-03-02,,,0");
    }

    #[test]
    fn test_write_csv_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CSV_FILE_NAME);
        write_csv(&table(), &path).unwrap();
        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.row_count(), 3);
        assert_eq!(reloaded.column_count(), 4);
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name("Cost"), "paid_media_report_Cost.pptx");
        assert_eq!(
            report_file_name("Cost / Conv (€)"),
            "paid_media_report_Cost___Conv____.pptx"
        );
        assert_eq!(report_file_name("cpc-2_b"), "paid_media_report_cpc-2_b.pptx");
    }

    #[test]
    fn test_report_bytes_is_zip() {
        let bytes = report_bytes(&table(), "Cost").unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
