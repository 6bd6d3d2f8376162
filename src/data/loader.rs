use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Date32Type, Float64Type, Int64Type, TimeUnit, TimestampMicrosecondType,
};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table from a file on disk.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header row first
/// * `.csv`     – header row, types inferred per cell
/// * `.parquet` – flat columns of scalars
pub fn load_file(path: &Path) -> Result<Table> {
    match extension(path).as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
            let mut workbook = open_workbook_auto(path)
                .map_err(|e| anyhow!("opening spreadsheet {}: {e}", path.display()))?;
            first_sheet_table(&mut workbook)
        }
        "csv" => {
            let reader = csv::Reader::from_path(path).context("opening CSV")?;
            load_csv(reader)
        }
        "parquet" | "pq" => {
            let file = std::fs::File::open(path).context("opening parquet file")?;
            load_parquet(file)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load a table from an in-memory upload. `file_name` only selects the format.
pub fn load_bytes(file_name: &str, bytes: Vec<u8>) -> Result<Table> {
    match extension(Path::new(file_name)).as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
            let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
                .map_err(|e| anyhow!("opening spreadsheet {file_name}: {e}"))?;
            first_sheet_table(&mut workbook)
        }
        "csv" => load_csv(csv::Reader::from_reader(Cursor::new(bytes))),
        "parquet" | "pq" => load_parquet(Bytes::from(bytes)),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn first_sheet_table<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Table> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook contains no worksheets")?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| anyhow!("reading worksheet '{sheet_name}': {e}"))?;
    log::debug!("Reading worksheet '{sheet_name}' ({:?})", range.get_size());
    range_to_table(&range)
}

/// First non-empty row is the header; fully empty rows are skipped.
fn range_to_table(range: &Range<Data>) -> Result<Table> {
    let mut rows = range
        .rows()
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)));

    let header_row = rows.next().context("worksheet has no header row")?;
    let headers = normalize_headers(header_row.iter().map(header_text));

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col_idx, slot) in values.iter_mut().enumerate() {
            let value = row.get(col_idx).map(cell_to_value).unwrap_or(CellValue::Null);
            slot.push(value);
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, vals)| Column::new(name, vals))
        .collect();
    Ok(Table::new(columns)?)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Float(f) => CellValue::Float(*f),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Float(dt.as_f64())),
        Data::DateTimeIso(s) => parse_date(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::String(s.clone())),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

/// Blank headers become `Unnamed: <idx>`; repeats get `.1`, `.2`, … suffixes.
fn normalize_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for (idx, name) in raw.enumerate() {
        let base = match name.trim() {
            "" => format!("Unnamed: {idx}"),
            trimmed => trimmed.to_string(),
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
pub fn load_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Table> {
    let headers = normalize_headers(
        reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(str::to_string),
    );

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, slot) in values.iter_mut().enumerate() {
            slot.push(guess_cell_type(record.get(col_idx).unwrap_or("")));
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, vals)| Column::new(name, vals))
        .collect();
    Ok(Table::new(columns)?)
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    if let Some(d) = parse_date(s) {
        return CellValue::Date(d);
    }
    CellValue::String(s.to_string())
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file: every column becomes one table column.
///
/// Integer, float, boolean, string, date and timestamp columns are mapped
/// onto [`CellValue`]; anything else is rendered as text.
fn load_parquet<T>(source: T) -> Result<Table>
where
    T: parquet::file::reader::ChunkReader + 'static,
{
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(source).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
    for batch_result in reader {
        let batch: RecordBatch = batch_result.context("reading parquet record batch")?;
        for (col_idx, slot) in values.iter_mut().enumerate() {
            let column = batch.column(col_idx);
            slot.extend(arrow_column_values(column.as_ref())?);
        }
    }

    let columns = normalize_headers(names.into_iter())
        .into_iter()
        .zip(values)
        .map(|(name, vals)| Column::new(name, vals))
        .collect();
    Ok(Table::new(columns)?)
}

fn arrow_column_values(col: &dyn Array) -> Result<Vec<CellValue>> {
    let len = col.len();
    let values = match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let casted = cast(col, &DataType::Int64).context("casting integer column")?;
            let arr = casted.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| {
                    if arr.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Integer(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::UInt64 | DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let casted = cast(col, &DataType::Float64).context("casting float column")?;
            let arr = casted.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| {
                    if arr.is_null(i) || arr.value(i).is_nan() {
                        CellValue::Null
                    } else {
                        CellValue::Float(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::Boolean => {
            let arr = col.as_boolean();
            (0..len)
                .map(|i| {
                    if arr.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Bool(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::Date32 | DataType::Date64 => {
            let casted = cast(col, &DataType::Date32).context("casting date column")?;
            let arr = casted.as_primitive::<Date32Type>();
            (0..len)
                .map(|i| {
                    if arr.is_null(i) {
                        return CellValue::Null;
                    }
                    arr.value_as_date(i)
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(CellValue::Date)
                        .unwrap_or(CellValue::Null)
                })
                .collect()
        }
        DataType::Timestamp(_, _) => {
            let target = DataType::Timestamp(TimeUnit::Microsecond, None);
            let casted = cast(col, &target).context("casting timestamp column")?;
            let arr = casted.as_primitive::<TimestampMicrosecondType>();
            (0..len)
                .map(|i| {
                    if arr.is_null(i) {
                        return CellValue::Null;
                    }
                    arr.value_as_datetime(i)
                        .map(CellValue::Date)
                        .unwrap_or(CellValue::Null)
                })
                .collect()
        }
        _ => {
            let casted = cast(col, &DataType::Utf8)
                .with_context(|| format!("unsupported parquet column type {:?}", col.data_type()))?;
            let arr = casted.as_string::<i32>();
            (0..len)
                .map(|i| {
                    if arr.is_null(i) || arr.value(i).is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::String(arr.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    use super::*;

    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        for (c, h) in ["Date", "Platform", "Cost", "Cost", ""].iter().enumerate() {
            sheet.write_string(0, c as u16, *h).unwrap();
        }
        let rows = [(1, "Google", Some(10.0)), (2, "Meta", None), (3, "Google", Some(30.5))];
        for (i, (day, platform, cost)) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            let date = ExcelDateTime::from_ymd(2024, 1, *day).unwrap();
            sheet
                .write_datetime_with_format(r, 0, &date, &date_format)
                .unwrap();
            sheet.write_string(r, 1, *platform).unwrap();
            if let Some(cost) = cost {
                sheet.write_number(r, 2, *cost).unwrap();
            }
            sheet.write_number(r, 3, 1.0).unwrap();
            sheet.write_string(r, 4, "x").unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_load_xlsx_bytes() {
        let table = load_bytes("report.xlsx", sample_workbook()).unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.column_names(),
            vec!["Date", "Platform", "Cost", "Cost.1", "Unnamed: 4"]
        );
        assert_eq!(table.numeric_columns(), vec!["Cost", "Cost.1"]);

        let cost = table.column("Cost").unwrap();
        assert_eq!(
            cost.values,
            vec![CellValue::Float(10.0), CellValue::Null, CellValue::Float(30.5)]
        );

        let date = &table.column("Date").unwrap().values[0];
        assert_eq!(date.to_string(), "2024-01-01");
    }

    #[test]
    fn test_corrupt_spreadsheet_is_an_error() {
        let err = load_bytes("report.xlsx", b"definitely not a zip".to_vec()).unwrap_err();
        assert!(format!("{err:#}").contains("opening spreadsheet"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_bytes("report.txt", Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file extension: .txt");
    }

    #[test]
    fn test_load_csv_infers_types() {
        let data = "Campaign,Clicks,Cost,Date,Active\n\
                    Search,850,420.5,2024-01-02,true\n\
                    Social,,680.25,2024-01-03,false\n";
        let table = load_csv(csv::Reader::from_reader(data.as_bytes())).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.numeric_columns(), vec!["Clicks", "Cost"]);
        let clicks = &table.column("Clicks").unwrap().values;
        assert_eq!(clicks, &vec![CellValue::Integer(850), CellValue::Null]);
        assert!(matches!(
            table.column("Date").unwrap().values[0],
            CellValue::Date(_)
        ));
        assert_eq!(table.column("Active").unwrap().values[1], CellValue::Bool(false));
    }

    #[test]
    fn test_load_parquet_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Platform", DataType::Utf8, true),
            Field::new("Clicks", DataType::Int32, true),
            Field::new("Cost", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Google"), None])),
                Arc::new(Int32Array::from(vec![Some(5), Some(7)])),
                Arc::new(Float64Array::from(vec![Some(1.25), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.numeric_columns(), vec!["Clicks", "Cost"]);
        assert_eq!(
            table.column("Platform").unwrap().values,
            vec![CellValue::String("Google".into()), CellValue::Null]
        );
        assert_eq!(
            table.column("Clicks").unwrap().values,
            vec![CellValue::Integer(5), CellValue::Integer(7)]
        );
    }
}
