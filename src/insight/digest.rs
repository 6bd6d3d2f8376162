use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::data::group::{distinct_count, value_counts};
use crate::data::model::Table;
use crate::data::summary::describe;
use crate::report::{CAMPAIGN_COLUMN, PLATFORM_COLUMN};

/// Upper bound on the digest sent to the text-generation backend.
pub const MAX_DIGEST_CHARS: usize = 6000;
pub const DIGEST_HEAD_ROWS: usize = 5;
const TRUNCATION_MARK: &str = "\n[digest truncated]";

/// Bounded plain-text description of `table` for the prompt.
pub fn build_digest(table: &Table) -> Result<String> {
    let mut out = String::new();
    let numeric = table.numeric_columns();

    writeln!(out, "Rows: {}", table.row_count())?;
    writeln!(out, "Columns: {}", table.column_count())?;
    writeln!(out, "Column names: {}", table.column_names().join(", "))?;
    writeln!(out, "Numeric columns: {}", numeric.join(", "))?;

    let headers: Vec<String> = table.column_names().iter().map(|s| s.to_string()).collect();
    let rows: Vec<Vec<String>> = table
        .head(DIGEST_HEAD_ROWS)
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.to_string()).collect())
        .collect();
    writeln!(out, "\nFirst {} rows:", rows.len())?;
    writeln!(out, "{}", text_grid(&headers, &rows)?)?;

    if !numeric.is_empty() {
        writeln!(out, "\nDescriptive statistics:")?;
        writeln!(out, "{}", describe_grid(table, &numeric)?)?;
    }

    if let Some(counts) = value_counts(table, PLATFORM_COLUMN) {
        writeln!(out, "\nRows per platform:")?;
        for (platform, count) in counts {
            writeln!(out, "  {platform}: {count}")?;
        }
    }

    if let Some(campaigns) = distinct_count(table, CAMPAIGN_COLUMN) {
        writeln!(out, "\nDistinct campaigns: {campaigns}")?;
    }

    Ok(truncate(out, MAX_DIGEST_CHARS))
}

/// Render rows of text as an ASCII table.
fn text_grid(headers: &[String], rows: &[Vec<String>]) -> Result<String> {
    if headers.is_empty() {
        return Ok("(no columns)".to_string());
    }
    let fields: Vec<Field> = headers
        .iter()
        .map(|h| Field::new(h, DataType::Utf8, false))
        .collect();
    let columns: Vec<ArrayRef> = (0..headers.len())
        .map(|c| {
            let values = rows.iter().map(|r| r[c].as_str());
            Arc::new(StringArray::from_iter_values(values)) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("building digest grid")?;
    Ok(pretty_format_batches(&[batch])
        .context("formatting digest grid")?
        .to_string())
}

/// One row per statistic, one column per numeric column.
fn describe_grid(table: &Table, numeric: &[&str]) -> Result<String> {
    let stats = numeric.iter().map(|c| describe(table, c)).collect::<Vec<_>>();
    let fmt = |v: f64| format!("{v:.2}");
    let labels = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    let rows: Vec<Vec<String>> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mut row = vec![label.to_string()];
            for stat in &stats {
                let cell = match stat {
                    None if i == 0 => "0".to_string(),
                    None => "NaN".to_string(),
                    Some(d) => match i {
                        0 => d.count.to_string(),
                        1 => fmt(d.mean),
                        2 => d.std.map(fmt).unwrap_or_else(|| "NaN".to_string()),
                        3 => fmt(d.min),
                        4 => fmt(d.q25),
                        5 => fmt(d.median),
                        6 => fmt(d.q75),
                        _ => fmt(d.max),
                    },
                };
                row.push(cell);
            }
            row
        })
        .collect();

    let mut headers = vec!["statistic".to_string()];
    headers.extend(numeric.iter().map(|c| c.to_string()));
    text_grid(&headers, &rows)
}

fn truncate(mut text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let keep = max_chars.saturating_sub(TRUNCATION_MARK.chars().count());
    let cut = text
        .char_indices()
        .nth(keep)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text.truncate(cut);
    text.push_str(TRUNCATION_MARK);
    text
}
