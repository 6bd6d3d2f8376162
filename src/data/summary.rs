use thiserror::Error;

use super::model::Table;

/// Number of equal-width bins in the metric histogram.
pub const HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SummaryError {
    #[error("column '{0}' does not exist")]
    UnknownColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
    /// Every value in the column is missing; statistics are undefined.
    #[error("column '{0}' has no values")]
    NoValues(String),
}

/// Aggregates over the non-missing values of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub max: f64,
}

/// Equal-width frequency counts; `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// `(bin centre, count)` pairs for charting.
    pub fn bars(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| ((w[0] + w[1]) / 2.0, c))
    }
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

fn metric_values(table: &Table, column: &str) -> Result<Vec<f64>, SummaryError> {
    let col = table
        .column(column)
        .ok_or_else(|| SummaryError::UnknownColumn(column.to_string()))?;
    if !col.is_numeric() {
        return Err(SummaryError::NotNumeric(column.to_string()));
    }
    let values: Vec<f64> = col.numbers().collect();
    if values.is_empty() {
        return Err(SummaryError::NoValues(column.to_string()));
    }
    Ok(values)
}

/// Total, mean and max of the non-missing values of `column`.
pub fn summarize(table: &Table, column: &str) -> Result<Summary, SummaryError> {
    let values = metric_values(table, column)?;
    let total: f64 = values.iter().sum();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(Summary {
        count: values.len(),
        total,
        mean: total / values.len() as f64,
        max,
    })
}

/// 20 equal-width bins over the observed range of `column`.
pub fn histogram(table: &Table, column: &str) -> Result<Histogram, SummaryError> {
    let values = metric_values(table, column)?;
    Ok(histogram_of(&values, HISTOGRAM_BINS))
}

fn histogram_of(values: &[f64], bins: usize) -> Histogram {
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        // The last bin is closed on the right.
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Histogram { edges, counts }
}

/// Descriptive statistics for `column`, or `None` when it has no values.
pub fn describe(table: &Table, column: &str) -> Option<Describe> {
    let mut values = metric_values(table, column).ok()?;
    values.sort_by(f64::total_cmp);

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    });

    Some(Describe {
        count: n,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[n - 1],
    })
}

/// Linear-interpolated quantile of sorted, non-empty values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    let frac = pos - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}
