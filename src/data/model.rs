use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the uploaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a spreadsheet yields.
/// Groups are keyed by `CellValue`, so it must be `Ord` and `Hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDateTime),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in sets and maps --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
                Date(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            // Mixed Integer/Float compare numerically; ties fall back to the
            // variant so that Ord stays consistent with PartialEq.
            (a, b) => {
                let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                x.total_cmp(&y)
                    .then_with(|| matches!(a, Float(_)).cmp(&matches!(b, Float(_))))
            }
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => {
                if d.num_seconds_from_midnight() == 0 {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`; only numeric cells qualify.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

/// One named column of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Numeric when every non-missing value is a number. An all-missing
    /// column counts as numeric, like an all-NaN float column would.
    pub fn is_numeric(&self) -> bool {
        self.values.iter().all(|v| v.is_null() || v.is_numeric())
    }

    /// Non-missing numeric values in row order.
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(CellValue::as_f64)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{name}' has {found} values but the table has {expected} rows")]
    RaggedColumn {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// The loaded spreadsheet: ordered columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    rows: usize,
}

impl Table {
    /// Build a table, rejecting ragged columns and repeated names.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map_or(0, |c| c.values.len());
        let mut index = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if col.values.len() != rows {
                return Err(TableError::RaggedColumn {
                    name: col.name.clone(),
                    expected: rows,
                    found: col.values.len(),
                });
            }
            if index.insert(col.name.clone(), i).is_some() {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    /// Names of the columns whose values are all numeric (or missing).
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn is_numeric_column(&self, name: &str) -> bool {
        self.column(name).is_some_and(Column::is_numeric)
    }

    /// One row as a vector of cell references, in column order.
    pub fn row(&self, row: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[row]).collect()
    }

    /// The first `n` rows (or fewer).
    pub fn head(&self, n: usize) -> Vec<Vec<&CellValue>> {
        (0..n.min(self.rows)).map(|r| self.row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().map(|&v| CellValue::Integer(v)).collect()
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Table::new(vec![
            Column::new("a", ints(&[1, 2, 3])),
            Column::new("b", ints(&[1, 2])),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::RaggedColumn {
                name: "b".into(),
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Table::new(vec![
            Column::new("a", ints(&[1])),
            Column::new("a", ints(&[2])),
        ])
        .unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("a".into()));
    }

    #[test]
    fn test_numeric_subset() {
        let table = Table::new(vec![
            Column::new(
                "Campaign",
                vec![CellValue::String("A".into()), CellValue::String("B".into())],
            ),
            Column::new("Clicks", vec![CellValue::Integer(3), CellValue::Null]),
            Column::new("Cost", vec![CellValue::Float(1.5), CellValue::Integer(2)]),
            Column::new("Empty", vec![CellValue::Null, CellValue::Null]),
            Column::new(
                "Mixed",
                vec![CellValue::Integer(1), CellValue::String("x".into())],
            ),
        ])
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 5);
        assert_eq!(table.numeric_columns(), vec!["Clicks", "Cost", "Empty"]);
        assert!(!table.is_numeric_column("Mixed"));
        assert!(!table.is_numeric_column("Missing"));
    }

    #[test]
    fn test_mixed_numeric_ordering() {
        assert!(CellValue::Integer(2) > CellValue::Float(1.5));
        assert!(CellValue::Float(2.5) > CellValue::Integer(2));
        assert!(CellValue::Null < CellValue::Integer(-10));
        assert_ne!(
            CellValue::Integer(1).cmp(&CellValue::Float(1.0)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn test_date_display_drops_midnight() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::Date(d).to_string(), "2024-03-01");
        let t = d.date().and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(CellValue::Date(t).to_string(), "2024-03-01 09:30:00");
    }
}
