use std::collections::{HashMap, HashSet};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Group-by helpers over a key column
// ---------------------------------------------------------------------------

/// Sum of the metric for one distinct key value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

/// Group rows by `by`, sum `metric` per group and sort descending.
///
/// * Rows with a missing key are dropped.
/// * Missing metric values contribute 0 to their group.
/// * Ties keep the order in which the groups were first encountered.
/// * Keys are compared by their displayed text, so `1` and `1.0` share a group.
///
/// Returns `None` when either column is absent.
pub fn group_sum(table: &Table, by: &str, metric: &str) -> Option<Vec<GroupTotal>> {
    let keys = table.column(by)?;
    let values = table.column(metric)?;

    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal> = Vec::new();
    for (key, value) in keys.values.iter().zip(&values.values) {
        if key.is_null() {
            continue;
        }
        let label = key.to_string();
        let slot = *slots.entry(label.clone()).or_insert_with(|| {
            groups.push(GroupTotal {
                key: label,
                total: 0.0,
            });
            groups.len() - 1
        });
        groups[slot].total += value.as_f64().unwrap_or(0.0);
    }

    // `sort_by` is stable, which gives the first-encountered tie-break.
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    Some(groups)
}

/// The first `n` groups of an already ordered list.
pub fn top_n(groups: &[GroupTotal], n: usize) -> &[GroupTotal] {
    &groups[..n.min(groups.len())]
}

/// Occurrences of each non-missing value, most frequent first.
pub fn value_counts(table: &Table, column: &str) -> Option<Vec<(String, usize)>> {
    let col = table.column(column)?;
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in col.values.iter().filter(|v| !v.is_null()) {
        let label = value.to_string();
        let slot = *slots.entry(label.clone()).or_insert_with(|| {
            counts.push((label, 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Some(counts)
}

/// Number of distinct non-missing values in `column`.
pub fn distinct_count(table: &Table, column: &str) -> Option<usize> {
    let col = table.column(column)?;
    let distinct: HashSet<String> = col
        .values
        .iter()
        .filter(|v| !v.is_null())
        .map(CellValue::to_string)
        .collect();
    Some(distinct.len())
}

/// Smallest and largest non-missing value of `column`.
pub fn value_range<'a>(table: &'a Table, column: &str) -> Option<(&'a CellValue, &'a CellValue)> {
    let col = table.column(column)?;
    let mut present = col.values.iter().filter(|v| !v.is_null());
    let first = present.next()?;
    Some(present.fold((first, first), |(lo, hi), v| {
        (std::cmp::min(lo, v), std::cmp::max(hi, v))
    }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::model::Column;

    fn text(values: &[&str]) -> Vec<CellValue> {
        values
            .iter()
            .map(|v| match *v {
                "" => CellValue::Null,
                s => CellValue::String(s.to_string()),
            })
            .collect()
    }

    fn platform_table() -> Table {
        Table::new(vec![
            Column::new(
                "Platform",
                text(&["Meta", "Google", "TikTok", "Google", "", "Meta", "LinkedIn"]),
            ),
            Column::new(
                "Cost",
                vec![
                    CellValue::Float(10.0),
                    CellValue::Float(25.0),
                    CellValue::Float(40.0),
                    CellValue::Float(15.0),
                    CellValue::Float(99.0),
                    CellValue::Null,
                    CellValue::Float(40.0),
                ],
            ),
        ])
        .unwrap()
    }

    fn total(key: &str, total: f64) -> GroupTotal {
        GroupTotal {
            key: key.to_string(),
            total,
        }
    }

    #[test]
    fn test_group_sum_descending_with_stable_ties() {
        let groups = group_sum(&platform_table(), "Platform", "Cost").unwrap();
        assert_eq!(
            groups,
            vec![
                total("Google", 40.0),
                total("TikTok", 40.0),
                total("LinkedIn", 40.0),
                total("Meta", 10.0),
            ]
        );
    }

    #[test]
    fn test_group_sums_match_restricted_sums() {
        let table = platform_table();
        let groups = group_sum(&table, "Platform", "Cost").unwrap();
        let keys = &table.column("Platform").unwrap().values;
        let costs = &table.column("Cost").unwrap().values;
        for group in &groups {
            let expected: f64 = keys
                .iter()
                .zip(costs)
                .filter(|(k, _)| k.to_string() == group.key && !k.is_null())
                .filter_map(|(_, c)| c.as_f64())
                .sum();
            assert_eq!(group.total, expected, "platform {}", group.key);
        }
    }

    #[test]
    fn test_missing_columns() {
        let table = platform_table();
        assert!(group_sum(&table, "Campaign", "Cost").is_none());
        assert!(group_sum(&table, "Platform", "Clicks").is_none());
        assert!(value_counts(&table, "Campaign").is_none());
        assert!(distinct_count(&table, "Campaign").is_none());
    }

    #[test]
    fn test_top_n_caps_length() {
        let groups = vec![total("a", 3.0), total("b", 2.0)];
        assert_eq!(top_n(&groups, 5).len(), 2);
        assert_eq!(top_n(&groups, 1), &[total("a", 3.0)]);
    }

    #[test]
    fn test_value_counts_and_distinct() {
        let table = platform_table();
        assert_eq!(
            value_counts(&table, "Platform").unwrap(),
            vec![
                ("Meta".to_string(), 2),
                ("Google".to_string(), 2),
                ("TikTok".to_string(), 1),
                ("LinkedIn".to_string(), 1),
            ]
        );
        assert_eq!(distinct_count(&table, "Platform"), Some(4));
    }

    #[test]
    fn test_numeric_keys_with_same_text_share_a_group() {
        let table = Table::new(vec![
            Column::new(
                "Platform",
                vec![CellValue::Integer(1), CellValue::Float(1.0), CellValue::Integer(2)],
            ),
            Column::new(
                "Cost",
                vec![CellValue::Integer(5), CellValue::Integer(7), CellValue::Integer(3)],
            ),
        ])
        .unwrap();

        assert_eq!(
            group_sum(&table, "Platform", "Cost").unwrap(),
            vec![total("1", 12.0), total("2", 3.0)]
        );
        assert_eq!(
            value_counts(&table, "Platform").unwrap(),
            vec![("1".to_string(), 2), ("2".to_string(), 1)]
        );
        assert_eq!(distinct_count(&table, "Platform"), Some(2));
    }

    #[test]
    fn test_value_range_ignores_missing() {
        let table = platform_table();
        let (lo, hi) = value_range(&table, "Cost").unwrap();
        assert_eq!(lo, &CellValue::Float(10.0));
        assert_eq!(hi, &CellValue::Float(99.0));

        let empty = Table::new(vec![Column::new("Date", vec![CellValue::Null])]).unwrap();
        assert!(value_range(&empty, "Date").is_none());
    }
}
