/// Data layer: core types, loading, statistics and grouping.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Column>, equal lengths, numeric subset
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ summary   │   │  group    │  per-key sums, counts, ranges
///   └──────────┘   └──────────┘
/// ```

pub mod group;
pub mod loader;
pub mod model;
pub mod summary;
