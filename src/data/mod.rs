/// Data layer: core types, loading, filtering and grid projection.
///
/// Architecture:
/// ```text
///  bundled csv / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → PenguinTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ PenguinTable  │  Vec<Record>, immutable once loaded
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  species ∈ selected ∧ mass < ceiling → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   grid    │  projection, per-column filters, sort (table only)
///   └──────────┘
/// ```

pub mod filter;
pub mod grid;
pub mod loader;
pub mod model;
