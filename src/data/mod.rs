/// Data layer: core types, loading, statistics and row filtering.
///
/// Architecture:
/// ```text
///  .csv bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + infer column types → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Dataset: named, typed, equal-length columns
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  stats    │   │  query    │  filter expression → matching row indices
///   └──────────┘   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod query;
pub mod stats;
