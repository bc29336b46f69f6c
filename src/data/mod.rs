/// Data layer: core types, loading, normalization, and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → MovieTable (raw headers)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  normalize    │  canonical columns, coerced numerics, dedup
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterSpec predicates → reduced MovieTable
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
