/// Data layer: table model, loading, cleaning, transforms and charts.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  store    │  Dataset: the one owned Table (Empty | Loaded)
///   └──────────┘
///     │     │     │
///     ▼     ▼     ▼
///  transform quality charts   borrow the table for one call
///              │
///              ▼
///          ┌────────┐
///          │ filter │  row predicates: ranges, matches, duplicates
///          └────────┘
/// ```

pub mod charts;
pub mod describe;
pub mod filter;
pub mod loader;
pub mod model;
pub mod quality;
pub mod store;
pub mod transform;

pub use crate::error::{DatasetError, Result};
