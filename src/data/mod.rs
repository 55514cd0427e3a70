//! Data layer: core types, loading, filtering, and writing.
//!
//! Architecture:
//! ```text
//!  statcast_<year>.parquet / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  store    │  year → path, skip missing seasons, concat
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file (+ column projection) → Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table    │  column names, Vec<Record>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  value predicates → row subsets / partitions
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod store;
pub mod writer;
