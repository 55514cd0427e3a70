//! Loading of per-season MLB Statcast pitch files and the sabermetric rate
//! statistics computed over them.
//!
//! ```no_run
//! use statcast_analysis::{DataStore, Metrics};
//!
//! let store = DataStore::default();
//! let pitches = store.load_seasons(2020, 2024, Some(&["zone", "description"]), true)?;
//! let metrics = Metrics::default();
//! println!("chase rate: {:.3}", metrics.chase_rate(&pitches)?);
//! # Ok::<(), statcast_analysis::StoreError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod stats;

pub use config::{FileFormat, StoreConfig, Taxonomy};
pub use data::filter::{filtered_indices, partition_by, FilterState};
pub use data::model::{Record, Table, Value};
pub use data::store::{DataStore, SeasonFile};
pub use error::StoreError;
pub use metrics::{calculate_barrel, Metrics, RateStats};
