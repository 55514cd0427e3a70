use std::path::PathBuf;

use serde::Serialize;

use super::loader;
use super::model::Table;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

/// A season file found on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonFile {
    pub year: i32,
    pub path: PathBuf,
    pub bytes: u64,
    pub rows: usize,
}

/// Read-only access to the per-season files under a data directory.
///
/// Nothing is cached: every call reads from disk and hands the caller a
/// freshly owned [`Table`].
#[derive(Debug, Clone)]
pub struct DataStore {
    config: StoreConfig,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl DataStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Store rooted at `data_dir` with the default layout.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::with_data_dir(data_dir))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Canonical path of a season, e.g. `data/raw/statcast_2024.parquet`.
    pub fn season_path(&self, year: i32) -> PathBuf {
        self.config.data_dir.join(format!(
            "{}_{year}.{}",
            self.config.file_prefix,
            self.config.format.extension()
        ))
    }

    /// Load a single season, optionally projected to `columns`.
    ///
    /// ```no_run
    /// # use statcast_analysis::DataStore;
    /// let store = DataStore::default();
    /// let pitches = store.load_season(2024, Some(&["pitch_type", "release_speed"]))?;
    /// # Ok::<(), statcast_analysis::StoreError>(())
    /// ```
    pub fn load_season(&self, year: i32, columns: Option<&[&str]>) -> Result<Table> {
        let path = self.season_path(year);
        if !path.exists() {
            return Err(StoreError::NotFound {
                year,
                remediation: format!("{} --year {year}", self.config.collect_command),
                path,
            });
        }
        loader::load_file(&path, columns)
    }

    /// Load every present season in `start_year..=end_year`, in ascending
    /// order, and stack them into one table.
    ///
    /// Missing seasons are skipped; any other failure aborts the load. Fails
    /// with [`StoreError::EmptyRange`] only when no season in the range exists.
    pub fn load_seasons(
        &self,
        start_year: i32,
        end_year: i32,
        columns: Option<&[&str]>,
        verbose: bool,
    ) -> Result<Table> {
        let level = if verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        };

        let mut tables = Vec::new();
        for year in start_year..=end_year {
            match self.load_season(year, columns) {
                Ok(table) => {
                    log::log!(level, "Loading {year}... {} pitches", table.len());
                    tables.push(table);
                }
                Err(err) if err.is_not_found() => {
                    log::warn!("Loading {year}... not found, skipping");
                }
                Err(err) => return Err(err),
            }
        }

        if tables.is_empty() {
            return Err(StoreError::EmptyRange {
                start: start_year,
                end: end_year,
                remediation: format!(
                    "{} --range {start_year} {end_year}",
                    self.config.collect_command
                ),
            });
        }

        let combined = Table::concat(tables);
        log::log!(level, "Total: {} pitches", combined.len());
        Ok(combined)
    }

    /// [`load_seasons`](Self::load_seasons) over the configured season range.
    pub fn load_all(&self, columns: Option<&[&str]>, verbose: bool) -> Result<Table> {
        self.load_seasons(
            self.config.first_season,
            self.config.last_season,
            columns,
            verbose,
        )
    }

    /// Seasons in the configured range whose files exist, with their sizes.
    pub fn inventory(&self) -> Result<Vec<SeasonFile>> {
        let mut found = Vec::new();
        for year in self.config.seasons() {
            let path = self.season_path(year);
            if !path.exists() {
                continue;
            }
            let bytes = std::fs::metadata(&path)
                .map_err(|e| StoreError::io(&path, e))?
                .len();
            let rows = loader::count_rows(&path)?;
            found.push(SeasonFile {
                year,
                path,
                bytes,
                rows,
            });
        }
        Ok(found)
    }
}
