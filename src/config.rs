use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::filter::FilterState;
use crate::data::model::Value;
use crate::error::{Result, StoreError};

/// Environment variable overriding [`StoreConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "STATCAST_DATA_DIR";

// ---------------------------------------------------------------------------
// StoreConfig – where season files live and how they are named
// ---------------------------------------------------------------------------

/// On-disk format of the season files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Parquet,
    Csv,
}

impl FileFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Parquet => "parquet",
            FileFormat::Csv => "csv",
        }
    }
}

/// Layout of the season data directory.
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes:
///
/// ```json
/// { "data_dir": "/srv/statcast", "last_season": 2024 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub file_prefix: String,
    pub format: FileFormat,
    pub first_season: i32,
    pub last_season: i32,
    /// Command quoted in not-found errors so an operator can fetch the data.
    pub collect_command: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data").join("raw"),
            file_prefix: "statcast".to_string(),
            format: FileFormat::Parquet,
            first_season: 2015,
            last_season: 2025,
            collect_command: "python collector/collect_statcast.py".to_string(),
        }
    }
}

impl StoreConfig {
    /// Defaults with `data_dir` pointed elsewhere.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults, with `STATCAST_DATA_DIR` applied when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            log::debug!("{DATA_DIR_ENV} overrides data dir: {dir:?}");
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn seasons(&self) -> RangeInclusive<i32> {
        self.first_season..=self.last_season
    }
}

// ---------------------------------------------------------------------------
// Taxonomy – reference tables used by the metrics
// ---------------------------------------------------------------------------

/// Pitch type, team and outcome reference data.
///
/// Held by [`crate::metrics::Metrics`] rather than living in globals so that
/// alternate classifications can be swapped in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    /// Pitch code → display name.
    pub pitch_types: BTreeMap<String, String>,
    /// Group name → member pitch codes.
    pub pitch_groups: BTreeMap<String, Vec<String>>,
    /// Team code → team name.
    pub teams: BTreeMap<String, String>,
    /// `description` values that count as a swing.
    pub swing_outcomes: BTreeSet<String>,
    /// `description` values that count as a swing and miss.
    pub whiff_outcomes: BTreeSet<String>,
    /// Zone codes inside the strike zone.
    pub in_zone: BTreeSet<i64>,
    /// Zone codes outside the strike zone.
    pub out_zone: BTreeSet<i64>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let pitch_types = [
            ("FF", "4-Seam Fastball"),
            ("SI", "Sinker"),
            ("FC", "Cutter"),
            ("SL", "Slider"),
            ("ST", "Sweeper"),
            ("CU", "Curveball"),
            ("KC", "Knuckle Curve"),
            ("CH", "Changeup"),
            ("FS", "Splitter"),
            ("KN", "Knuckleball"),
            ("CS", "Slow Curve"),
            ("SV", "Slurve"),
            ("FA", "Fastball (generic)"),
            ("EP", "Eephus"),
            ("SC", "Screwball"),
            ("PO", "Pitchout"),
            ("IN", "Intentional Ball"),
            ("AB", "Automatic Ball"),
        ];
        let pitch_groups: [(&str, &[&str]); 4] = [
            ("fastball", &["FF", "SI", "FC", "FA"]),
            ("breaking", &["SL", "ST", "CU", "KC", "CS", "SV"]),
            ("offspeed", &["CH", "FS"]),
            ("other", &["KN", "EP", "SC", "PO", "IN", "AB"]),
        ];
        let teams = [
            ("AZ", "Arizona Diamondbacks"),
            ("ATL", "Atlanta Braves"),
            ("BAL", "Baltimore Orioles"),
            ("BOS", "Boston Red Sox"),
            ("CHC", "Chicago Cubs"),
            ("CWS", "Chicago White Sox"),
            ("CIN", "Cincinnati Reds"),
            ("CLE", "Cleveland Guardians"),
            ("COL", "Colorado Rockies"),
            ("DET", "Detroit Tigers"),
            ("HOU", "Houston Astros"),
            ("KC", "Kansas City Royals"),
            ("LAA", "Los Angeles Angels"),
            ("LAD", "Los Angeles Dodgers"),
            ("MIA", "Miami Marlins"),
            ("MIL", "Milwaukee Brewers"),
            ("MIN", "Minnesota Twins"),
            ("NYM", "New York Mets"),
            ("NYY", "New York Yankees"),
            ("OAK", "Oakland Athletics"),
            ("PHI", "Philadelphia Phillies"),
            ("PIT", "Pittsburgh Pirates"),
            ("SD", "San Diego Padres"),
            ("SF", "San Francisco Giants"),
            ("SEA", "Seattle Mariners"),
            ("STL", "St. Louis Cardinals"),
            ("TB", "Tampa Bay Rays"),
            ("TEX", "Texas Rangers"),
            ("TOR", "Toronto Blue Jays"),
            ("WSH", "Washington Nationals"),
        ];
        let whiffs = ["swinging_strike", "swinging_strike_blocked"];
        let swings = [
            "swinging_strike",
            "swinging_strike_blocked",
            "foul",
            "foul_tip",
            "hit_into_play",
        ];

        Self {
            pitch_types: to_string_map(&pitch_types),
            pitch_groups: pitch_groups
                .iter()
                .map(|(group, codes)| {
                    (
                        group.to_string(),
                        codes.iter().map(|c| c.to_string()).collect(),
                    )
                })
                .collect(),
            teams: to_string_map(&teams),
            swing_outcomes: swings.iter().map(|s| s.to_string()).collect(),
            whiff_outcomes: whiffs.iter().map(|s| s.to_string()).collect(),
            in_zone: (1..=9).collect(),
            out_zone: (11..=14).collect(),
        }
    }
}

impl Taxonomy {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn pitch_name(&self, code: &str) -> Option<&str> {
        self.pitch_types.get(code).map(String::as_str)
    }

    pub fn team_name(&self, code: &str) -> Option<&str> {
        self.teams.get(code).map(String::as_str)
    }

    /// Name of the group containing `code`, if any.
    pub fn pitch_group(&self, code: &str) -> Option<&str> {
        self.pitch_groups
            .iter()
            .find(|(_, codes)| codes.iter().any(|c| c == code))
            .map(|(group, _)| group.as_str())
    }

    pub fn is_swing(&self, description: &str) -> bool {
        self.swing_outcomes.contains(description)
    }

    pub fn is_whiff(&self, description: &str) -> bool {
        self.whiff_outcomes.contains(description)
    }

    pub fn is_in_zone(&self, zone: i64) -> bool {
        self.in_zone.contains(&zone)
    }

    pub fn is_out_of_zone(&self, zone: i64) -> bool {
        self.out_zone.contains(&zone)
    }

    /// A `pitch_type` filter selecting every pitch in `group`.
    ///
    /// An unknown group yields an empty selection, which matches no rows.
    pub fn group_filter(&self, group: &str) -> FilterState {
        let selected: BTreeSet<Value> = self
            .pitch_groups
            .get(group)
            .into_iter()
            .flatten()
            .map(|code| Value::String(code.clone()))
            .collect();
        FilterState::from([("pitch_type".to_string(), selected)])
    }
}

fn to_string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| StoreError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_layout_matches_collector() {
        let config = StoreConfig::default();
        assert_eq!(PathBuf::from("data/raw"), config.data_dir);
        assert_eq!(2015..=2025, config.seasons());
        assert_eq!("parquet", config.format.extension());
    }

    #[test]
    fn partial_json_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_dir": "/srv/statcast", "format": "csv" }}"#).unwrap();

        let config = StoreConfig::from_json_file(file.path()).unwrap();
        assert_eq!(PathBuf::from("/srv/statcast"), config.data_dir);
        assert_eq!(FileFormat::Csv, config.format);
        assert_eq!(2015, config.first_season);
        assert_eq!("statcast", config.file_prefix);
    }

    #[test]
    fn malformed_json_config_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = StoreConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }), "{err:?}");
    }

    #[test]
    fn default_taxonomy_lookups() {
        let taxonomy = Taxonomy::default();
        assert_eq!(Some("Sweeper"), taxonomy.pitch_name("ST"));
        assert_eq!(Some("breaking"), taxonomy.pitch_group("ST"));
        assert_eq!(Some("offspeed"), taxonomy.pitch_group("FS"));
        assert_eq!(None, taxonomy.pitch_group("ZZ"));
        assert_eq!(Some("Seattle Mariners"), taxonomy.team_name("SEA"));
        assert_eq!(30, taxonomy.teams.len());
        assert!(taxonomy.is_whiff("swinging_strike_blocked"));
        assert!(taxonomy.is_swing("foul_tip"));
        assert!(!taxonomy.is_swing("foul_bunt"));
        assert!(taxonomy.is_in_zone(5));
        assert!(!taxonomy.is_in_zone(10));
        assert!(taxonomy.is_out_of_zone(13));
    }

    #[test]
    fn taxonomy_overrides_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "swing_outcomes": ["foul", "foul_bunt"], "pitch_groups": {{ "hard": ["FF"] }} }}"#
        )
        .unwrap();

        let taxonomy = Taxonomy::from_json_file(file.path()).unwrap();
        assert!(taxonomy.is_swing("foul_bunt"));
        assert!(!taxonomy.is_swing("hit_into_play"));
        assert_eq!(Some("hard"), taxonomy.pitch_group("FF"));
        // untouched tables keep their defaults
        assert!(taxonomy.is_whiff("swinging_strike"));
    }

    #[test]
    fn group_filter_selects_member_codes() {
        let filter = Taxonomy::default().group_filter("offspeed");
        let selected = &filter["pitch_type"];
        assert_eq!(2, selected.len());
        assert!(selected.contains(&Value::String("CH".into())));
        assert!(Taxonomy::default().group_filter("nope")["pitch_type"].is_empty());
    }
}
