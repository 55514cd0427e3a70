//! Sabermetric rate statistics over pitch tables.
//!
//! Every rate is `numerator / denominator` with `0.0` returned when the
//! denominator is empty. Null cells never raise: they simply fail to
//! qualify. A column the metric needs that the table lacks is a
//! [`StoreError::Schema`](crate::StoreError::Schema).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Taxonomy;
use crate::data::model::{Record, Table, Value};
use crate::error::Result;

/// Minimum exit velocity (mph) of a barrel.
pub const BARREL_MIN_EXIT_VELOCITY: f64 = 98.0;
pub const DEFAULT_HARD_HIT_THRESHOLD: f64 = 95.0;
pub const DEFAULT_SWEET_SPOT: (f64, f64) = (8.0, 32.0);

/// Fields carried from the first pitch of each plate appearance.
const PA_IDENTITY_COLUMNS: [&str; 5] = ["batter", "pitcher", "game_year", "home_team", "away_team"];

/// Whether a batted ball is a barrel.
///
/// Requires at least 98 mph and a launch angle inside a 26°–30° window that
/// widens by one degree each way per mph above 98, clipped to 8°–50°. All
/// bounds are inclusive. `NaN` inputs are never barrels.
pub fn calculate_barrel(exit_velocity: f64, launch_angle: f64) -> bool {
    let ev = exit_velocity;
    let la = launch_angle;
    let over = ev - BARREL_MIN_EXIT_VELOCITY;
    ev >= BARREL_MIN_EXIT_VELOCITY
        && la >= 26.0 - over
        && la <= 30.0 + over
        && la >= 8.0
        && la <= 50.0
}

/// K%, BB% and HR% over plate appearances, as percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateStats {
    pub k_pct: f64,
    pub bb_pct: f64,
    pub hr_pct: f64,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Metric calculator bound to a [`Taxonomy`].
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    taxonomy: Taxonomy,
}

impl Metrics {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Barrel flag per row from `launch_speed` and `launch_angle`; rows with
    /// either missing are not barrels.
    pub fn barrel_flags(&self, rows: &Table) -> Result<Vec<bool>> {
        let ev = rows.column_index("launch_speed")?;
        let la = rows.column_index("launch_angle")?;
        Ok(rows
            .rows
            .iter()
            .map(|r| match (r.get(ev).as_f64(), r.get(la).as_f64()) {
                (Some(ev), Some(la)) => calculate_barrel(ev, la),
                _ => false,
            })
            .collect())
    }

    /// Barrels per batted ball (rows with both exit velocity and launch
    /// angle recorded).
    pub fn barrel_rate(&self, rows: &Table) -> Result<f64> {
        let ev = rows.column_index("launch_speed")?;
        let la = rows.column_index("launch_angle")?;
        let (mut batted, mut barrels) = (0, 0);
        for r in &rows.rows {
            if let (Some(ev), Some(la)) = (r.get(ev).as_f64(), r.get(la).as_f64()) {
                batted += 1;
                if calculate_barrel(ev, la) {
                    barrels += 1;
                }
            }
        }
        Ok(ratio(barrels, batted))
    }

    /// Swinging strikes per swing. Bunt attempts are not swings here.
    pub fn whiff_rate(&self, rows: &Table) -> Result<f64> {
        let desc = rows.column_index("description")?;
        let (mut swings, mut whiffs) = (0, 0);
        for d in rows.rows.iter().filter_map(|r| r.get(desc).as_str()) {
            if self.taxonomy.is_swing(d) {
                swings += 1;
            }
            if self.taxonomy.is_whiff(d) {
                whiffs += 1;
            }
        }
        Ok(ratio(whiffs, swings))
    }

    /// Swings at pitches outside the zone per pitch outside the zone.
    pub fn chase_rate(&self, rows: &Table) -> Result<f64> {
        let zone = rows.column_index("zone")?;
        let desc = rows.column_index("description")?;
        let (mut outside, mut chases) = (0, 0);
        for r in &rows.rows {
            if !self.zone_matches(r, zone, Taxonomy::is_out_of_zone) {
                continue;
            }
            outside += 1;
            if r.get(desc).as_str().is_some_and(|d| self.taxonomy.is_swing(d)) {
                chases += 1;
            }
        }
        Ok(ratio(chases, outside))
    }

    /// Pitches in the strike zone per pitch with a recorded zone.
    pub fn zone_rate(&self, rows: &Table) -> Result<f64> {
        let zone = rows.column_index("zone")?;
        let located = rows.rows.iter().filter(|r| !r.get(zone).is_null()).count();
        let in_zone = rows
            .rows
            .iter()
            .filter(|r| self.zone_matches(r, zone, Taxonomy::is_in_zone))
            .count();
        Ok(ratio(in_zone, located))
    }

    fn zone_matches(&self, row: &Record, zone: usize, test: fn(&Taxonomy, i64) -> bool) -> bool {
        row.get(zone).as_i64().is_some_and(|z| test(&self.taxonomy, z))
    }

    /// Batted balls at or above `threshold` mph per batted ball.
    pub fn hard_hit_rate(&self, rows: &Table, threshold: f64) -> Result<f64> {
        let speeds = numeric(rows, "launch_speed")?;
        let hard = speeds.iter().filter(|&&s| s >= threshold).count();
        Ok(ratio(hard, speeds.len()))
    }

    /// Batted balls with launch angle in `[min_angle, max_angle]` per
    /// batted ball.
    pub fn sweet_spot_rate(&self, rows: &Table, min_angle: f64, max_angle: f64) -> Result<f64> {
        let angles = numeric(rows, "launch_angle")?;
        let sweet = angles
            .iter()
            .filter(|&&a| a >= min_angle && a <= max_angle)
            .count();
        Ok(ratio(sweet, angles.len()))
    }

    /// Roll pitches up to one row per plate appearance.
    ///
    /// Rows are grouped on (`game_pk`, `at_bat_number`). Each output row has
    /// the key, the last non-null `events` in pitch order, the highest
    /// `pitch_number`, and the first non-null value of each identity column
    /// (`batter`, `pitcher`, `game_year`, `home_team`, `away_team`) the input
    /// carries. Plate appearances without an event are dropped. Output is
    /// sorted by key; rows missing either key part are ignored.
    ///
    /// Pitch order comes from `pitch_number`, so newest-first exports roll up
    /// the same as oldest-first ones. Among rows with equal (or missing)
    /// pitch numbers the later row wins.
    pub fn aggregate_pa_results(&self, rows: &Table) -> Result<Table> {
        let game = rows.column_index("game_pk")?;
        let at_bat = rows.column_index("at_bat_number")?;
        let events = rows.column_index("events")?;
        let pitch_number = rows.column_index("pitch_number")?;
        let identity: Vec<(&str, usize)> = PA_IDENTITY_COLUMNS
            .iter()
            .filter_map(|&c| rows.column_index(c).ok().map(|i| (c, i)))
            .collect();

        struct PlateAppearance {
            event: Value,
            event_pitch: Value,
            max_pitch: Value,
            identity: Vec<Value>,
        }

        let mut groups: BTreeMap<(Value, Value), PlateAppearance> = BTreeMap::new();
        for r in &rows.rows {
            let key = (r.get(game).clone(), r.get(at_bat).clone());
            if key.0.is_null() || key.1.is_null() {
                continue;
            }
            let pa = groups.entry(key).or_insert_with(|| PlateAppearance {
                event: Value::Null,
                event_pitch: Value::Null,
                max_pitch: Value::Null,
                identity: vec![Value::Null; identity.len()],
            });
            let pitch = r.get(pitch_number);
            if !r.get(events).is_null() && (pa.event.is_null() || *pitch >= pa.event_pitch) {
                pa.event = r.get(events).clone();
                pa.event_pitch = pitch.clone();
            }
            if !pitch.is_null() && (pa.max_pitch.is_null() || *pitch > pa.max_pitch) {
                pa.max_pitch = pitch.clone();
            }
            for (slot, &(_, idx)) in pa.identity.iter_mut().zip(&identity) {
                if slot.is_null() {
                    *slot = r.get(idx).clone();
                }
            }
        }

        let mut column_names: Vec<String> = ["game_pk", "at_bat_number", "events", "pitch_number"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        column_names.extend(identity.iter().map(|(c, _)| c.to_string()));

        let out = groups
            .into_iter()
            .filter(|(_, pa)| !pa.event.is_null())
            .map(|((game_pk, at_bat_number), pa)| {
                let mut values = vec![game_pk, at_bat_number, pa.event, pa.max_pitch];
                values.extend(pa.identity);
                Record::new(values)
            })
            .collect();
        Ok(Table::new(column_names, out))
    }

    /// K%, BB% and HR% over plate-appearance rows (see
    /// [`aggregate_pa_results`](Self::aggregate_pa_results)).
    pub fn calculate_rate_stats(&self, pa_rows: &Table) -> Result<RateStats> {
        let events = pa_rows.column_index("events")?;
        let total = pa_rows.len();
        if total == 0 {
            return Ok(RateStats::default());
        }

        let (mut strikeouts, mut walks, mut home_runs) = (0, 0, 0);
        for e in pa_rows.rows.iter().filter_map(|r| r.get(events).as_str()) {
            if e.to_ascii_lowercase().contains("strikeout") {
                strikeouts += 1;
            }
            if e == "walk" || e == "intent_walk" {
                walks += 1;
            }
            if e == "home_run" {
                home_runs += 1;
            }
        }
        Ok(RateStats {
            k_pct: ratio(strikeouts, total) * 100.0,
            bb_pct: ratio(walks, total) * 100.0,
            hr_pct: ratio(home_runs, total) * 100.0,
        })
    }
}

/// Non-null numeric cells of `column`.
fn numeric(rows: &Table, column: &str) -> Result<Vec<f64>> {
    Ok(rows.column(column)?.filter_map(Value::as_f64).collect())
}

impl From<Taxonomy> for Metrics {
    fn from(taxonomy: Taxonomy) -> Self {
        Self::new(taxonomy)
    }
}
