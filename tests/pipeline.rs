mod common;

use assert_float_eq::*;
use statcast_analysis::stats::{LinearTrend, Summary};
use statcast_analysis::{partition_by, DataStore, Metrics, StoreError, Taxonomy, Value};

use common::write_season_parquet;

#[test]
fn per_season_metrics_from_loaded_data() {
    let dir = tempfile::tempdir().unwrap();
    for year in 2015..=2018 {
        write_season_parquet(dir.path(), year, 12);
    }
    let store = DataStore::open(dir.path());
    let pitches = store
        .load_seasons(
            2015,
            2018,
            Some(&["game_year", "zone", "description", "launch_speed", "launch_angle"]),
            false,
        )
        .unwrap();

    let metrics = Metrics::default();
    let seasons = partition_by(&pitches, "game_year").unwrap();
    assert_eq!(4, seasons.len());

    for (year, season) in &seasons {
        assert!(matches!(year, Value::Integer(2015..=2018)));
        assert_eq!(12, season.len());
        // per 6-row cycle: swings are foul, swinging_strike, hit_into_play,
        // swinging_strike_blocked; whiffs are the two swinging strikes
        assert_float_absolute_eq!(0.5, metrics.whiff_rate(season).unwrap());
        // located zones 5, 12, 1, 14, 9 → three in the zone
        assert_float_absolute_eq!(0.6, metrics.zone_rate(season).unwrap());
        // out of zone: 12 (foul, a swing) and 14 (called_strike)
        assert_float_absolute_eq!(0.5, metrics.chase_rate(season).unwrap());
        // batted balls 101.2 @ 27° (barrel) and 93.0 @ -4°
        assert_float_absolute_eq!(0.5, metrics.hard_hit_rate(season, 95.0).unwrap());
        assert_float_absolute_eq!(0.5, metrics.sweet_spot_rate(season, 8.0, 32.0).unwrap());
        assert_float_absolute_eq!(0.5, metrics.barrel_rate(season).unwrap());
    }

    let rates: Vec<f64> = seasons
        .values()
        .map(|s| metrics.whiff_rate(s).unwrap())
        .collect();
    let summary = Summary::of(&rates).unwrap();
    assert_eq!(4, summary.count);
    assert_float_absolute_eq!(0.5, summary.mean);
    assert_float_absolute_eq!(0.0, summary.std);
}

#[test]
fn season_size_trend() {
    let dir = tempfile::tempdir().unwrap();
    for (year, rows) in [(2015, 6), (2016, 8), (2017, 9), (2018, 13)] {
        write_season_parquet(dir.path(), year, rows);
    }
    let inventory = DataStore::open(dir.path()).inventory().unwrap();
    let years: Vec<f64> = inventory.iter().map(|s| f64::from(s.year)).collect();
    let sizes: Vec<f64> = inventory.iter().map(|s| s.rows as f64).collect();

    let trend = LinearTrend::fit(&years, &sizes).unwrap();
    assert_float_absolute_eq!(2.2, trend.slope, 1e-6);
    assert_float_absolute_eq!(9.0, trend.predict(2016.5), 1e-6);
    assert!(trend.r_squared > 0.9 && trend.r_squared < 1.0);
}

#[test]
fn plate_appearances_from_loaded_data() {
    let dir = tempfile::tempdir().unwrap();
    write_season_parquet(dir.path(), 2023, 10);
    let pitches = DataStore::open(dir.path()).load_season(2023, None).unwrap();

    let metrics = Metrics::default();
    let pa = metrics.aggregate_pa_results(&pitches).unwrap();
    // 10 pitches make three complete appearances and one unfinished one
    assert_eq!(3, pa.len());
    assert!(pa.column("events").unwrap().all(|e| !e.is_null()));
    assert!(pa.has_column("game_year"));

    let mut keys: Vec<(Value, Value)> = pa
        .rows
        .iter()
        .map(|r| (r.get(0).clone(), r.get(1).clone()))
        .collect();
    let len = keys.len();
    keys.dedup();
    assert_eq!(len, keys.len());

    let stats = metrics.calculate_rate_stats(&pa).unwrap();
    assert_eq!(0.0, stats.k_pct);
    assert_eq!(0.0, stats.hr_pct);
}

#[test]
fn pitch_group_filter_restricts_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_season_parquet(dir.path(), 2024, 9);
    let pitches = DataStore::open(dir.path())
        .load_season(2024, Some(&["pitch_type", "launch_speed"]))
        .unwrap();

    let taxonomy = Taxonomy::default();
    let fastballs = pitches.filter(&taxonomy.group_filter("fastball")).unwrap();
    assert_eq!(3, fastballs.len());
    assert!(fastballs
        .column("pitch_type")
        .unwrap()
        .all(|v| v == &Value::from("FF")));

    let breaking = pitches.filter(&taxonomy.group_filter("breaking")).unwrap();
    let offspeed = pitches.filter(&taxonomy.group_filter("offspeed")).unwrap();
    assert_eq!(9, fastballs.len() + breaking.len() + offspeed.len());

    let speeds: Vec<f64> = pitches
        .column("launch_speed")
        .unwrap()
        .filter_map(Value::as_f64)
        .collect();
    let summary = Summary::of(&speeds).unwrap();
    assert_eq!(2, summary.count);
    assert_float_absolute_eq!(97.1, summary.mean, 1e-9);
}

#[test]
fn group_filter_needs_projected_pitch_type() {
    let dir = tempfile::tempdir().unwrap();
    write_season_parquet(dir.path(), 2024, 9);
    let batted = DataStore::open(dir.path())
        .load_season(2024, Some(&["launch_speed"]))
        .unwrap();

    let err = batted
        .filter(&Taxonomy::default().group_filter("fastball"))
        .unwrap_err();
    assert!(
        matches!(err, StoreError::Schema { ref column, .. } if column == "pitch_type"),
        "{err:?}"
    );
}
