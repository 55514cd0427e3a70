#![allow(dead_code)]

use std::path::Path;

use statcast_analysis::data::writer::{write_csv, write_parquet};
use statcast_analysis::{Table, Value};

/// A synthetic season of `rows` pitches in one game, three pitches to a
/// plate appearance. `seq` records each row's in-file position.
pub fn season(year: i64, rows: usize) -> Table {
    let descriptions = [
        "ball",
        "foul",
        "swinging_strike",
        "hit_into_play",
        "called_strike",
        "swinging_strike_blocked",
    ];
    let zones = [Some(5), Some(12), None, Some(1), Some(14), Some(9)];
    let speeds = [None, None, None, Some(101.2), None, Some(93.0)];
    let angles = [None, None, None, Some(27.0), None, Some(-4.0)];

    let mut seq = Vec::new();
    let mut game_year = Vec::new();
    let mut pitch_type = Vec::new();
    let mut description = Vec::new();
    let mut zone = Vec::new();
    let mut launch_speed = Vec::new();
    let mut launch_angle = Vec::new();
    let mut game_pk = Vec::new();
    let mut at_bat = Vec::new();
    let mut pitch_number = Vec::new();
    let mut events = Vec::new();
    for i in 0..rows {
        let k = i % descriptions.len();
        seq.push(Value::Integer(i as i64));
        game_year.push(Value::Integer(year));
        pitch_type.push(Value::from(["FF", "SL", "CH"][i % 3]));
        description.push(Value::from(descriptions[k]));
        zone.push(Value::from(zones[k]));
        launch_speed.push(Value::from(speeds[k]));
        launch_angle.push(Value::from(angles[k]));
        game_pk.push(Value::Integer(year * 1000));
        at_bat.push(Value::Integer((i / 3) as i64 + 1));
        pitch_number.push(Value::Integer((i % 3) as i64 + 1));
        events.push(if i % 3 == 2 {
            Value::from("field_out")
        } else {
            Value::Null
        });
    }

    Table::from_columns(vec![
        ("seq".into(), seq),
        ("game_year".into(), game_year),
        ("pitch_type".into(), pitch_type),
        ("description".into(), description),
        ("zone".into(), zone),
        ("launch_speed".into(), launch_speed),
        ("launch_angle".into(), launch_angle),
        ("game_pk".into(), game_pk),
        ("at_bat_number".into(), at_bat),
        ("pitch_number".into(), pitch_number),
        ("events".into(), events),
    ])
}

pub fn write_season_parquet(dir: &Path, year: i64, rows: usize) -> Table {
    let table = season(year, rows);
    write_parquet(&dir.join(format!("statcast_{year}.parquet")), &table).unwrap();
    table
}

pub fn write_season_csv(dir: &Path, year: i64, rows: usize) -> Table {
    let table = season(year, rows);
    write_csv(&dir.join(format!("statcast_{year}.csv")), &table).unwrap();
    table
}

/// Values of an integer column.
pub fn ints(table: &Table, column: &str) -> Vec<i64> {
    table
        .column(column)
        .unwrap()
        .map(|v| v.as_i64().unwrap())
        .collect()
}
