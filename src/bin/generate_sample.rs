//! Writes deterministic synthetic season files (`statcast_<year>.parquet`)
//! so the library can be exercised without collected data.
//!
//! Usage: `generate_sample [OUT_DIR] [START_YEAR] [END_YEAR]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use statcast_analysis::data::writer::write_parquet;
use statcast_analysis::{DataStore, StoreConfig, Table, Value};

const GAMES_PER_SEASON: i64 = 40;
const PLATE_APPEARANCES_PER_GAME: i64 = 70;
const TEAMS: [&str; 6] = ["NYY", "BOS", "LAD", "SF", "HOU", "SEA"];

/// (code, base velocity, base spin, usage weight)
const PITCHES: [(&str, f64, f64, f64); 6] = [
    ("FF", 93.2, 2250.0, 0.36),
    ("SI", 92.6, 2130.0, 0.16),
    ("SL", 84.8, 2420.0, 0.18),
    ("CH", 84.5, 1750.0, 0.12),
    ("CU", 78.9, 2530.0, 0.10),
    ("ST", 81.9, 2600.0, 0.08),
];

/// Seeded xoshiro256** stream. Every run with the same seed writes the same
/// seasons, so sample files can be regenerated byte for byte.
struct PitchRng {
    state: [u64; 4],
}

impl PitchRng {
    fn seeded(seed: u64) -> Self {
        // spread the seed over all four words with an LCG step each
        let mut x = seed;
        let state = [(); 4].map(|_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            x
        });
        PitchRng { state }
    }

    fn next_u64(&mut self) -> u64 {
        let [s0, s1, s2, s3] = &mut self.state;
        let out = s1.wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let shifted = *s1 << 17;
        *s2 ^= *s0;
        *s3 ^= *s1;
        *s1 ^= *s2;
        *s0 ^= *s3;
        *s2 ^= shifted;
        *s3 = s3.rotate_left(45);
        out
    }

    /// Uniform in `[0, 1)` from the top 53 bits.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Normal draw via Box-Muller; `u1` is kept off zero for the log.
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.unit().max(f64::MIN_POSITIVE);
        let u2 = self.unit();
        let radius = (-2.0 * u1.ln()).sqrt();
        mean + std_dev * radius * (std::f64::consts::TAU * u2).cos()
    }
}

#[derive(Default)]
struct Columns {
    game_pk: Vec<Value>,
    game_year: Vec<Value>,
    game_date: Vec<Value>,
    home_team: Vec<Value>,
    away_team: Vec<Value>,
    at_bat_number: Vec<Value>,
    pitch_number: Vec<Value>,
    batter: Vec<Value>,
    pitcher: Vec<Value>,
    pitch_type: Vec<Value>,
    release_speed: Vec<Value>,
    release_spin_rate: Vec<Value>,
    zone: Vec<Value>,
    description: Vec<Value>,
    events: Vec<Value>,
    launch_speed: Vec<Value>,
    launch_angle: Vec<Value>,
}

impl Columns {
    fn into_table(self) -> Table {
        Table::from_columns(vec![
            ("game_pk".into(), self.game_pk),
            ("game_year".into(), self.game_year),
            ("game_date".into(), self.game_date),
            ("home_team".into(), self.home_team),
            ("away_team".into(), self.away_team),
            ("at_bat_number".into(), self.at_bat_number),
            ("pitch_number".into(), self.pitch_number),
            ("batter".into(), self.batter),
            ("pitcher".into(), self.pitcher),
            ("pitch_type".into(), self.pitch_type),
            ("release_speed".into(), self.release_speed),
            ("release_spin_rate".into(), self.release_spin_rate),
            ("zone".into(), self.zone),
            ("description".into(), self.description),
            ("events".into(), self.events),
            ("launch_speed".into(), self.launch_speed),
            ("launch_angle".into(), self.launch_angle),
        ])
    }
}

fn pick_pitch(rng: &mut PitchRng) -> (&'static str, f64, f64) {
    let mut roll = rng.unit();
    for &(code, velo, spin, weight) in &PITCHES {
        if roll < weight {
            return (code, velo, spin);
        }
        roll -= weight;
    }
    let (code, velo, spin, _) = PITCHES[0];
    (code, velo, spin)
}

fn generate_season(year: i32, rng: &mut PitchRng) -> Table {
    let mut cols = Columns::default();
    let drift = f64::from(year - 2015);

    for game in 0..GAMES_PER_SEASON {
        let game_pk = i64::from(year) * 10_000 + game;
        let home = TEAMS[rng.below(TEAMS.len() as u64) as usize];
        let away = TEAMS[(TEAMS.iter().position(|&t| t == home).unwrap_or(0) + 1) % TEAMS.len()];
        let date = format!("{year}-{:02}-{:02}", 4 + game / 28, 1 + game % 28);
        let pitcher = 500_000 + rng.below(400) as i64;

        for at_bat in 1..=PLATE_APPEARANCES_PER_GAME {
            let batter = 600_000 + rng.below(900) as i64;
            let (mut balls, mut strikes, mut pitch_number) = (0, 0, 0);

            loop {
                pitch_number += 1;
                let (code, velo, spin) = pick_pitch(rng);
                let in_zone = rng.chance(0.48);
                let zone = if in_zone {
                    1 + rng.below(9) as i64
                } else {
                    11 + rng.below(4) as i64
                };
                let swing = rng.chance(if in_zone { 0.66 } else { 0.29 + 0.002 * drift });

                let mut event = None;
                let mut contact = None;
                let description = if swing {
                    let roll = rng.unit();
                    if roll < 0.24 + 0.004 * drift {
                        strikes += 1;
                        if rng.chance(0.1) {
                            "swinging_strike_blocked"
                        } else {
                            "swinging_strike"
                        }
                    } else if roll < 0.62 {
                        if strikes < 2 {
                            strikes += 1;
                        }
                        if rng.chance(0.05) {
                            "foul_tip"
                        } else {
                            "foul"
                        }
                    } else {
                        let ev = rng.gauss(88.5 + 0.15 * drift, 14.0).clamp(20.0, 121.0);
                        let la = rng.gauss(11.0 + 0.3 * drift, 26.0).clamp(-80.0, 85.0);
                        event = Some(if super_contact(ev, la) {
                            "home_run"
                        } else if rng.chance(0.3) {
                            "single"
                        } else {
                            "field_out"
                        });
                        contact = Some((ev, la));
                        "hit_into_play"
                    }
                } else if in_zone {
                    strikes += 1;
                    "called_strike"
                } else {
                    balls += 1;
                    if rng.chance(0.03) {
                        "blocked_ball"
                    } else {
                        "ball"
                    }
                };
                if event.is_none() && strikes >= 3 {
                    event = Some("strikeout");
                }
                if event.is_none() && balls >= 4 {
                    event = Some(if rng.chance(0.05) { "intent_walk" } else { "walk" });
                }

                cols.game_pk.push(Value::Integer(game_pk));
                cols.game_year.push(Value::Integer(i64::from(year)));
                cols.game_date.push(Value::String(date.clone()));
                cols.home_team.push(home.into());
                cols.away_team.push(away.into());
                cols.at_bat_number.push(Value::Integer(at_bat));
                cols.pitch_number.push(Value::Integer(pitch_number));
                cols.batter.push(Value::Integer(batter));
                cols.pitcher.push(Value::Integer(pitcher));
                cols.pitch_type.push(code.into());
                cols.release_speed
                    .push(Value::float(rng.gauss(velo + 0.1 * drift, 1.4)));
                cols.release_spin_rate
                    .push(Value::float(rng.gauss(spin + 8.0 * drift, 90.0)));
                cols.zone.push(Value::Integer(zone));
                cols.description.push(description.into());
                cols.events.push(Value::from(event));
                cols.launch_speed.push(Value::from(contact.map(|(ev, _)| ev)));
                cols.launch_angle.push(Value::from(contact.map(|(_, la)| la)));

                if event.is_some() {
                    break;
                }
            }
        }
    }

    cols.into_table()
}

/// Deep fly balls hit hard enough to leave the park.
fn super_contact(ev: f64, la: f64) -> bool {
    ev >= 100.0 && (24.0..=36.0).contains(&la)
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let out_dir = args.next().map_or_else(|| StoreConfig::default().data_dir, PathBuf::from);
    let start: i32 = match args.next() {
        Some(arg) => arg.parse().with_context(|| format!("start year '{arg}'"))?,
        None => 2015,
    };
    let end: i32 = match args.next() {
        Some(arg) => arg.parse().with_context(|| format!("end year '{arg}'"))?,
        None => 2025,
    };

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let store = DataStore::open(&out_dir);

    let mut rng = PitchRng::seeded(42);
    let mut total = 0;
    for year in start..=end {
        let table = generate_season(year, &mut rng);
        let path = store.season_path(year);
        write_parquet(&path, &table).with_context(|| format!("writing {}", path.display()))?;
        log::info!("{year}: {} pitches → {}", table.len(), path.display());
        total += table.len();
    }

    println!(
        "Wrote {total} pitches across {} seasons to {}",
        end - start + 1,
        out_dir.display()
    );
    Ok(())
}
