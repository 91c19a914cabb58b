// Per-player aggregation of decoded CSV records.
//
// Two input shapes are supported: one row per player with an attempts
// column (pre-aggregated), or one row per rush (grouped here by name).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::decode::Record;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Aggregated rushing line for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    /// External player id. May be empty.
    pub id: String,
    pub name: String,
    /// Number of rushing attempts.
    pub rushes: u32,
    /// Average yards over expected per rush. Always finite.
    pub avg: f64,
}

/// Names of the CSV columns the aggregator reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub name: String,
    pub id: String,
    /// Per-row (or per-player average) yards over expected.
    pub value: String,
    /// Attempts column. Its presence selects the pre-aggregated path.
    pub count: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            name: "rusher_player_name".into(),
            id: "rusher_player_id".into(),
            value: "yards_above_expected".into(),
            count: "rush_attempts".into(),
        }
    }
}

/// Which aggregation path produced a player list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One input row per player, attempts read from the count column.
    PreAggregated,
    /// One input row per rush, grouped by player name.
    Grouped,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a numeric field, coercing missing, unparseable and non-finite
/// values to 0.
pub fn parse_finite(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

struct Bucket {
    id: String,
    name: String,
    total: f64,
    rushes: u32,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Build the per-player list from decoded records.
///
/// The strategy is chosen from the first record's header row: if it has the
/// count column every record is one player, otherwise records are grouped
/// by name. Records with an empty name are dropped on both paths.
pub fn build_player_stats(records: &[Record], columns: &Columns) -> (Vec<PlayerStat>, Strategy) {
    let pre_aggregated = records
        .first()
        .is_some_and(|r| r.has_column(&columns.count));

    if pre_aggregated {
        let players = from_pre_aggregated(records, columns);
        info!(
            players = players.len(),
            rows = records.len(),
            "built player stats from pre-aggregated rows"
        );
        (players, Strategy::PreAggregated)
    } else {
        let players = from_grouped(records, columns);
        info!(
            players = players.len(),
            rows = records.len(),
            "built player stats by grouping rows on name"
        );
        (players, Strategy::Grouped)
    }
}

fn from_pre_aggregated(records: &[Record], columns: &Columns) -> Vec<PlayerStat> {
    records
        .iter()
        .filter_map(|r| {
            let name = r.get(&columns.name).unwrap_or_default();
            if name.is_empty() {
                debug!("dropping pre-aggregated row without a player name");
                return None;
            }
            let rushes = parse_finite(r.get(&columns.count)).round() as u32;
            Some(PlayerStat {
                id: r.get(&columns.id).unwrap_or_default().to_string(),
                name: name.to_string(),
                rushes,
                avg: parse_finite(r.get(&columns.value)),
            })
        })
        .collect()
}

fn from_grouped(records: &[Record], columns: &Columns) -> Vec<PlayerStat> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for r in records {
        let name = r.get(&columns.name).unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let id = r.get(&columns.id).unwrap_or_default();
        let yards = parse_finite(r.get(&columns.value));

        let slot = *index.entry(name).or_insert_with(|| {
            buckets.push(Bucket {
                id: String::new(),
                name: name.to_string(),
                total: 0.0,
                rushes: 0,
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        if bucket.id.is_empty() && !id.is_empty() {
            bucket.id = id.to_string();
        }
        bucket.total += yards;
        bucket.rushes = bucket.rushes.saturating_add(1);
    }

    buckets
        .into_iter()
        .map(|b| PlayerStat {
            avg: if b.rushes > 0 {
                finite_or_zero(b.total / f64::from(b.rushes))
            } else {
                0.0
            },
            id: b.id,
            name: b.name,
            rushes: b.rushes,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
