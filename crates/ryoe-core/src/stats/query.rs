// Name search and ranking over an aggregated player list.

use std::cmp::Ordering;

use super::aggregate::PlayerStat;

/// Maximum number of autocomplete suggestions returned by [`search`].
pub const SUGGESTION_LIMIT: usize = 12;

/// Default length of a [`top_n`] ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// Case-insensitive substring search on player name.
///
/// The query is trimmed first; a blank query matches nothing. Results keep
/// source order and are capped at [`SUGGESTION_LIMIT`].
pub fn search<'a>(players: &'a [PlayerStat], query: &str) -> Vec<&'a PlayerStat> {
    search_with_limit(players, query, SUGGESTION_LIMIT)
}

/// [`search`] with an explicit result cap.
pub fn search_with_limit<'a>(
    players: &'a [PlayerStat],
    query: &str,
    limit: usize,
) -> Vec<&'a PlayerStat> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    players
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

/// First player whose name equals `query`, ignoring case and surrounding
/// whitespace in the query.
pub fn exact_match<'a>(players: &'a [PlayerStat], query: &str) -> Option<&'a PlayerStat> {
    let needle = query.trim().to_lowercase();
    players.iter().find(|p| p.name.to_lowercase() == needle)
}

/// Players with at least `min_rushes` attempts, best average first,
/// truncated to `n`.
///
/// Equal averages are ordered by name, then id, so the ranking never
/// depends on input order.
pub fn top_n(players: &[PlayerStat], min_rushes: u32, n: usize) -> Vec<&PlayerStat> {
    let mut ranked: Vec<&PlayerStat> = players.iter().filter(|p| p.rushes >= min_rushes).collect();
    ranked.sort_by(|a, b| rank_order(a, b));
    ranked.truncate(n);
    ranked
}

fn rank_order(a: &PlayerStat, b: &PlayerStat) -> Ordering {
    b.avg
        .partial_cmp(&a.avg)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Interpret free-form threshold input as a minimum attempt count.
///
/// Non-numeric input means no filter (0), as do zero and negative values.
/// Fractional thresholds round up, since attempt counts are whole numbers.
pub fn parse_min_rushes(input: &str) -> u32 {
    match input.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => v.ceil() as u32,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
