// Player aggregation and ranking.

pub mod aggregate;
pub mod query;

pub use aggregate::{build_player_stats, Columns, PlayerStat, Strategy};
pub use query::{
    exact_match, parse_min_rushes, search, search_with_limit, top_n, DEFAULT_TOP_N,
    SUGGESTION_LIMIT,
};

use crate::decode;

/// Immutable snapshot of the aggregated players for one load.
///
/// Built once and never mutated; queries borrow from it.
#[derive(Debug, Clone)]
pub struct Dataset {
    players: Vec<PlayerStat>,
    strategy: Strategy,
}

impl Dataset {
    /// Decode `text` and aggregate it with the given column layout.
    pub fn from_csv_text(text: &str, columns: &Columns) -> Self {
        let records = decode::parse(text);
        let (players, strategy) = build_player_stats(&records, columns);
        Self { players, strategy }
    }

    pub fn players(&self) -> &[PlayerStat] {
        &self.players
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<&PlayerStat> {
        search_with_limit(&self.players, query, limit)
    }

    pub fn exact_match(&self, query: &str) -> Option<&PlayerStat> {
        exact_match(&self.players, query)
    }

    pub fn top_n(&self, min_rushes: u32, n: usize) -> Vec<&PlayerStat> {
        top_n(&self.players, min_rushes, n)
    }
}
