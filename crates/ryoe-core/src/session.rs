// Session: owns the loaded dataset and answers text-level queries.
//
// This is the boundary the UI adapter talks to. Every method takes raw user
// input and returns borrowed results; nothing here mutates the dataset.

use tracing::debug;

use crate::config::{Config, QueryConfig};
use crate::load::{self, FetchOptions, LoadError, Source};
use crate::stats::{parse_min_rushes, Dataset, PlayerStat};

/// A loaded dataset plus the query limits it is served with.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Dataset,
    limits: QueryConfig,
}

/// A ranking together with the threshold it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking<'a> {
    pub min_rushes: u32,
    pub players: Vec<&'a PlayerStat>,
}

impl Session {
    pub fn new(dataset: Dataset, limits: QueryConfig) -> Self {
        Self { dataset, limits }
    }

    /// Fetch the configured source once and build the session.
    pub async fn load(http: &reqwest::Client, config: &Config) -> Result<Self, LoadError> {
        let source = Source::parse(&config.data.source);
        let options = FetchOptions {
            no_store: config.data.no_store,
        };
        let dataset = load::load_dataset(http, &source, &config.columns, options).await?;
        Ok(Self::new(dataset, config.query.clone()))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Autocomplete suggestions for `text`.
    pub fn search(&self, text: &str) -> Vec<&PlayerStat> {
        let hits = self.dataset.search(text, self.limits.suggestion_limit);
        debug!(query = text, hits = hits.len(), "search");
        hits
    }

    /// The player whose name is exactly `text`, ignoring case.
    pub fn exact_match(&self, text: &str) -> Option<&PlayerStat> {
        let hit = self.dataset.exact_match(text);
        debug!(query = text, found = hit.is_some(), "exact_match");
        hit
    }

    /// Ranking for a free-form threshold string.
    pub fn top_n(&self, threshold: &str) -> Ranking<'_> {
        self.top_n_with(parse_min_rushes(threshold), self.limits.top_n)
    }

    /// Ranking at the configured default threshold.
    pub fn top_n_default(&self) -> Ranking<'_> {
        self.top_n_with(self.limits.default_min_rushes, self.limits.top_n)
    }

    /// Ranking for an already-parsed threshold and explicit length.
    pub fn top_n_with(&self, min_rushes: u32, n: usize) -> Ranking<'_> {
        let players = self.dataset.top_n(min_rushes, n);
        debug!(min_rushes, n, returned = players.len(), "top_n");
        Ranking {
            min_rushes,
            players,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
