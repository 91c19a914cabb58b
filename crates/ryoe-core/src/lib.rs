// Library root: CSV decoding, player aggregation and ranking, dataset
// loading, and the SQLite import used by the `ryoe` command-line tool.

pub mod config;
pub mod decode;
pub mod import;
pub mod load;
pub mod session;
pub mod stats;
