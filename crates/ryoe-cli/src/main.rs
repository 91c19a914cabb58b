// RYOE lookup entry point.
//
// Startup sequence:
// 1. Parse arguments, initialize tracing (stderr)
// 2. Load config
// 3. Load the dataset once and answer the query (or run an import)

mod display;
mod interactive;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ryoe_core::config::{self, Config};
use ryoe_core::import;
use ryoe_core::session::Session;
use ryoe_core::stats::parse_min_rushes;
use tracing::{error, info};

use crate::display::OutputMode;

#[derive(Parser)]
#[command(name = "ryoe")]
#[command(about = "Look up rushing yards over expected by player", long_about = None)]
struct Cli {
    /// Config file (default: config/ryoe.toml under the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// CSV path or http(s) URL, overriding the configured source
    #[arg(long, global = true)]
    source: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Players whose name contains the query
    Search {
        query: String,
    },

    /// Exact (case-insensitive) name lookup
    Player {
        name: String,
    },

    /// Ranking by average yards over expected
    Top {
        /// Minimum rushing attempts; non-numeric input means no minimum
        #[arg(long, allow_hyphen_values = true)]
        min_rushes: Option<String>,

        /// Number of players to list
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Read commands from stdin
    Interactive,

    /// Import a CSV into SQLite with numeric type inference
    Import {
        /// Input CSV file (default: the configured source)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Output SQLite database (default: database.path)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Table to create or replace (default: database.table)
        #[arg(long)]
        table: Option<String>,
    },
}

/// How a successful run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    /// `player` found no exact match.
    NotFound,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::NotFound => ExitCode::from(1),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("warning: logging disabled: {e:#}");
    }

    let mut stdout = std::io::stdout().lock();
    match run(cli, &mut stdout).await {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run<W: Write>(cli: Cli, out: &mut W) -> anyhow::Result<Outcome> {
    // 2. Load config
    let mut config = match &cli.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;
    if let Some(source) = cli.source {
        config.data.source = source;
    }
    info!("data source: {}", config.data.source);

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    // 3. Queries load the dataset once; import works on the raw file
    let outcome = match cli.command {
        Commands::Search { query } => {
            let session = load_session(&config).await?;
            write!(out, "{}", display::suggestions(mode, &session.search(&query))?)?;
            Outcome::Success
        }
        Commands::Player { name } => {
            let session = load_session(&config).await?;
            let hit = session.exact_match(&name);
            write!(out, "{}", display::player(mode, &name, hit)?)?;
            if hit.is_some() {
                Outcome::Success
            } else {
                Outcome::NotFound
            }
        }
        Commands::Top { min_rushes, limit } => {
            let session = load_session(&config).await?;
            let min = min_rushes
                .as_deref()
                .map(parse_min_rushes)
                .unwrap_or(config.query.default_min_rushes);
            let n = limit.unwrap_or(config.query.top_n);
            write!(out, "{}", display::ranking(mode, &session.top_n_with(min, n))?)?;
            Outcome::Success
        }
        Commands::Interactive => {
            let session = load_session(&config).await?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            interactive::run(&session, stdin, &mut *out, mode).await?;
            Outcome::Success
        }
        Commands::Import { csv, db, table } => {
            let csv = csv.unwrap_or_else(|| PathBuf::from(&config.data.source));
            let db = db.unwrap_or_else(|| PathBuf::from(&config.database.path));
            let table = table.unwrap_or_else(|| config.database.table.clone());
            let summary = import::import_csv(&csv, &db, &table).context("import failed")?;
            match mode {
                OutputMode::Text => {
                    writeln!(out, "Imported {} -> {}:{}", csv.display(), db.display(), table)?
                }
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string(&summary)?)?,
            }
            Outcome::Success
        }
    };
    out.flush()?;
    Ok(outcome)
}

/// Fetch and aggregate the configured source. A failure here is final.
async fn load_session(config: &Config) -> anyhow::Result<Session> {
    let http = reqwest_client()?;
    Session::load(&http, config)
        .await
        .context("failed to load dataset")
}

fn reqwest_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("ryoe/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}

/// Initialize tracing to stderr so stdout carries only results.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose {
        "ryoe_core=info,ryoe=info,warn"
    } else {
        "warn"
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    /// Shared fixture, relative to this crate's root.
    const PER_PLAYER: &str = "../ryoe-core/tests/fixtures/per_player.csv";

    /// Scratch dir holding a config whose source does not exist, so every
    /// test that loads data has to go through `--source`.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ryoe_cli_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("ryoe.toml"),
            format!("[data]\nsource = \"{}\"\n", dir.join("missing.csv").display()),
        )
        .unwrap();
        dir
    }

    async fn run_args(dir: &Path, args: &[&str]) -> (anyhow::Result<Outcome>, String) {
        let config = dir.join("ryoe.toml");
        let mut argv = vec!["ryoe", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        let result = run(cli, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    fn table_names(output: &str) -> Vec<String> {
        output
            .lines()
            .skip(2)
            .map(|line| line.split("  ").next().unwrap().trim().to_string())
            .collect()
    }

    #[tokio::test]
    async fn configured_source_is_used_without_override() {
        let dir = scratch("configured_source");
        let (result, out) = run_args(&dir, &["search", "henry"]).await;
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("missing.csv"), "got {err:#}");
        assert!(out.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn source_flag_overrides_config() {
        let dir = scratch("source_override");
        let (result, out) = run_args(&dir, &["--source", PER_PLAYER, "search", "jo"]).await;
        assert_eq!(result.unwrap(), Outcome::Success);
        assert_eq!(
            out,
            "Jonathan Taylor (00-0036223)\nJosh Jacobs (00-0035700)\nAaron Jones (00-0034796)\n"
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn player_found_and_missing() {
        let dir = scratch("player");
        let (result, out) = run_args(&dir, &["--source", PER_PLAYER, "player", "nick chubb"]).await;
        assert_eq!(result.unwrap(), Outcome::Success);
        assert!(out.contains("Nick Chubb"));
        assert!(out.contains("302"));

        let (result, out) = run_args(&dir, &["--source", PER_PLAYER, "player", "Nobody"]).await;
        assert_eq!(result.unwrap(), Outcome::NotFound);
        assert_eq!(out, "No player named \"Nobody\"\n");

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn top_uses_configured_defaults() {
        let dir = scratch("top_default");
        let (result, out) = run_args(&dir, &["--source", PER_PLAYER, "top"]).await;
        assert_eq!(result.unwrap(), Outcome::Success);
        assert!(out.starts_with("Top 10 by Avg RYOE (min rushes: 10)\n"));
        assert!(!out.contains("Mark Ingram"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn top_with_threshold_text_and_limit() {
        let dir = scratch("top_threshold");

        let (_, out) = run_args(
            &dir,
            &["--source", PER_PLAYER, "top", "--min-rushes", "300", "--limit", "2"],
        )
        .await;
        assert!(out.starts_with("Top 2 by Avg RYOE (min rushes: 300)\n"));
        assert_eq!(table_names(&out), vec!["Nick Chubb", "Jonathan Taylor"]);

        for threshold in ["junk", "-5"] {
            let (result, out) = run_args(
                &dir,
                &["--source", PER_PLAYER, "top", "--min-rushes", threshold, "--limit", "3"],
            )
            .await;
            assert_eq!(result.unwrap(), Outcome::Success);
            assert!(out.starts_with("Top 3 by Avg RYOE (min rushes: 0)\n"), "got {out}");
            assert_eq!(
                table_names(&out),
                vec!["Mark Ingram", "Nick Chubb", "Christian McCaffrey"]
            );
        }

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn json_forms() {
        let dir = scratch("json");

        let (_, out) = run_args(&dir, &["--source", PER_PLAYER, "--json", "search", "hill"]).await;
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["name"], "Hill, Taysom");

        let (result, out) = run_args(&dir, &["--source", PER_PLAYER, "--json", "player", "x"]).await;
        assert_eq!(result.unwrap(), Outcome::NotFound);
        assert_eq!(out, "null\n");

        let (_, out) = run_args(
            &dir,
            &["--source", PER_PLAYER, "--json", "top", "--min-rushes", "300", "--limit", "1"],
        )
        .await;
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["min_rushes"], 300);
        assert_eq!(value["players"][0]["name"], "Nick Chubb");
        assert_eq!(value["players"].as_array().unwrap().len(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn import_prints_summary_line() {
        let dir = scratch("import");
        let db = dir.join("out/ryoe.db");
        let (result, out) = run_args(
            &dir,
            &["import", "--csv", PER_PLAYER, "--db", db.to_str().unwrap(), "--table", "rushing"],
        )
        .await;
        assert_eq!(result.unwrap(), Outcome::Success);
        assert_eq!(out, format!("Imported {PER_PLAYER} -> {}:rushing\n", db.display()));
        assert!(db.exists());

        let (_, out) = run_args(
            &dir,
            &["--json", "import", "--csv", PER_PLAYER, "--db", db.to_str().unwrap(), "--table", "rushing"],
        )
        .await;
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["table"], "rushing");
        assert_eq!(value["rows"], 15);

        let _ = fs::remove_dir_all(&dir);
    }
}
