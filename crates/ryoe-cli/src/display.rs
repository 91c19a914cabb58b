// Text rendering for query results.

use std::fmt::Write as _;

use ryoe_core::session::Ranking;
use ryoe_core::stats::PlayerStat;
use serde::Serialize;

/// Maximum fraction digits shown for averages.
const MAX_FRACTION_DIGITS: usize = 3;

/// Format a number with grouped thousands and at most three fraction
/// digits, trailing zeros trimmed. NaN renders as an em dash.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "\u{2014}".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "\u{221e}" } else { "-\u{221e}" }.to_string();
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, x.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    let negative = x < 0.0 && (int_part != "0" || !frac_part.is_empty());
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One suggestion per line, with the id in parentheses when present.
pub fn render_suggestions(players: &[&PlayerStat]) -> String {
    let mut out = String::new();
    for p in players {
        if p.id.is_empty() {
            let _ = writeln!(out, "{}", p.name);
        } else {
            let _ = writeln!(out, "{} ({})", p.name, p.id);
        }
    }
    out
}

/// Detail card for a single player.
pub fn render_card(player: &PlayerStat) -> String {
    let rows = [
        ("Player", player.name.clone()),
        ("Rushes", player.rushes.to_string()),
        ("Avg Yards Above Expected", format_number(player.avg)),
    ];
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<width$}  {value}");
    }
    out
}

/// Ranking table. Empty rankings render as an empty string.
pub fn render_ranking(ranking: &Ranking<'_>) -> String {
    if ranking.players.is_empty() {
        return String::new();
    }

    let name_width = ranking
        .players
        .iter()
        .map(|p| p.name.chars().count())
        .chain(std::iter::once("Player".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Top {} by Avg RYOE (min rushes: {})",
        ranking.players.len(),
        ranking.min_rushes
    );
    let _ = writeln!(out, "{:<name_width$}  {:>7}  {:>9}", "Player", "Rushes", "Avg RYOE");
    for p in &ranking.players {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:>7}  {:>9}",
            p.name,
            p.rushes,
            format_number(p.avg)
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Output mode
// ---------------------------------------------------------------------------

/// Human-readable text or JSON for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

#[derive(Serialize)]
struct RankingJson<'a> {
    min_rushes: u32,
    players: &'a [&'a PlayerStat],
}

fn json_line<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut s = serde_json::to_string(value)?;
    s.push('\n');
    Ok(s)
}

pub fn suggestions(mode: OutputMode, players: &[&PlayerStat]) -> serde_json::Result<String> {
    match mode {
        OutputMode::Text => Ok(render_suggestions(players)),
        OutputMode::Json => json_line(players),
    }
}

/// A missing player renders as a short notice in text mode and `null` in JSON.
pub fn player(mode: OutputMode, query: &str, player: Option<&PlayerStat>) -> serde_json::Result<String> {
    match (mode, player) {
        (OutputMode::Text, Some(p)) => Ok(render_card(p)),
        (OutputMode::Text, None) => Ok(format!("No player named \"{}\"\n", query.trim())),
        (OutputMode::Json, p) => json_line(&p),
    }
}

pub fn ranking(mode: OutputMode, ranking: &Ranking<'_>) -> serde_json::Result<String> {
    match mode {
        OutputMode::Text => Ok(render_ranking(ranking)),
        OutputMode::Json => json_line(&RankingJson {
            min_rushes: ranking.min_rushes,
            players: &ranking.players,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, name: &str, rushes: u32, avg: f64) -> PlayerStat {
        PlayerStat {
            id: id.into(),
            name: name.into(),
            rushes,
            avg,
        }
    }

    #[test]
    fn numbers_trim_and_group() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.123456), "0.123");
        assert_eq!(format_number(2.0006), "2.001");
        assert_eq!(format_number(-0.25), "-0.25");
        assert_eq!(format_number(1234567.891), "1,234,567.891");
        assert_eq!(format_number(1000.0), "1,000");
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn nan_is_dash() {
        assert_eq!(format_number(f64::NAN), "\u{2014}");
    }

    #[test]
    fn suggestions_show_ids_when_present() {
        let a = player("00-1", "Derrick Henry", 1, 0.0);
        let b = player("", "Nick Chubb", 1, 0.0);
        assert_eq!(
            render_suggestions(&[&a, &b]),
            "Derrick Henry (00-1)\nNick Chubb\n"
        );
    }

    #[test]
    fn card_lists_fields() {
        let card = render_card(&player("", "Nick Chubb", 302, 1.05));
        assert!(card.contains("Nick Chubb"));
        assert!(card.contains("302"));
        assert!(card.contains("1.05"));
    }

    #[test]
    fn ranking_header_shows_threshold() {
        let a = player("", "Nick Chubb", 302, 1.05);
        let ranking = Ranking {
            min_rushes: 10,
            players: vec![&a],
        };
        let table = render_ranking(&ranking);
        assert!(table.starts_with("Top 1 by Avg RYOE (min rushes: 10)\n"));
        assert!(table.contains("Nick Chubb"));
    }

    #[test]
    fn json_ranking_shape() {
        let a = player("7", "Nick Chubb", 302, 1.05);
        let r = Ranking {
            min_rushes: 10,
            players: vec![&a],
        };
        let out = ranking(OutputMode::Json, &r).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["min_rushes"], 10);
        assert_eq!(value["players"][0]["name"], "Nick Chubb");
    }

    #[test]
    fn json_missing_player_is_null() {
        assert_eq!(super::player(OutputMode::Json, "x", None).unwrap(), "null\n");
    }

    #[test]
    fn text_missing_player_notice() {
        assert_eq!(
            super::player(OutputMode::Text, " Nobody ", None).unwrap(),
            "No player named \"Nobody\"\n"
        );
    }

    #[test]
    fn empty_ranking_renders_nothing() {
        let ranking = Ranking {
            min_rushes: 500,
            players: vec![],
        };
        assert_eq!(render_ranking(&ranking), "");
    }
}
