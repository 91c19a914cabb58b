// Line-oriented interactive loop over a loaded session.
//
// Each input line is one command. A line that is not a known command is
// treated as a search, which makes the loop behave like an autocomplete box.

use std::io::Write;

use anyhow::Result;
use ryoe_core::session::Session;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::display::{self, OutputMode};

const HELP: &str = "\
commands:
  search <text>     players whose name contains <text>
  player <name>     exact (case-insensitive) name lookup
  top [min]         ranking by average, optional minimum rushes
  help              this message
  quit              leave
anything else is searched as a name
";

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Search(&'a str),
    Player(&'a str),
    Top(Option<&'a str>),
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head.to_ascii_lowercase().as_str() {
        "search" | "s" => Command::Search(rest),
        "player" | "p" => Command::Player(rest),
        "top" | "t" => Command::Top((!rest.is_empty()).then_some(rest)),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Search(line),
    }
}

/// Read commands from `input` until EOF or `quit`, writing results to `out`.
pub async fn run<R, W>(session: &Session, input: R, out: &mut W, mode: OutputMode) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    write!(out, "{}", display::ranking(mode, &session.top_n_default())?)?;
    out.flush()?;

    while let Some(line) = lines.next_line().await? {
        let text = match parse_command(&line) {
            Command::Search(q) => display::suggestions(mode, &session.search(q))?,
            Command::Player(q) => display::player(mode, q, session.exact_match(q))?,
            Command::Top(Some(min)) => display::ranking(mode, &session.top_n(min))?,
            Command::Top(None) => display::ranking(mode, &session.top_n_default())?,
            Command::Help => HELP.to_string(),
            Command::Quit => break,
            Command::Empty => continue,
        };
        write!(out, "{text}")?;
        out.flush()?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
