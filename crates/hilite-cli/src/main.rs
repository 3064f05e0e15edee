use anyhow::{Context, Result};
use clap::Parser;
use hilite::{DomSnapshot, HighlightConfig, Highlighter, MainContentMembers, ScoredCandidate};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

/// Segment an HTML document and print the sentences selected for
/// highlighting at the requested tier.
#[derive(Parser, Debug)]
#[command(name = "hilite")]
#[command(about = "Pick highlight-worthy sentences from an HTML document", long_about = None)]
struct Cli {
    /// HTML file to read; stdin when omitted.
    file: Option<PathBuf>,

    /// Highlight tier to select (1 is the most selective). 0 prints nothing.
    #[arg(long, default_value_t = 1)]
    tier: u32,

    /// Number of highlight states the renderer supports, including "off".
    #[arg(long, default_value_t = 4)]
    tiers: u32,

    /// Emit one JSON object per pick instead of plain text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Debug: select every candidate sentence at importance 1.
    #[arg(long, default_value_t = false)]
    highlight_all: bool,

    /// Keep only sentences inside main content. Without a real extractor
    /// every node counts as main content, so this is a no-op unless the
    /// snapshot says otherwise; kept for parity with embedded use.
    #[arg(long, default_value_t = false)]
    main_only: bool,
}

#[derive(Serialize)]
struct PickRow<'a> {
    index: usize,
    importance: Option<u32>,
    score: f64,
    text: &'a str,
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn print_pick(pick: &ScoredCandidate, json: bool) -> Result<()> {
    if json {
        let row = PickRow {
            index: pick.index,
            importance: pick.importance,
            score: pick.score,
            text: pick.candidate.text(),
        };
        println!("{}", serde_json::to_string(&row)?);
    } else {
        let importance = pick.importance.unwrap_or(0);
        println!("[{}] {}", importance, pick.candidate.text());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let html = read_input(cli.file.as_ref())?;

    let config = HighlightConfig {
        total_states: cli.tiers,
        highlight_all: cli.highlight_all,
        main_content_only: cli.main_only,
        ..HighlightConfig::default()
    };
    let highlighter = Highlighter::new(config);

    let snapshot = DomSnapshot::parse(&html);
    let main = MainContentMembers::everything(&snapshot);
    let selection = highlighter
        .select(&snapshot, &snapshot, &main, cli.tier)
        .context("selecting highlights")?;

    for pick in &selection.picks {
        print_pick(pick, cli.json)?;
    }
    Ok(())
}
