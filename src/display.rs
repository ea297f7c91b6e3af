//! Colored CLI display utilities for split results.
//!
//! This module provides functions for printing colored, formatted output
//! to the terminal for the `split` and `probe` commands.

use std::io::{self, Write};
use std::path::Path;

use owo_colors::OwoColorize;

use crate::coqtop::Capabilities;
use crate::segment::DefinitionChunk;
use crate::splitter::{SplitOutcome, Strategy};

/// Maximum length for truncated display strings.
const DEFAULT_MAX_LEN: usize = 80;

/// Truncate a string to a maximum number of characters, adding ellipsis if
/// truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize, raw_mode: bool) -> String {
    if raw_mode || s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return "...".to_string();
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{kept}...")
}

/// One-line summary of a chunk: its first statement line, plus a count of
/// the rest.
#[must_use]
pub fn summarize_chunk(chunk: &DefinitionChunk, raw_mode: bool) -> String {
    let mut lines = chunk.statement.lines().filter(|l| !l.trim().is_empty());
    let first = lines.next().unwrap_or_default().trim();
    let rest = lines.count();
    let head = truncate(first, DEFAULT_MAX_LEN, raw_mode);
    if rest == 0 {
        head
    } else {
        format!("{head} (+{rest} lines)")
    }
}

/// Print the chunks of a split, one per line, numbered.
pub fn print_outcome(outcome: &SplitOutcome, raw_mode: bool) {
    let strategy = match outcome.strategy {
        Strategy::Transcript => "transcript".green().to_string(),
        Strategy::Fallback => "fallback".yellow().to_string(),
    };
    println!(
        "{} {} chunks via {}",
        "[SPLIT]".blue().bold(),
        outcome.chunks.len(),
        strategy
    );
    for (index, chunk) in outcome.chunks.iter().enumerate() {
        print_chunk(index, chunk, raw_mode);
    }
    let _ = io::stdout().flush();
}

/// Print one chunk with its defined terms.
pub fn print_chunk(index: usize, chunk: &DefinitionChunk, raw_mode: bool) {
    let terms = if chunk.defines_anything() {
        chunk.defined_terms.join(", ").cyan().to_string()
    } else {
        "-".dimmed().to_string()
    };
    println!(
        "{} {} {}",
        format!("{index:>4}").dimmed(),
        terms,
        summarize_chunk(chunk, raw_mode)
    );
}

/// Print the capabilities of a coqtop binary.
pub fn print_capabilities(binary: &Path, capabilities: &Capabilities) {
    let mark = |ok: bool| {
        if ok {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        }
    };
    println!("{} {}", "[PROBE]".magenta().bold(), binary.display());
    println!("  -time accepted:         {}", mark(capabilities.accepts_time));
    println!(
        "  proof terms with -time: {}",
        mark(capabilities.proof_term_works_with_time)
    );
    println!(
        "  transcript strategy:    {}",
        mark(capabilities.supports_transcript())
    );
    let _ = io::stdout().flush();
}
