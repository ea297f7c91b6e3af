//! Parser for the transcript `coqtop -emacs -time` echoes back.
//!
//! For every statement it acknowledges, coqtop prints a timing line
//!
//! ```text
//! Chars 0 - 15 [Lemma~a~:~True.] 0. secs (0.u,0.s)
//! ```
//!
//! followed by whatever the statement produced and an emacs-mode prompt
//! block such as `<prompt>a < 2 |a| 0 < </prompt>`. The prompt carries the
//! stack of definitions open after the statement.

use std::sync::LazyLock;

use regex::Regex;

use super::DefinitionStack;

static RUN_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Chars\s*([0-9]+)\s*-\s*([0-9]+)\s*\S+\s*").expect("run header pattern is valid")
});

static RUN_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Chars\s*[0-9]+\s*-\s*[0-9]+").expect("run boundary pattern is valid")
});

static PROMPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\A(.*?)<prompt>([^<]*?)\s*<\s*([0-9]+)\s*([^<]*?)\s*([0-9]+)\s*<\s*([^<]*?)</prompt>",
    )
    .expect("prompt block pattern is valid")
});

static DEFINED_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\S+) is (?:defined|assumed)$").expect("defined term pattern is valid")
});

/// One statement acknowledged by coqtop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEvent {
    /// Byte offset where the statement starts in the joined input.
    pub char_start: usize,
    /// Byte offset just past the statement in the joined input.
    pub char_end: usize,
    /// Output printed before the prompt block.
    pub response_text: String,
    /// Leading token of the prompt (`Coq` at top level, else the goal name).
    pub prompt_name: String,
    /// Definitions open after the statement.
    pub open_names: DefinitionStack,
}

impl TranscriptEvent {
    /// Identifiers the response reports as defined or assumed, in order.
    #[must_use]
    pub fn defined_terms(&self) -> Vec<String> {
        defined_terms(&self.response_text)
    }
}

/// Find every `<ident> is defined` / `<ident> is assumed` line in `text`.
#[must_use]
pub fn defined_terms(text: &str) -> Vec<String> {
    DEFINED_TERM
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Returns true if `text` holds at least one `Chars <n> - <m>` marker.
#[must_use]
pub fn has_char_runs(text: &str) -> bool {
    RUN_BOUNDARY.is_match(text)
}

/// Parse a full transcript into events, in order.
///
/// Runs whose body has no prompt block are logged and dropped.
#[must_use]
pub fn parse_transcript(text: &str) -> Vec<TranscriptEvent> {
    let mut events = Vec::new();
    let mut pos = 0;

    while let Some(caps) = RUN_HEADER.captures_at(text, pos) {
        let (Some(header), Some(start), Some(end)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };

        let body_start = header.end();
        let body_end = RUN_BOUNDARY
            .find_at(text, body_start)
            .map_or(text.len(), |m| m.start());
        pos = body_end;

        let (Ok(char_start), Ok(char_end)) =
            (start.as_str().parse::<usize>(), end.as_str().parse::<usize>())
        else {
            tracing::warn!(header = header.as_str(), "Offsets out of range, skipping run");
            continue;
        };

        let body = &text[body_start..body_end];
        match parse_prompt_block(char_start, char_end, body) {
            Some(event) => events.push(event),
            None => {
                tracing::warn!(
                    char_start,
                    char_end,
                    response = body,
                    "Could not find prompt block, dropping statement"
                );
            }
        }
    }

    tracing::debug!(count = events.len(), "Parsed transcript events");
    events
}

fn parse_prompt_block(char_start: usize, char_end: usize, body: &str) -> Option<TranscriptEvent> {
    let caps = PROMPT_BLOCK.captures(body)?;

    Some(TranscriptEvent {
        char_start,
        char_end,
        response_text: caps[1].to_string(),
        prompt_name: caps[2].trim().to_string(),
        open_names: DefinitionStack::parse(&caps[4]),
    })
}
