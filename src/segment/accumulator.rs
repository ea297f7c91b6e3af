//! The segmentation state machine.
//!
//! [`SegmentAccumulator`] consumes transcript events in order and groups the
//! statements they acknowledge into [`DefinitionChunk`]s. A partial record
//! is kept for every open definition stack; a record is emitted when its
//! stack closes back to the root, or folded into the enclosing record when
//! it closes inside another definition.

use std::collections::HashMap;

use super::{DefinitionChunk, DefinitionStack, TranscriptEvent};

/// Statements and terms gathered for a stack that is still open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub statements: Vec<String>,
    pub defined_terms: Vec<String>,
}

impl PartialRecord {
    fn push(&mut self, statement: String, terms: Vec<String>) {
        self.statements.push(statement);
        self.defined_terms.extend(terms);
    }

    fn into_chunk(self) -> DefinitionChunk {
        DefinitionChunk::new(self.statements, self.defined_terms)
    }
}

/// Segments statements into definition chunks from coqtop's transcript.
#[derive(Debug)]
pub struct SegmentAccumulator<'a> {
    input: &'a [u8],
    records: HashMap<DefinitionStack, PartialRecord>,
    last_stack: DefinitionStack,
    last_char_end: usize,
    output: Vec<DefinitionChunk>,
}

impl<'a> SegmentAccumulator<'a> {
    /// Create an accumulator over the joined input that was sent to coqtop.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            records: HashMap::new(),
            last_stack: DefinitionStack::root(),
            last_char_end: 0,
            output: Vec::new(),
        }
    }

    /// Offset just past the last accepted statement.
    #[must_use]
    pub fn last_char_end(&self) -> usize {
        self.last_char_end
    }

    /// Stack that was open after the last accepted statement.
    #[must_use]
    pub fn last_stack(&self) -> &DefinitionStack {
        &self.last_stack
    }

    /// Number of stacks with a pending record.
    #[must_use]
    pub fn open_records(&self) -> usize {
        self.records.len()
    }

    /// Chunks finalized so far.
    #[must_use]
    pub fn chunks(&self) -> &[DefinitionChunk] {
        &self.output
    }

    /// Consume one event.
    ///
    /// Events whose end offset does not move past the previous one are
    /// ignored; coqtop sometimes reports an earlier statement again.
    pub fn feed(&mut self, event: &TranscriptEvent) {
        if event.char_end <= self.last_char_end {
            tracing::debug!(
                char_end = event.char_end,
                last_char_end = self.last_char_end,
                "Offset did not advance, ignoring event"
            );
            return;
        }

        let statement = self.slice(self.last_char_end, event.char_end);
        let terms = event.defined_terms();
        let current = &event.open_names;
        let diff = self.last_stack.diff(current);

        if !current.is_root() {
            self.records.entry(current.clone()).or_default();
        }

        tracing::debug!(
            statement = %statement,
            char_start = event.char_start,
            char_end = event.char_end,
            removed = ?diff.removed,
            added = ?diff.added,
            terms = ?terms,
            last_stack = %self.last_stack,
            current = %current,
            "Dispatching statement"
        );

        if !diff.removed.is_empty() {
            let mut closing = self.records.remove(&self.last_stack).unwrap_or_default();
            closing.push(statement, terms);
            if current.is_root() {
                self.output.push(closing.into_chunk());
            } else {
                self.collapse_into_parent(closing, current);
            }
        } else if !terms.is_empty() {
            if current.is_root() {
                self.output.push(DefinitionChunk::single(statement, terms));
            } else {
                self.record_mut(current).push(statement, terms);
            }
        } else if !diff.added.is_empty() {
            self.record_mut(current).statements.push(statement);
        } else if current.is_root() {
            self.output.push(DefinitionChunk::single(statement, Vec::new()));
        } else {
            self.record_mut(current).statements.push(statement);
        }

        self.last_stack = current.clone();
        self.last_char_end = event.char_end;
    }

    /// Fold the record of a closed nested definition into the record of the
    /// definition that encloses it. Nesting is flattened: the child does not
    /// become a chunk of its own.
    pub fn collapse_into_parent(&mut self, child: PartialRecord, parent: &DefinitionStack) {
        let target = self.record_mut(parent);
        target.statements.extend(child.statements);
        target.defined_terms.extend(child.defined_terms);
    }

    /// Close any open definition and emit the unconsumed tail of `body`.
    ///
    /// Only the definition open in the last prompt is emitted. Records of
    /// other definitions still open at that point are dropped with a
    /// warning, and their statements do not appear in the output, so the
    /// chunks no longer cover the whole input.
    ///
    /// `body` is the statement text without the blank line that terminates
    /// the joined input.
    #[must_use]
    pub fn finish(mut self, body: &str) -> Vec<DefinitionChunk> {
        if !self.last_stack.is_root() {
            let last = std::mem::take(&mut self.last_stack);
            let record = self.records.remove(&last).unwrap_or_default();
            self.output.push(record.into_chunk());
        }

        if !self.records.is_empty() {
            tracing::warn!(
                count = self.records.len(),
                "Definitions left open at end of transcript"
            );
        }

        let body = body.as_bytes();
        if self.last_char_end < body.len() {
            let tail = strip_newlines(&String::from_utf8_lossy(&body[self.last_char_end..]))
                .to_string();
            tracing::debug!(
                from = self.last_char_end,
                to = body.len(),
                tail = %tail,
                "Appending unconsumed tail"
            );
            self.output.push(DefinitionChunk::single(tail, Vec::new()));
        }

        self.output
    }

    fn record_mut(&mut self, stack: &DefinitionStack) -> &mut PartialRecord {
        self.records.entry(stack.clone()).or_default()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.input.len());
        let start = start.min(end);
        strip_newlines(&String::from_utf8_lossy(&self.input[start..end])).to_string()
    }
}

/// Remove at most one leading and one trailing newline.
#[must_use]
pub fn strip_newlines(text: &str) -> &str {
    let text = text.strip_prefix('\n').unwrap_or(text);
    text.strip_suffix('\n').unwrap_or(text)
}

/// Join statements the way they are sent to coqtop: newline separated, with a
/// terminating blank line.
#[must_use]
pub fn join_statements(statements: &[String]) -> String {
    let mut joined = statements.join("\n");
    joined.push_str("\n\n");
    joined
}

/// Segment `statements` using the transcript coqtop produced for them.
///
/// Never fails: malformed or stale events are skipped and any text coqtop
/// did not acknowledge becomes a final chunk.
#[must_use]
pub fn segment(statements: &[String], transcript: &str) -> Vec<DefinitionChunk> {
    let joined = join_statements(statements);
    let body = statements.join("\n");

    let mut accumulator = SegmentAccumulator::new(&joined);
    for event in super::parse_transcript(transcript) {
        accumulator.feed(&event);
    }
    accumulator.finish(&body)
}
