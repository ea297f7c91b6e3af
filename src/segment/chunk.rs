//! Definition chunks, the output unit of every segmentation strategy.

use serde::{Deserialize, Serialize};

/// One completed top-level definition or standalone statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionChunk {
    /// Statements making up the chunk, in script order.
    pub statements: Vec<String>,
    /// The statements joined with newlines.
    pub statement: String,
    /// Identifiers reported as defined or assumed, in order. May repeat.
    pub defined_terms: Vec<String>,
}

impl DefinitionChunk {
    /// Build a chunk from its statements and defined terms.
    #[must_use]
    pub fn new(statements: Vec<String>, defined_terms: Vec<String>) -> Self {
        let statement = statements.join("\n");
        Self {
            statements,
            statement,
            defined_terms,
        }
    }

    /// A chunk made of a single statement.
    #[must_use]
    pub fn single(statement: impl Into<String>, defined_terms: Vec<String>) -> Self {
        Self::new(vec![statement.into()], defined_terms)
    }

    /// Returns true if the chunk defines at least one term.
    #[must_use]
    pub fn defines_anything(&self) -> bool {
        !self.defined_terms.is_empty()
    }
}

/// Concatenate the text of all chunks with newlines.
#[must_use]
pub fn join_definitions(chunks: &[DefinitionChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.statement.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Flatten chunks back into their statements, in emission order.
#[must_use]
pub fn flatten_statements(chunks: &[DefinitionChunk]) -> Vec<String> {
    chunks
        .iter()
        .flat_map(|c| c.statements.iter().cloned())
        .collect()
}
