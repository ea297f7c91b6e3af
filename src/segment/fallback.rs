//! Text-only segmentation used when coqtop cannot echo offsets.
//!
//! This strategy never talks to coqtop. It recognises proof openers and
//! closers by their leading keyword, so it is less precise than the
//! transcript strategy, but it honours the same contract: the chunks it
//! returns contain every statement exactly once, in order.

use super::DefinitionChunk;

/// Vernaculars that always start a proof.
const PROOF_OPENERS: &[&str] = &[
    "Lemma",
    "Theorem",
    "Remark",
    "Fact",
    "Corollary",
    "Proposition",
    "Property",
    "Example",
    "Goal",
];

/// Vernaculars that start a proof only when no body is given inline.
const BODY_OPTIONAL: &[&str] = &[
    "Definition",
    "Fixpoint",
    "CoFixpoint",
    "Instance",
    "Let",
];

/// Vernaculars that end a proof.
const PROOF_CLOSERS: &[&str] = &["Qed", "Defined", "Admitted", "Save", "Abort"];

/// Vernaculars that define a name in one statement.
const DECLARATIONS: &[&str] = &[
    "Definition",
    "Fixpoint",
    "CoFixpoint",
    "Instance",
    "Let",
    "Inductive",
    "CoInductive",
    "Variant",
    "Record",
    "Structure",
    "Class",
    "Axiom",
    "Axioms",
    "Parameter",
    "Parameters",
    "Hypothesis",
    "Variable",
    "Conjecture",
    "Ltac",
];

/// Words that may precede the vernacular keyword.
const MODIFIERS: &[&str] = &[
    "Local",
    "Global",
    "Polymorphic",
    "Monomorphic",
    "Program",
    "Private",
    "Export",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum StatementKind {
    Opens(Option<String>),
    Closes { keeps_name: bool },
    Declares(Option<String>),
    Other,
}

#[derive(Debug, Default)]
struct OpenProof {
    statements: Vec<String>,
    defined_terms: Vec<String>,
    names: Vec<Option<String>>,
}

/// Keyword-driven segmenter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSegmenter;

impl FallbackSegmenter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Group `statements` into chunks.
    #[must_use]
    pub fn segment(&self, statements: &[String]) -> Vec<DefinitionChunk> {
        let mut output = Vec::new();
        let mut open: Option<OpenProof> = None;

        for statement in statements {
            let kind = classify(statement);

            if let Some(proof) = open.as_mut() {
                proof.statements.push(statement.clone());
                match kind {
                    StatementKind::Opens(name) => proof.names.push(name),
                    StatementKind::Closes { keeps_name } => {
                        if let Some(Some(name)) = proof.names.pop() {
                            if keeps_name {
                                proof.defined_terms.push(name);
                            }
                        }
                    }
                    StatementKind::Declares(Some(name)) => proof.defined_terms.push(name),
                    StatementKind::Declares(None) | StatementKind::Other => {}
                }

                if proof.names.is_empty() {
                    if let Some(done) = open.take() {
                        output.push(DefinitionChunk::new(done.statements, done.defined_terms));
                    }
                }
                continue;
            }

            match kind {
                StatementKind::Opens(name) => {
                    open = Some(OpenProof {
                        statements: vec![statement.clone()],
                        defined_terms: Vec::new(),
                        names: vec![name],
                    });
                }
                StatementKind::Declares(name) => {
                    output.push(DefinitionChunk::single(
                        statement.clone(),
                        name.into_iter().collect(),
                    ));
                }
                StatementKind::Closes { .. } | StatementKind::Other => {
                    output.push(DefinitionChunk::single(statement.clone(), Vec::new()));
                }
            }
        }

        if let Some(proof) = open {
            tracing::debug!(
                statements = proof.statements.len(),
                "Proof still open at end of input"
            );
            output.push(DefinitionChunk::new(proof.statements, proof.defined_terms));
        }

        output
    }
}

fn classify(statement: &str) -> StatementKind {
    let text = statement.trim();
    let mut words = text
        .split_whitespace()
        .skip_while(|w| w.starts_with("#[") || MODIFIERS.contains(w));
    let keyword = words.next().map_or("", trim_keyword);
    let name = words.next().and_then(identifier);

    let last_sentence = text
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .unwrap_or_default();
    let closer = last_sentence
        .split_whitespace()
        .next()
        .map(trim_keyword)
        .filter(|w| PROOF_CLOSERS.contains(w));

    let opens = PROOF_OPENERS.contains(&keyword)
        || (BODY_OPTIONAL.contains(&keyword) && !text.contains(":="));
    let name = if keyword == "Goal" { None } else { name };

    match (opens, closer) {
        (true, None) => StatementKind::Opens(name),
        (true, Some("Abort")) => StatementKind::Other,
        (true, Some(_)) => StatementKind::Declares(name),
        (false, Some(closer)) => StatementKind::Closes {
            keeps_name: closer != "Abort",
        },
        (false, None) if DECLARATIONS.contains(&keyword) => StatementKind::Declares(name),
        (false, None) => StatementKind::Other,
    }
}

fn trim_keyword(word: &str) -> &str {
    word.trim_end_matches('.')
}

fn identifier(word: &str) -> Option<String> {
    let name: String = word
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '\'')
        .collect();
    (!name.is_empty()).then_some(name)
}
