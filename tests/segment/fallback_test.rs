//! Tests for keyword-driven segmentation.

use coq_defsplit::segment::{flatten_statements, join_definitions, FallbackSegmenter};

use super::statements;

#[test]
fn fallback_keeps_every_statement_in_order() {
    let input = statements(&[
        "Require Import List.",
        "Definition two := 2.",
        "Theorem t : two = 2.",
        "Proof.",
        "reflexivity.",
        "Qed.",
        "Print t.",
        "Fixpoint f (n : nat) : nat := n.",
    ]);

    let chunks = FallbackSegmenter::new().segment(&input);

    assert_eq!(flatten_statements(&chunks), input);
    assert_eq!(join_definitions(&chunks), input.join("\n"));
}

#[test]
fn fallback_groups_proof_with_its_lemma() {
    let input = statements(&[
        "Lemma a : True.",
        "Proof.",
        "exact I.",
        "Qed.",
        "Lemma b : True.",
        "Proof. exact I. Defined.",
    ]);

    let chunks = FallbackSegmenter::new().segment(&input);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].defined_terms, ["a"]);
    assert_eq!(chunks[1].defined_terms, ["b"]);
    assert_eq!(chunks[1].statements.len(), 2);
}

#[test]
fn fallback_treats_interactive_definitions_as_proofs() {
    let input = statements(&[
        "Definition d : nat.",
        "exact 0.",
        "Defined.",
        "Definition e : nat := 1.",
    ]);

    let chunks = FallbackSegmenter::new().segment(&input);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].statements.len(), 3);
    assert_eq!(chunks[0].defined_terms, ["d"]);
    assert_eq!(chunks[1].defined_terms, ["e"]);
}

#[test]
fn fallback_recognises_modifiers_and_attributes() {
    let input = statements(&[
        "#[export] Instance i : Inhabited nat := {| inhabitant := 0 |}.",
        "Local Lemma l : True.",
        "Proof. exact I. Qed.",
    ]);

    let chunks = FallbackSegmenter::new().segment(&input);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].defined_terms, ["i"]);
    assert_eq!(chunks[1].defined_terms, ["l"]);
}

#[test]
fn fallback_of_nothing_is_nothing() {
    assert!(FallbackSegmenter::new().segment(&[]).is_empty());
}
