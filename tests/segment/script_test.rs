//! Tests for splitting `.v` sources into statements.

use coq_defsplit::segment::split_statements;

#[test]
fn split_multi_line_statements() {
    let source = "Lemma a :\n  forall n : nat,\n  n = n.\nProof.\n  intro n. reflexivity.\nQed.\n";

    let statements = split_statements(source);

    assert_eq!(
        statements,
        [
            "Lemma a :\n  forall n : nat,\n  n = n.",
            "Proof.",
            "intro n.",
            "reflexivity.",
            "Qed.",
        ]
    );
}

#[test]
fn split_ignores_dots_in_comments_and_strings() {
    let source = "(* See Foo. Bar. (* nested. *) *)\nDefinition s := \"a. b\".\nCheck s.";

    let statements = split_statements(source);

    assert_eq!(statements.len(), 2);
    assert!(statements[0].ends_with("Definition s := \"a. b\"."));
    assert_eq!(statements[1], "Check s.");
}

#[test]
fn split_keeps_qualified_names() {
    let source = "Check Nat.add.\nCheck List.map.";

    assert_eq!(split_statements(source), ["Check Nat.add.", "Check List.map."]);
}

#[test]
fn split_empty_source() {
    assert!(split_statements("").is_empty());
    assert!(split_statements("  \n\t").is_empty());
}
