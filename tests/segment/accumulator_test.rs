//! Tests for transcript-driven segmentation.

use coq_defsplit::segment::{
    flatten_statements, join_definitions, parse_transcript, segment, DefinitionStack,
    SegmentAccumulator,
};

use super::{run, spans, statements, step, transcript};

fn assert_covers(chunks: &[coq_defsplit::segment::DefinitionChunk], input: &[String]) {
    assert_eq!(join_definitions(chunks), input.join("\n"));
}

#[test]
fn definition_and_lemma_are_separate_chunks() {
    let input = statements(&[
        "Definition x := 1.",
        "Lemma foo : True.",
        "Proof.",
        "exact I.",
        "Qed.",
    ]);
    let text = transcript(
        &input,
        &[
            step("x is defined\n", &[]),
            step("1 subgoal\n", &["foo"]),
            step("", &["foo"]),
            step("No more subgoals.\n", &["foo"]),
            step("foo is defined\n", &[]),
        ],
    );

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].statement, "Definition x := 1.");
    assert_eq!(chunks[0].defined_terms, ["x"]);
    assert_eq!(
        chunks[1].statements,
        ["Lemma foo : True.", "Proof.", "exact I.", "Qed."]
    );
    assert_eq!(chunks[1].defined_terms, ["foo"]);
    assert_covers(&chunks, &input);
}

#[test]
fn one_run_spanning_a_whole_lemma_is_one_slice() {
    let input = statements(&["Lemma a : True.", "Proof. exact I. Qed."]);
    let text = run(0, 36, "a is defined\n", &[]);

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].defined_terms, ["a"]);
    assert_eq!(chunks[0].statement, input.join("\n"));
    // The run is not split back into the statements it covers.
    assert_eq!(chunks[0].statements, ["Lemma a : True.\nProof. exact I. Qed."]);
    assert_covers(&chunks, &input);
}

#[test]
fn root_statements_without_terms_stand_alone() {
    let input = statements(&["Require Import Arith.", "Check nat.", "Axiom ax : False."]);
    let text = transcript(
        &input,
        &[
            step("", &[]),
            step("nat\n     : Set\n", &[]),
            step("ax is assumed\n", &[]),
        ],
    );

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].defined_terms.is_empty());
    assert!(chunks[1].defined_terms.is_empty());
    assert_eq!(chunks[2].defined_terms, ["ax"]);
    assert_eq!(flatten_statements(&chunks), input);
}

#[test]
fn all_reported_terms_are_kept_in_order() {
    let input = statements(&["Inductive t := A | B."]);
    let text = transcript(
        &input,
        &[step(
            "t is defined\nt_rect is defined\nt_ind is defined\nt_rec is defined\n",
            &[],
        )],
    );

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].defined_terms, ["t", "t_rect", "t_ind", "t_rec"]);
}

#[test]
fn nested_definitions_flatten_into_outer_chunk() {
    let input = statements(&[
        "Lemma Foo : True.",
        "Lemma Bar : True.",
        "exact I.",
        "Qed.",
        "exact Bar.",
        "Qed.",
    ]);
    let text = transcript(
        &input,
        &[
            step("", &["Foo"]),
            step("", &["Bar", "Foo"]),
            step("", &["Bar", "Foo"]),
            step("Bar is defined\n", &["Foo"]),
            step("", &["Foo"]),
            step("Foo is defined\n", &[]),
        ],
    );

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].statements, input);
    assert_eq!(chunks[0].defined_terms, ["Bar", "Foo"]);
    assert_covers(&chunks, &input);
}

#[test]
fn anonymous_branches_are_diffed_by_depth() {
    let input = statements(&[
        "Goal True /\\ True.",
        "Goal False -> False.",
        "intro H; exact H.",
        "Qed.",
        "split; exact I.",
        "Qed.",
    ]);
    let text = transcript(
        &input,
        &[
            step("", &["branch"]),
            step("", &["branch", "branch"]),
            step("", &["branch", "branch"]),
            step("Unnamed_thm0 is defined\n", &["branch"]),
            step("", &["branch"]),
            step("Unnamed_thm is defined\n", &[]),
        ],
    );

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].defined_terms, ["Unnamed_thm0", "Unnamed_thm"]);
    assert_covers(&chunks, &input);
}

#[test]
fn unacknowledged_statements_become_the_tail() {
    let input = statements(&["Definition a := 1.", "Definition b := 2.", "Definition c :="]);
    let text = transcript(
        &input[..2],
        &[step("a is defined\n", &[]), step("b is defined\n", &[])],
    );

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[2].statement, "Definition c :=");
    assert!(chunks[2].defined_terms.is_empty());
    assert_covers(&chunks, &input);
}

#[test]
fn definition_left_open_is_emitted_before_tail() {
    let input = statements(&["Lemma l : True.", "Proof.", "idtac"]);
    let text = transcript(&input[..2], &[step("", &["l"]), step("", &["l"])]);

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].statements, ["Lemma l : True.", "Proof."]);
    assert_eq!(chunks[1].statement, "idtac");
    assert_covers(&chunks, &input);
}

#[test]
fn outer_definition_left_open_is_dropped() {
    let input = statements(&["Lemma Foo : True.", "Lemma Bar : True."]);
    let text = transcript(&input, &[step("", &["Foo"]), step("", &["Bar", "Foo"])]);

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].statements, ["Lemma Bar : True."]);
    assert_eq!(join_definitions(&chunks), "Lemma Bar : True.");
}

#[test]
fn repeated_events_do_not_duplicate_text() {
    let input = statements(&["Definition a := 1.", "Definition b := 2."]);
    let spans = spans(&input);
    let clean = transcript(
        &input,
        &[step("a is defined\n", &[]), step("b is defined\n", &[])],
    );
    let noisy = [
        run(spans[0].0, spans[0].1, "a is defined\n", &[]),
        run(spans[0].0, spans[0].1, "a is defined\n", &[]),
        run(spans[1].0, spans[1].1, "b is defined\n", &[]),
        run(spans[0].0, spans[0].1, "a is defined\n", &[]),
    ]
    .concat();

    assert_eq!(segment(&input, &noisy), segment(&input, &clean));
}

#[test]
fn offsets_only_move_forward() {
    let input = statements(&["Check nat.", "Check bool.", "Check unit."]);
    let spans = spans(&input);
    let text = [
        run(spans[0].0, spans[0].1, "", &[]),
        run(spans[1].0, spans[1].1, "", &[]),
        run(spans[0].0, spans[0].1, "", &[]),
        run(spans[2].0, spans[2].1, "", &[]),
    ]
    .concat();
    let joined = coq_defsplit::segment::join_statements(&input);

    let mut accumulator = SegmentAccumulator::new(&joined);
    let mut seen = Vec::new();
    for event in parse_transcript(&text) {
        accumulator.feed(&event);
        seen.push(accumulator.last_char_end());
    }

    assert_eq!(seen, [spans[0].1, spans[1].1, spans[1].1, spans[2].1]);
    assert_eq!(accumulator.chunks().len(), 3);
}

#[test]
fn malformed_run_is_absorbed_by_next_statement() {
    let input = statements(&["Check nat.", "Check bool."]);
    let spans = spans(&input);
    let text = format!(
        "Chars {} - {} [stmt] 0. secs (0.u,0.s)\nnat : Set\n{}",
        spans[0].0,
        spans[0].1,
        run(spans[1].0, spans[1].1, "", &[])
    );

    let chunks = segment(&input, &text);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].statement, "Check nat.\nCheck bool.");
    assert_covers(&chunks, &input);
}

#[test]
fn open_record_tracks_current_stack() {
    let input = statements(&["Lemma l : True.", "Proof."]);
    let spans = spans(&input);
    let text = run(spans[0].0, spans[0].1, "", &["l"]);
    let joined = coq_defsplit::segment::join_statements(&input);

    let mut accumulator = SegmentAccumulator::new(&joined);
    for event in parse_transcript(&text) {
        accumulator.feed(&event);
    }

    assert_eq!(accumulator.open_records(), 1);
    assert_eq!(
        accumulator.last_stack(),
        &DefinitionStack::from_names(["l"])
    );
    assert!(accumulator.chunks().is_empty());
}
