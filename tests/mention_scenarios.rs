//! End-to-end mention scenarios against the in-memory host

use mention_composer::document::{DocumentTree, Inline, MemoryDocument, NodeKind};
use mention_composer::mentions::{
    Candidate, EditorKey, KeyOutcome, MentionEditor, SessionEnd, SessionState, SENTINEL,
};

const Z: &str = "\u{200B}";

fn contacts() -> Vec<Candidate> {
    vec![Candidate::new("u1", "Alice"), Candidate::new("u2", "Bob")]
}

fn editor() -> MentionEditor<MemoryDocument> {
    MentionEditor::new(MemoryDocument::new(), contacts())
}

fn inlines(editor: &MentionEditor<MemoryDocument>) -> Vec<Inline> {
    editor.document().snapshot().remove(0)
}

fn count_mentions(inlines: &[Inline]) -> usize {
    inlines.iter().filter(|inline| inline.is_mention()).count()
}

fn count_sentinels(inlines: &[Inline]) -> usize {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text { text } => text.chars().filter(|c| *c == SENTINEL).count(),
            Inline::Mention { .. } => 0,
        })
        .sum()
}

#[test]
fn test_alice_bob_select_first_match() {
    let mut editor = editor();
    editor.type_str("@A").unwrap();

    let view = editor.view();
    assert!(view.open);
    assert_eq!(view.filtered_candidates, vec![Candidate::new("u1", "Alice")]);

    assert_eq!(editor.press(EditorKey::Enter).unwrap(), KeyOutcome::Consumed);
    assert_eq!(
        inlines(&editor),
        vec![
            Inline::text(Z),
            Inline::mention("u1", "Alice"),
            Inline::text(format!("{Z} ")),
        ]
    );
    assert_eq!(editor.session().state, SessionState::Idle);
    assert_eq!(editor.session().last_outcome, Some(SessionEnd::Committed));
    assert!(!editor.view().open);
}

#[test]
fn test_commit_with_prefix_at_end_of_text() {
    let mut editor = editor();
    editor.type_str("hey @al").unwrap();
    editor.press(EditorKey::Tab).unwrap();

    assert_eq!(
        inlines(&editor),
        vec![
            Inline::text(format!("hey {Z}")),
            Inline::mention("u1", "Alice"),
            Inline::text(format!("{Z} ")),
        ]
    );
    let caret = editor.document().selection().unwrap();
    assert_eq!(caret.offset, 2);
}

#[test]
fn test_highlight_wraps_around() {
    let mut editor = editor();
    editor.type_str("@").unwrap();
    assert_eq!(editor.view().filtered_candidates.len(), 2);

    editor.press(EditorKey::ArrowUp).unwrap();
    assert_eq!(editor.view().highlighted_index, 1);
    editor.press(EditorKey::ArrowDown).unwrap();
    assert_eq!(editor.view().highlighted_index, 0);
    editor.press(EditorKey::ArrowDown).unwrap();
    editor.press(EditorKey::Enter).unwrap();

    assert_eq!(editor.document().plain_text(), "@Bob ");
}

#[test]
fn test_back_to_back_mentions_share_one_separator() {
    let mut editor = editor();
    editor.type_str("@A").unwrap();
    editor.press(EditorKey::Enter).unwrap();
    editor.type_str("@B").unwrap();
    editor.press(EditorKey::Enter).unwrap();

    let nodes = inlines(&editor);
    assert_eq!(
        nodes,
        vec![
            Inline::text(Z),
            Inline::mention("u1", "Alice"),
            Inline::text(format!("{Z} {Z}")),
            Inline::mention("u2", "Bob"),
            Inline::text(format!("{Z} ")),
        ]
    );
}

#[test]
fn test_space_cancels_session() {
    let mut editor = editor();
    editor.type_str("@al").unwrap();
    assert!(editor.view().open);

    editor.type_str(" ").unwrap();
    assert_eq!(editor.session().state, SessionState::Idle);
    assert_eq!(editor.session().last_outcome, Some(SessionEnd::Cancelled));
    assert_eq!(editor.document().plain_text(), "@al ");
}

#[test]
fn test_space_cancels_even_when_nothing_matches() {
    let mut editor = editor();
    editor.type_str("@zz").unwrap();
    assert!(editor.view().filtered_candidates.is_empty());

    editor.type_str(" ").unwrap();
    assert_eq!(editor.session().state, SessionState::Idle);
}

#[test]
fn test_cancel_while_idle_changes_nothing() {
    let mut editor = editor();
    editor.type_str("hello").unwrap();
    let before = editor.session().clone();

    editor.blur().unwrap();
    assert_eq!(editor.press(EditorKey::Escape).unwrap(), KeyOutcome::PassThrough);
    assert_eq!(editor.session(), &before);
}

#[test]
fn test_escape_cancels_and_keeps_text() {
    let mut editor = editor();
    editor.type_str("@bo").unwrap();

    assert_eq!(editor.press(EditorKey::Escape).unwrap(), KeyOutcome::Consumed);
    assert_eq!(editor.session().last_outcome, Some(SessionEnd::Cancelled));
    assert_eq!(editor.document().plain_text(), "@bo");

    // Enter now passes through to the host
    assert_eq!(editor.press(EditorKey::Enter).unwrap(), KeyOutcome::PassThrough);
}

#[test]
fn test_backspace_over_trigger_cancels() {
    let mut editor = editor();
    editor.type_str("x @b").unwrap();

    editor.press(EditorKey::Backspace).unwrap();
    assert!(editor.session().is_open());
    assert_eq!(editor.view().search_text, "");

    editor.press(EditorKey::Backspace).unwrap();
    assert_eq!(editor.session().state, SessionState::Idle);
    assert_eq!(editor.document().plain_text(), "x ");
}

#[test]
fn test_retyping_trigger_restarts_session() {
    let mut editor = editor();
    editor.type_str("@al@").unwrap();

    let view = editor.view();
    assert!(view.open);
    assert_eq!(view.search_text, "");
    assert_eq!(view.filtered_candidates.len(), 2);
}

#[test]
fn test_left_then_right_restores_caret() {
    let mut editor = editor();
    editor.type_str("hi @bo").unwrap();
    editor.press(EditorKey::Enter).unwrap();
    let committed = editor.document().selection();

    editor.press(EditorKey::ArrowLeft).unwrap();
    editor.press(EditorKey::ArrowRight).unwrap();
    assert_eq!(editor.document().selection(), committed);
}

#[test]
fn test_arrows_jump_over_mention_as_a_unit() {
    let mut editor = editor();
    editor.type_str("hi @bo").unwrap();
    editor.press(EditorKey::Enter).unwrap();
    // Step back over the space, to just after the trailing sentinel
    editor.press(EditorKey::ArrowLeft).unwrap();
    let after = editor.document().selection().unwrap();

    assert_eq!(editor.press(EditorKey::ArrowLeft).unwrap(), KeyOutcome::Consumed);
    let before = editor.document().selection().unwrap();
    let doc = editor.document();
    assert_eq!(doc.next_sibling(before.node).and_then(|n| doc.kind(n)), Some(NodeKind::Mention));
    assert_eq!(before.offset, 3);

    assert_eq!(editor.press(EditorKey::ArrowRight).unwrap(), KeyOutcome::Consumed);
    assert_eq!(editor.document().selection(), Some(after));
}

#[test]
fn test_two_backspaces_remove_one_mention_and_at_most_one_sentinel() {
    let mut editor = editor();
    editor.type_str("hi @bo").unwrap();
    editor.press(EditorKey::Enter).unwrap();
    // Caret right after the trailing sentinel
    editor.press(EditorKey::ArrowLeft).unwrap();

    let before = inlines(&editor);
    editor.press(EditorKey::Backspace).unwrap();
    editor.press(EditorKey::Backspace).unwrap();
    let after = inlines(&editor);

    assert_eq!(count_mentions(&before) - count_mentions(&after), 1);
    assert!(count_sentinels(&before) - count_sentinels(&after) <= 1);
}

#[test]
fn test_backspace_after_commit_deletes_space_then_mention() {
    let mut editor = editor();
    editor.type_str("hi @bo").unwrap();
    editor.press(EditorKey::Enter).unwrap();

    editor.press(EditorKey::Backspace).unwrap();
    assert_eq!(count_mentions(&inlines(&editor)), 1);

    assert_eq!(editor.press(EditorKey::Backspace).unwrap(), KeyOutcome::Consumed);
    assert_eq!(inlines(&editor), vec![Inline::text(format!("hi {Z}"))]);
    assert_eq!(editor.document().plain_text(), "hi ");
}

#[test]
fn test_deleting_second_of_adjacent_mentions_keeps_separator() {
    let mut editor = editor();
    editor.type_str("@A").unwrap();
    editor.press(EditorKey::Enter).unwrap();
    editor.type_str("@B").unwrap();
    editor.press(EditorKey::Enter).unwrap();

    editor.press(EditorKey::Backspace).unwrap();
    editor.press(EditorKey::Backspace).unwrap();

    let nodes = inlines(&editor);
    assert_eq!(count_mentions(&nodes), 1);
    assert_eq!(
        nodes,
        vec![
            Inline::text(Z),
            Inline::mention("u1", "Alice"),
            Inline::text(format!("{Z} {Z}")),
        ]
    );
}

#[test]
fn test_mentions_never_touch_without_separator() {
    let mut editor = editor();
    for _ in 0..3 {
        editor.type_str("@").unwrap();
        editor.press(EditorKey::Enter).unwrap();
    }
    for _ in 0..4 {
        editor.press(EditorKey::Backspace).unwrap();
    }

    let nodes = inlines(&editor);
    for pair in nodes.windows(2) {
        assert!(!(pair[0].is_mention() && pair[1].is_mention()), "{nodes:?}");
    }
    for (index, node) in nodes.iter().enumerate() {
        if node.is_mention() {
            for neighbour in [index.checked_sub(1), Some(index + 1)].into_iter().flatten() {
                if let Some(Inline::Text { text }) = nodes.get(neighbour) {
                    assert!(text.contains(SENTINEL), "{nodes:?}");
                }
            }
        }
    }
}

#[test]
fn test_blur_cancels_open_session() {
    let mut editor = editor();
    editor.type_str("@").unwrap();
    editor.document_mut().set_focused(false);
    editor.blur().unwrap();

    assert!(!editor.view().open);
    editor.focus().unwrap();
    assert!(editor.document().is_focused());
}

#[test]
fn test_dropdown_is_placed_below_caret() {
    let mut editor = editor();
    editor.type_str("hi @").unwrap();

    let view = editor.view();
    // Caret after "hi @" is four 8-unit cells in, one 20-unit line tall
    assert_eq!(view.position.x, 32.0);
    assert_eq!(view.position.y, 20.0);
}

#[test]
fn test_host_driven_changes_are_tracked() {
    let mut editor = editor();
    editor.type_str("@").unwrap();

    // A host that edits the tree itself reports the change afterwards
    let doc = editor.document_mut();
    let point = doc.selection().unwrap();
    let mut tx = mention_composer::document::Transaction::new();
    tx.set_text(point.node, "@bo")
        .select(mention_composer::document::SelectionPoint::text(point.node, 3));
    doc.apply(tx).unwrap();
    editor.document_changed().unwrap();

    assert_eq!(editor.view().search_text, "bo");
    assert_eq!(editor.view().filtered_candidates, vec![Candidate::new("u2", "Bob")]);
}
