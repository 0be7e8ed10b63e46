use super::*;

use crate::app::test_support::commit;

fn text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

#[test]
fn rails_mark_forks_and_merges() {
    let snap = Snapshot::new(vec![
        commit("m1", "M", &["x1", "y1"], &[]),
        commit("x1", "X", &["b1"], &[]),
        commit("y1", "Y", &["b1"], &[]),
        commit("b1", "B", &[], &[]),
    ]);
    let by = |id: &str| snap.by_id(id).cloned().unwrap_or_default();
    assert_eq!(rails(&by("m1"), &snap), "┤ ");
    assert_eq!(rails(&by("b1"), &snap), "├ ");
    assert_eq!(rails(&by("x1"), &snap), "  ");
}

#[test]
fn moving_marker_follows_the_change_after_a_rewrite() {
    let rewritten = commit("a2", "A", &["b1"], &[]);
    let snap = Snapshot::new(vec![rewritten.clone(), commit("b1", "B", &[], &[])]);
    let line = commit_line(
        &rewritten,
        &snap,
        &PrActions::default(),
        Some("A"),
        OffsetDateTime::UNIX_EPOCH,
    );
    assert!(text(&line).contains("[moving]"));

    let other = &snap.commits()[1];
    let line = commit_line(other, &snap, &PrActions::default(), Some("A"), OffsetDateTime::UNIX_EPOCH);
    assert!(!text(&line).contains("[moving]"));
}
