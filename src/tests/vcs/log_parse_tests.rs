use super::*;

fn record(fields: [&str; 11]) -> String {
    fields.join("\u{1f}")
}

#[test]
fn parses_flags_lists_and_text() {
    let out = [
        record([
            "c2", "kx", "c1", "feature-x,wip", "1", "0", "1", "0", "add parser", "Ada",
            "2026-01-25T10:00:00+00:00",
        ]),
        record([
            "c1", "ky", "", "main", "0", "1", "0", "0", "", "Bob", "2026-01-24T10:00:00+00:00",
        ]),
    ]
    .join("\n");

    let snap = parse_log(&out).unwrap();
    assert_eq!(snap.len(), 2);
    let head = snap.get(0).unwrap();
    assert_eq!(head.branches, vec!["feature-x".to_string(), "wip".to_string()]);
    assert!(head.is_working);
    assert!(head.conflicted);
    assert!(!head.immutable);
    assert_eq!(head.parents, vec!["c1".to_string()]);

    let root = snap.get(1).unwrap();
    assert!(root.is_root());
    assert!(root.immutable);
    assert_eq!(root.display_summary(), "(no description set)");
    assert_eq!(snap.children_of("c1"), ["c2".to_string()]);
}

#[test]
fn rejects_truncated_records() {
    let err = parse_log("c1\u{1f}k1\u{1f}\n").unwrap_err();
    assert!(matches!(err, GraftError::ExternalTool { .. }));
}

#[test]
fn summary_lines_become_changed_files() {
    let files = parse_changed_files("M src/lib.rs\nA docs/new.md\nR src/{a => b}.rs\n?? junk\n");
    assert_eq!(files.len(), 3);
    assert_eq!(files[0].status, FileStatus::Modified);
    assert_eq!(files[1].path, "docs/new.md");
    assert_eq!(files[2].status, FileStatus::Renamed);
    assert_eq!(files[2].path, "src/{a => b}.rs");
}
