use super::{notebook, notebook_with, open, path, write_files};
use folio_babel::ir::nodes::{Block, Inline};
use folio_babel::Document;
use folio_notebook::{LinkTarget, NotebookSettings, PageRef, ResolvedTarget};

fn links_to(targets: &[&str]) -> Document {
    let mut content = Vec::new();
    for target in targets {
        if !content.is_empty() {
            content.push(Inline::text(" "));
        }
        content.push(Inline::link(target, None));
    }
    Document::new(vec![Block::paragraph(content)])
}

#[test]
fn test_backlinks_after_reindex() {
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &[
            ("Home.txt", "[[Projects:Plan]] and [[Projects:Budget]]\n"),
            ("Projects/Plan.txt", "Check [[Budget]] first.\n"),
            ("Projects/Budget.txt", "Numbers\n"),
        ],
    );
    let store = open(dir.path());
    assert_eq!(store.reindex().unwrap(), 3);

    assert_eq!(
        store.backlinks(&path("Projects:Budget")),
        vec![path("Home"), path("Projects:Plan")]
    );
    assert_eq!(store.backlinks(&path("Projects:Plan")), vec![path("Home")]);
    assert!(store.backlinks(&path("Home")).is_empty());
}

#[test]
fn test_save_replaces_edges() {
    let (_dir, store) = notebook();
    store.materialize(&path("Plan")).unwrap();
    store.materialize(&path("Budget")).unwrap();

    store.save(&path("Home"), &links_to(&["Plan"]), "wiki").unwrap();
    assert_eq!(store.backlinks(&path("Plan")), vec![path("Home")]);

    store.save(&path("Home"), &links_to(&["Budget"]), "wiki").unwrap();
    assert!(store.backlinks(&path("Plan")).is_empty());
    assert_eq!(store.backlinks(&path("Budget")), vec![path("Home")]);
}

#[test]
fn test_placeholder_edges_follow_materialization() {
    let (_dir, store) = notebook();
    store.save(&path("Home"), &links_to(&["Ideas"]), "wiki").unwrap();
    store
        .save(&path("Projects:Plan"), &links_to(&["Ideas"]), "wiki")
        .unwrap();

    assert_eq!(store.backlinks(&path("Home:Ideas")), vec![path("Home")]);
    assert_eq!(
        store.backlinks(&path("Projects:Plan:Ideas")),
        vec![path("Projects:Plan")]
    );
    assert!(store.backlinks(&path("Ideas")).is_empty());

    store.materialize(&path("Ideas")).unwrap();

    assert_eq!(
        store.backlinks(&path("Ideas")),
        vec![path("Home"), path("Projects:Plan")]
    );
    assert!(store.backlinks(&path("Home:Ideas")).is_empty());
}

#[test]
fn test_outlinks_keep_external_and_file_targets() {
    let (dir, store) = notebook();
    let doc = Document::new(vec![Block::paragraph(vec![
        Inline::link("https://example.org", None),
        Inline::text(" "),
        Inline::link("./report.pdf", Some("report")),
        Inline::text(" "),
        Inline::link("#details", None),
    ])]);
    store.save(&path("Page"), &doc, "wiki").unwrap();

    let targets: Vec<LinkTarget> = store
        .outlinks(&path("Page"))
        .into_iter()
        .map(|edge| edge.target)
        .collect();
    assert_eq!(
        targets,
        vec![
            LinkTarget::External("https://example.org".to_string()),
            LinkTarget::File(dir.path().join("Page").join("report.pdf")),
        ]
    );
}

#[test]
fn test_case_insensitive_links_by_default() {
    let (_dir, store) = notebook();
    store.materialize(&path("Projects:Plan")).unwrap();

    let target = store.resolve("projects:plan", &path("Home")).unwrap();
    match target {
        ResolvedTarget::Page { page, .. } => {
            assert!(page.is_materialized());
            assert_eq!(page.path(), &path("Projects:Plan"));
        }
        other => panic!("expected a page, got {other:?}"),
    }
}

#[test]
fn test_case_sensitive_links() {
    let settings = NotebookSettings {
        case_sensitive_links: true,
        ..Default::default()
    };
    let (_dir, store) = notebook_with(settings);
    store.materialize(&path("Projects:Plan")).unwrap();

    assert_eq!(
        store.resolve("projects:plan", &path("Home")).unwrap(),
        ResolvedTarget::Page {
            page: PageRef::Placeholder(path("Home:projects:plan")),
            anchor: None,
        }
    );
}
