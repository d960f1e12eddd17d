//! Markdown pages keep labelled page links as relative `.md` paths on disk.

use super::{markdown_notebook, path, write_files};
use folio_babel::ir::nodes::{Block, Inline};
use folio_babel::{DialectRegistry, Document};
use folio_notebook::{NotebookSettings, PageStore};
use std::fs;

fn open_markdown(root: &std::path::Path) -> PageStore {
    let settings = NotebookSettings::for_dialect(&DialectRegistry::default(), "markdown").unwrap();
    PageStore::open(root, settings, DialectRegistry::default()).unwrap()
}

#[test]
fn test_labelled_links_are_written_as_relative_files() {
    let (dir, store) = markdown_notebook();
    store.materialize(&path("Projects:Plan")).unwrap();

    let doc = Document::new(vec![Block::paragraph(vec![
        Inline::link("Projects:Plan", Some("the plan")),
        Inline::text(" and "),
        Inline::link("Ideas", None),
    ])]);
    store.save(&path("Home"), &doc, "markdown").unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("Home.md")).unwrap(),
        "[the plan](Projects/Plan.md) and [[Ideas]]\n"
    );

    let loaded = store.load(&path("Home")).unwrap();
    assert_eq!(
        loaded.document.blocks(),
        vec![Block::paragraph(vec![
            Inline::link(":Projects:Plan", Some("the plan")),
            Inline::text(" and "),
            Inline::link("Ideas", None),
        ])]
    );
    assert_eq!(store.backlinks(&path("Projects:Plan")), vec![path("Home")]);
}

#[test]
fn test_relative_files_read_as_page_links() {
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &[
            ("Home.md", "# Home\n"),
            ("Projects/Plan.md", "Back to [home](../Home.md#top).\n"),
        ],
    );
    let store = open_markdown(dir.path());

    let loaded = store.load(&path("Projects:Plan")).unwrap();
    assert_eq!(
        loaded.document.blocks(),
        vec![Block::paragraph(vec![
            Inline::text("Back to "),
            Inline::link(":Home#top", Some("home")),
            Inline::text("."),
        ])]
    );
    assert_eq!(store.backlinks(&path("Home")), vec![path("Projects:Plan")]);

    store
        .save(&path("Projects:Plan"), &loaded.document, "markdown")
        .unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("Projects").join("Plan.md")).unwrap(),
        "Back to [home](../Home.md#top).\n"
    );
}

#[test]
fn test_links_to_placeholders_use_the_future_file() {
    let (dir, store) = markdown_notebook();
    let doc = Document::new(vec![Block::paragraph(vec![Inline::link(
        "+Road Map",
        Some("next"),
    )])]);
    store.save(&path("Projects"), &doc, "markdown").unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("Projects.md")).unwrap(),
        "[next](Projects/Road_Map.md)\n"
    );
}

#[test]
fn test_links_to_wiki_pages_keep_page_paths() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("Old.txt", "Old notes\n")]);
    let store = open_markdown(dir.path());

    let doc = Document::new(vec![Block::paragraph(vec![Inline::link(
        "Old",
        Some("archive"),
    )])]);
    store.save(&path("Home"), &doc, "markdown").unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("Home.md")).unwrap(),
        "[archive](Old)\n"
    );
    assert_eq!(store.backlinks(&path("Old")), vec![path("Home")]);
}
