use super::{notebook, open, path, write_files};
use folio_babel::ir::nodes::{Block, Inline};
use folio_babel::{CancelToken, Document};
use folio_notebook::{NotebookSettings, PagePath, PageRef, ResolvedTarget, StoreError};
use std::fs;

#[test]
fn test_materialize_writes_title_heading() {
    let (dir, store) = notebook();
    let page = store.materialize(&path("Projects:Road Map")).unwrap();

    assert_eq!(page.file, dir.path().join("Projects").join("Road_Map.txt"));
    assert_eq!(page.dialect, "wiki");
    assert_eq!(
        fs::read_to_string(&page.file).unwrap(),
        "Content-Type: text/x-zim-wiki\nWiki-Format: zim 0.6\n\n= Road Map =\n"
    );
    assert!(store.exists(&path("Projects:Road Map")));
    assert!(matches!(
        store.page(&path("Projects:Road Map")),
        PageRef::Materialized(_)
    ));
}

#[test]
fn test_dotted_page_names_get_their_own_files() {
    let (dir, store) = notebook();
    let first = store.materialize(&path("Release v1.2")).unwrap();
    let second = store.materialize(&path("Release v1.3")).unwrap();

    assert_eq!(first.file, dir.path().join("Release_v1.2.txt"));
    assert_eq!(second.file, dir.path().join("Release_v1.3.txt"));

    store.reindex().unwrap();
    assert!(store.exists(&path("Release v1.2")));
    assert!(store.exists(&path("Release v1.3")));
    assert!(!store.exists(&path("Release v1")));
    assert_eq!(
        store.load(&path("Release v1.2")).unwrap().document.blocks(),
        vec![Block::heading(1, vec![Inline::text("Release v1.2")])]
    );
}

#[test]
fn test_materialize_existing_page_fails() {
    let (_dir, store) = notebook();
    store.materialize(&path("Home")).unwrap();

    assert!(matches!(
        store.materialize(&path("Home")),
        Err(StoreError::AlreadyExists(_))
    ));
}

#[test]
fn test_resolving_never_creates_files() {
    let (dir, store) = notebook();
    store.materialize(&path("A:B")).unwrap();

    let target = store.resolve("Page", &path("A:B")).unwrap();
    assert_eq!(
        target,
        ResolvedTarget::Page {
            page: PageRef::Placeholder(path("A:B:Page")),
            anchor: None,
        }
    );
    assert!(!store.exists(&path("A:B:Page")));
    assert!(!dir.path().join("A").join("B").join("Page.txt").exists());

    store.materialize(&path("A:B:Page")).unwrap();
    let target = store.resolve("Page", &path("A:B")).unwrap();
    assert!(matches!(
        target,
        ResolvedTarget::Page {
            page: PageRef::Materialized(_),
            ..
        }
    ));
}

#[test]
fn test_changing_default_dialect_keeps_existing_pages() {
    let (dir, store) = notebook();
    let old = store.materialize(&path("Old")).unwrap();
    let old_text = fs::read_to_string(&old.file).unwrap();

    let markdown = NotebookSettings::for_dialect(store.registry(), "markdown").unwrap();
    store.set_settings(markdown).unwrap();

    let new = store.materialize(&path("New")).unwrap();
    assert_eq!(new.dialect, "markdown");
    assert_eq!(new.file, dir.path().join("New.md"));
    assert_eq!(fs::read_to_string(&new.file).unwrap(), "# New\n");

    let old_page = store.page(&path("Old"));
    assert_eq!(old_page.as_page().map(|p| p.dialect.as_str()), Some("wiki"));
    assert_eq!(fs::read_to_string(&old.file).unwrap(), old_text);

    let doc = Document::new(vec![Block::paragraph(vec![Inline::text("still wiki")])]);
    assert!(store.save(&path("Old"), &doc, "wiki").is_ok());
    assert!(matches!(
        store.save(&path("Old"), &doc, "markdown"),
        Err(StoreError::DialectMismatch { .. })
    ));
}

#[test]
fn test_invalid_settings_are_rejected() {
    let (_dir, store) = notebook();
    let settings = NotebookSettings {
        default_dialect: "markdown".to_string(),
        default_extension: "txt".to_string(),
        case_sensitive_links: false,
    };
    assert!(matches!(
        store.set_settings(settings),
        Err(StoreError::InvalidSettings(_))
    ));
    assert_eq!(store.settings(), NotebookSettings::default());
}

#[test]
fn test_first_save_materializes_with_given_dialect() {
    let (dir, store) = notebook();
    let doc = Document::new(vec![Block::heading(1, vec![Inline::text("Draft")])]);

    let page = store.save(&path("Draft"), &doc, "markdown").unwrap();
    assert_eq!(page.dialect, "markdown");
    assert_eq!(fs::read_to_string(dir.path().join("Draft.md")).unwrap(), "# Draft\n");
}

#[test]
fn test_list_children_sorted_by_name() {
    let (_dir, store) = notebook();
    for name in ["Projects:Beta", "Projects:Alpha", "Projects:Alpha:Sub", "Home"] {
        store.materialize(&path(name)).unwrap();
    }

    let names: Vec<String> = store
        .list_children(&path("Projects"))
        .iter()
        .map(|page| page.path.to_string())
        .collect();
    assert_eq!(names, vec!["Projects:Alpha", "Projects:Beta"]);

    let top: Vec<String> = store
        .list_children(&PagePath::root())
        .iter()
        .map(|page| page.path.to_string())
        .collect();
    assert_eq!(top, vec!["Home"]);
}

#[test]
fn test_attachments_dir() {
    let (dir, store) = notebook();
    assert_eq!(
        store.attachments_dir(&path("Projects:Road Map")),
        dir.path().join("Projects").join("Road_Map")
    );
}

#[test]
fn test_reindex_picks_up_new_files() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("Home.txt", "[[Ideas]]\n")]);
    let store = open(dir.path());
    assert_eq!(store.reindex().unwrap(), 1);

    write_files(dir.path(), &[("Ideas.txt", "Later\n")]);
    assert!(!store.exists(&path("Ideas")));

    assert_eq!(store.reindex().unwrap(), 2);
    assert!(store.exists(&path("Ideas")));
    assert_eq!(store.backlinks(&path("Ideas")), vec![path("Home")]);
}

#[test]
fn test_reindex_forgets_removed_files() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("Home.txt", "[[Ideas]]\n"), ("Ideas.txt", "x\n")]);
    let store = open(dir.path());
    store.reindex().unwrap();

    fs::remove_file(dir.path().join("Home.txt")).unwrap();
    assert_eq!(store.reindex().unwrap(), 1);
    assert!(!store.exists(&path("Home")));
    assert!(store.backlinks(&path("Ideas")).is_empty());
}

#[test]
fn test_cancelled_reindex_parses_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("A.txt", "a\n"), ("B.txt", "b\n")]);
    let store = open(dir.path());

    let cancel = CancelToken::new();
    cancel.cancel();
    assert_eq!(store.reindex_with_cancel(&cancel).unwrap(), 0);
}
