use super::{notebook, path};
use folio_babel::ir::nodes::{Block, Inline};
use folio_babel::Document;
use folio_notebook::PagePath;
use std::thread;

fn numbered(n: usize) -> Document {
    Document::new(vec![Block::paragraph(vec![Inline::text(&format!(
        "version {n}"
    ))])])
}

#[test]
fn test_pages_saved_from_many_threads() {
    let (_dir, store) = notebook();

    thread::scope(|scope| {
        for worker in 0..8 {
            let store = &store;
            scope.spawn(move || {
                let page = path(&format!("Worker {worker}"));
                for n in 0..5 {
                    store.save(&page, &numbered(n), "wiki").unwrap();
                    assert_eq!(store.load(&page).unwrap().document, numbered(n));
                }
            });
        }
    });

    assert_eq!(store.list_children(&PagePath::root()).len(), 8);
}

#[test]
fn test_writes_to_one_page_are_serialized() {
    let (_dir, store) = notebook();
    let page = path("Shared");
    store.save(&page, &numbered(0), "wiki").unwrap();

    thread::scope(|scope| {
        for worker in 1..=8 {
            let (store, page) = (&store, &page);
            scope.spawn(move || {
                store.save_overwrite(page, &numbered(worker), "wiki").unwrap();
            });
        }
    });

    let loaded = store.load(&page).unwrap();
    assert!(loaded.warnings.is_empty());
    assert!((1..=8).any(|n| loaded.document == numbered(n)));
}

#[test]
fn test_loads_run_alongside_saves() {
    let (_dir, store) = notebook();
    let page = path("Busy");
    store.save(&page, &numbered(0), "wiki").unwrap();

    thread::scope(|scope| {
        let (writer_store, writer_page) = (&store, &page);
        scope.spawn(move || {
            for n in 1..20 {
                writer_store
                    .save(writer_page, &numbered(n), "wiki")
                    .unwrap();
            }
        });
        for _ in 0..4 {
            let (store, page) = (&store, &page);
            scope.spawn(move || {
                for _ in 0..20 {
                    let loaded = store.load(page).unwrap();
                    assert!(loaded.warnings.is_empty());
                    assert_eq!(loaded.document.blocks().len(), 1);
                }
            });
        }
    });
}
