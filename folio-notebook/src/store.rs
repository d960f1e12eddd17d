//! Page store
//!
//! Owns the notebook folder: one directory scan builds the namespace index,
//! pages are parsed on demand and cached by file signature, and every load or
//! save refreshes the page's edges in the link graph.
//!
//! Writes to one backing file are serialized by a per-path lock; loads and
//! saves of different pages run concurrently. A file changed behind the
//! store's back is detected on save by comparing signatures, and reported as
//! [`StoreError::Conflict`].
//!
//! The signature a save is checked against is the one the caller last saw:
//! it moves on [`PageStore::load`] and on a successful save, never when
//! [`PageStore::reindex`] parses a page in the background.

use crate::error::StoreError;
use crate::graph::{LinkEdge, LinkGraph};
use crate::hrefs::{file_targets_to_pages, page_targets_to_files};
use crate::index::NamespaceIndex;
use crate::layout::FilesLayout;
use crate::page::{Page, PageRef};
use crate::path::PagePath;
use crate::resolver::{self, ResolvedTarget};
use crate::settings::NotebookSettings;
use crate::signature::FileSignature;
use encoding_rs::UTF_8;
use folio_babel::ir::nodes::{Block, Inline};
use folio_babel::{parse_with_cancel, CancelToken, Dialect, DialectRegistry, Document, Warning};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

/// A parsed page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedPage {
    pub page: Page,
    pub document: Document,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
struct CachedPage {
    signature: FileSignature,
    document: Document,
    warnings: Vec<Warning>,
}

/// Whether a load records the file it read as the version the next save
/// must find on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Baseline {
    Claim,
    Keep,
}

pub struct PageStore {
    layout: FilesLayout,
    registry: DialectRegistry,
    settings: RwLock<NotebookSettings>,
    index: RwLock<NamespaceIndex>,
    graph: LinkGraph,
    cache: Mutex<HashMap<PagePath, CachedPage>>,
    locks: Mutex<HashMap<PagePath, Arc<Mutex<()>>>>,
}

impl PageStore {
    /// Open the notebook at `root`, creating the folder if needed, and index
    /// the pages found in it.
    pub fn open(
        root: impl Into<PathBuf>,
        settings: NotebookSettings,
        registry: DialectRegistry,
    ) -> Result<Self, StoreError> {
        settings.validate(&registry)?;
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| StoreError::io(&root, err))?;

        let layout = FilesLayout::new(root);
        let index = scan(&layout, &registry, settings.case_sensitive_links)?;
        info!(
            "Indexed {} pages in {}",
            index.len(),
            layout.root().display()
        );

        Ok(PageStore {
            layout,
            registry,
            settings: RwLock::new(settings),
            index: RwLock::new(index),
            graph: LinkGraph::new(),
            cache: Mutex::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &FilesLayout {
        &self.layout
    }

    pub fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    pub fn settings(&self) -> NotebookSettings {
        self.settings.read().clone()
    }

    /// Replace the notebook settings. Pages that already exist keep their
    /// dialect.
    pub fn set_settings(&self, settings: NotebookSettings) -> Result<(), StoreError> {
        settings.validate(&self.registry)?;
        self.index
            .write()
            .set_case_sensitive(settings.case_sensitive_links);
        *self.settings.write() = settings;
        Ok(())
    }

    pub fn exists(&self, path: &PagePath) -> bool {
        self.index.read().contains(path)
    }

    pub fn page(&self, path: &PagePath) -> PageRef {
        match self.index.read().get(path) {
            Some(page) => PageRef::Materialized(page.clone()),
            None => PageRef::Placeholder(path.clone()),
        }
    }

    /// Materialized pages directly below `namespace`, sorted by name.
    pub fn list_children(&self, namespace: &PagePath) -> Vec<Page> {
        self.index.read().children(namespace)
    }

    pub fn attachments_dir(&self, path: &PagePath) -> PathBuf {
        self.layout.page_dir(path)
    }

    pub fn resolve(&self, link: &str, source: &PagePath) -> Result<ResolvedTarget, StoreError> {
        resolver::resolve(link, source, &*self.index.read())
    }

    pub fn backlinks(&self, path: &PagePath) -> Vec<PagePath> {
        self.graph.backlinks(path)
    }

    pub fn outlinks(&self, path: &PagePath) -> Vec<LinkEdge> {
        self.graph.outlinks(path)
    }

    /// Read and parse a page. Unchanged files are served from the cache.
    pub fn load(&self, path: &PagePath) -> Result<LoadedPage, StoreError> {
        self.with_path_lock(path, || {
            self.read_page(path, &CancelToken::new(), Baseline::Claim)
        })
    }

    fn read_page(
        &self,
        path: &PagePath,
        cancel: &CancelToken,
        baseline: Baseline,
    ) -> Result<LoadedPage, StoreError> {
        let mut page = self
            .index
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        let signature =
            FileSignature::of(&page.file).map_err(|err| StoreError::io(&page.file, err))?;
        if baseline == Baseline::Claim {
            self.index.write().set_signature(path, Some(signature));
            page.signature = Some(signature);
        }

        if let Some(cached) = self.cache.lock().get(path) {
            if cached.signature == signature {
                debug!("Cache hit for '{path}'");
                return Ok(LoadedPage {
                    page,
                    document: cached.document.clone(),
                    warnings: cached.warnings.clone(),
                });
            }
            debug!("Cached copy of '{path}' is stale");
        }

        let bytes = fs::read(&page.file).map_err(|err| StoreError::io(&page.file, err))?;
        let (text, malformed) = UTF_8.decode_with_bom_removal(&bytes);
        let mut warnings = Vec::new();
        if malformed {
            warn!(
                "{} is not valid UTF-8; invalid bytes were replaced",
                page.file.display()
            );
            warnings.push(Warning::encoding(format!(
                "{} contains invalid UTF-8; invalid bytes were replaced with U+FFFD",
                page.file.display()
            )));
        }

        let dialect = self.registry.get(&page.dialect)?;
        let parsed = parse_with_cancel(&text, dialect, cancel);
        let mut document = parsed.document;
        warnings.extend(parsed.warnings);
        if !parsed.complete {
            debug!("Parse of '{path}' was cancelled");
            return Ok(LoadedPage {
                page,
                document,
                warnings,
            });
        }
        if dialect.syntax().links.inline {
            file_targets_to_pages(&mut document, &self.layout, &page.file, dialect.extension());
        }

        self.cache.lock().insert(
            path.clone(),
            CachedPage {
                signature,
                document: document.clone(),
                warnings: warnings.clone(),
            },
        );
        self.update_edges(path, &document);

        Ok(LoadedPage {
            page,
            document,
            warnings,
        })
    }

    /// Write `document` to the page at `path` using `dialect`.
    ///
    /// A placeholder is materialized with `dialect`. An existing page must
    /// already use `dialect`, and its file must not have changed since it
    /// was last loaded or saved.
    pub fn save(
        &self,
        path: &PagePath,
        document: &Document,
        dialect: &str,
    ) -> Result<Page, StoreError> {
        self.save_checked(path, document, dialect, true)
    }

    /// Like [`PageStore::save`], without the modification check.
    pub fn save_overwrite(
        &self,
        path: &PagePath,
        document: &Document,
        dialect: &str,
    ) -> Result<Page, StoreError> {
        self.save_checked(path, document, dialect, false)
    }

    fn save_checked(
        &self,
        path: &PagePath,
        document: &Document,
        dialect_id: &str,
        check: bool,
    ) -> Result<Page, StoreError> {
        if path.is_root() {
            return Err(StoreError::InvalidPath(
                "the notebook root is not a page".to_string(),
            ));
        }
        let dialect = self.registry.get(dialect_id)?;
        self.with_path_lock(path, || self.write_checked(path, document, dialect, check))
    }

    fn write_checked(
        &self,
        path: &PagePath,
        document: &Document,
        dialect: &Dialect,
        check: bool,
    ) -> Result<Page, StoreError> {
        let existing = self.index.read().get(path).cloned();
        let file = match &existing {
            Some(page) => {
                if page.dialect != dialect.id() {
                    return Err(StoreError::DialectMismatch {
                        path: path.clone(),
                        page: page.dialect.clone(),
                        requested: dialect.id().to_string(),
                    });
                }
                if check {
                    self.check_unchanged(page)?;
                }
                page.file.clone()
            }
            None => {
                let file = self.layout.page_file(path, dialect.extension());
                if check && file.exists() {
                    warn!(
                        "Refusing to save '{path}': {} appeared on disk",
                        file.display()
                    );
                    return Err(StoreError::Conflict {
                        path: path.clone(),
                        file,
                    });
                }
                file
            }
        };

        let mut output = document.clone();
        if dialect.syntax().links.inline {
            page_targets_to_files(
                &mut output,
                path,
                &*self.index.read(),
                &self.layout,
                &file,
                dialect.extension(),
            );
        }
        let text = dialect.serialize_file(&output);
        let page = self.write_page(path, dialect, file, &text)?;

        if existing.is_none() {
            info!("Materialized '{path}' as {}", page.file.display());
            self.refresh_edges();
        }
        Ok(page)
    }

    /// Create the backing file for a placeholder, using the notebook's
    /// current default dialect and a title heading.
    pub fn materialize(&self, path: &PagePath) -> Result<Page, StoreError> {
        if path.is_root() {
            return Err(StoreError::InvalidPath(
                "the notebook root is not a page".to_string(),
            ));
        }
        let settings = self.settings();
        let dialect = self.registry.get(&settings.default_dialect)?;
        let file = self.layout.page_file(path, &settings.default_extension);

        let page = self.with_path_lock(path, || {
            if self.exists(path) || file.exists() {
                return Err(StoreError::AlreadyExists(path.clone()));
            }
            let template =
                Document::new(vec![Block::heading(1, vec![Inline::text(path.name())])]);
            let text = dialect.serialize_file(&template);
            self.write_page(path, dialect, file, &text)
        })?;

        info!(
            "Materialized '{path}' as {} ({})",
            page.file.display(),
            page.dialect
        );
        self.refresh_edges();
        Ok(page)
    }

    /// Rescan the notebook folder and parse every page. Pages that cannot be
    /// read are skipped. Returns the number of pages parsed.
    pub fn reindex(&self) -> Result<usize, StoreError> {
        self.reindex_with_cancel(&CancelToken::new())
    }

    /// Like [`PageStore::reindex`], stopping early once `cancel` is set.
    pub fn reindex_with_cancel(&self, cancel: &CancelToken) -> Result<usize, StoreError> {
        let case_sensitive = self.settings.read().case_sensitive_links;
        let mut scanned = scan(&self.layout, &self.registry, case_sensitive)?;

        let paths: Vec<PagePath> = {
            let mut index = self.index.write();
            for page in index.pages() {
                if scanned.contains(&page.path) {
                    scanned.set_signature(&page.path, page.signature);
                } else {
                    debug!("'{}' is gone from disk", page.path);
                    self.graph.remove_page(&page.path);
                    self.cache.lock().remove(&page.path);
                }
            }
            *index = scanned;
            index.pages().map(|page| page.path.clone()).collect()
        };
        self.refresh_edges();

        let mut count = 0;
        for path in paths {
            if cancel.is_cancelled() {
                info!("Reindex cancelled after {count} pages");
                break;
            }
            let loaded =
                self.with_path_lock(&path, || self.read_page(&path, cancel, Baseline::Keep));
            match loaded {
                Ok(_) if cancel.is_cancelled() => {}
                Ok(_) => count += 1,
                Err(err) => warn!("Skipping '{path}': {err}"),
            }
        }

        info!("Reindexed {count} pages");
        Ok(count)
    }

    /// Run `f` holding the write lock of `path`. The lock is dropped from
    /// the map once no other caller holds or waits for it.
    fn with_path_lock<T>(&self, path: &PagePath, f: impl FnOnce() -> T) -> T {
        let lock = self.locks.lock().entry(path.clone()).or_default().clone();
        let result = {
            let _guard = lock.lock();
            f()
        };
        let mut locks = self.locks.lock();
        if Arc::strong_count(&lock) == 2 {
            locks.remove(path);
        }
        result
    }

    fn check_unchanged(&self, page: &Page) -> Result<(), StoreError> {
        let conflict = || StoreError::Conflict {
            path: page.path.clone(),
            file: page.file.clone(),
        };
        match FileSignature::of(&page.file) {
            Ok(current) if Some(current) == page.signature => Ok(()),
            Ok(_) => {
                warn!("'{}' changed on disk since it was last read", page.path);
                Err(conflict())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("'{}' was removed from disk", page.path);
                Err(conflict())
            }
            Err(err) => Err(StoreError::io(&page.file, err)),
        }
    }

    /// Write `text` to `file` and record the page as written, refreshing its
    /// cache entry and edges from the text on disk.
    fn write_page(
        &self,
        path: &PagePath,
        dialect: &Dialect,
        file: PathBuf,
        text: &str,
    ) -> Result<Page, StoreError> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
        fs::write(&file, text).map_err(|err| StoreError::io(&file, err))?;
        let signature = FileSignature::of(&file).map_err(|err| StoreError::io(&file, err))?;

        let page = Page {
            path: path.clone(),
            dialect: dialect.id().to_string(),
            attachments: self.layout.page_dir(path),
            file,
            signature: Some(signature),
        };
        self.index.write().insert(page.clone());

        let parsed = dialect.parse(text);
        let mut document = parsed.document;
        if dialect.syntax().links.inline {
            file_targets_to_pages(&mut document, &self.layout, &page.file, dialect.extension());
        }
        self.update_edges(path, &document);
        self.cache.lock().insert(
            path.clone(),
            CachedPage {
                signature,
                document,
                warnings: parsed.warnings,
            },
        );
        debug!("Wrote '{path}' to {}", page.file.display());
        Ok(page)
    }

    /// Resolve the links of `document` and make them the edges of `source`.
    /// The index stays read-locked until the edges are stored, so a page
    /// materialized meanwhile is seen here or by the following refresh.
    fn update_edges(&self, source: &PagePath, document: &Document) {
        let index = self.index.read();
        let edges = document
            .links()
            .into_iter()
            .filter_map(|link| resolve_edge(&link.target, source, &index))
            .collect();
        self.graph.replace_edges(source, edges);
    }

    /// Resolve every recorded edge again, so links to a page that was just
    /// materialized point at it.
    fn refresh_edges(&self) {
        let index = self.index.read();
        self.graph.refresh_with(|source, edges| {
            edges
                .iter()
                .filter_map(|edge| resolve_edge(&edge.text, source, &index))
                .collect()
        });
    }
}

fn resolve_edge(text: &str, source: &PagePath, index: &NamespaceIndex) -> Option<LinkEdge> {
    match resolver::resolve(text, source, index) {
        Ok(target) => target.edge_target().map(|target| LinkEdge {
            text: text.to_string(),
            target,
        }),
        Err(err) => {
            debug!("Ignoring link '{text}' in '{source}': {err}");
            None
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Walk the notebook folder once. Files with a registered dialect extension
/// are pages; every folder is a namespace.
fn scan(
    layout: &FilesLayout,
    registry: &DialectRegistry,
    case_sensitive: bool,
) -> Result<NamespaceIndex, StoreError> {
    let mut index = NamespaceIndex::new(layout.clone(), case_sensitive);
    let walker = WalkDir::new(layout.root())
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| layout.root().to_path_buf());
            StoreError::io(path, err.into())
        })?;

        if entry.file_type().is_dir() {
            match layout.page_for_dir(entry.path()) {
                Some(namespace) => index.insert_namespace(namespace),
                None => debug!("Skipping folder {}", entry.path().display()),
            }
            continue;
        }

        let Some((path, extension)) = layout.page_for_file(entry.path()) else {
            debug!("Skipping {}", entry.path().display());
            continue;
        };
        let Some(dialect) = registry.for_extension(&extension) else {
            continue;
        };
        if let Some(existing) = index.get(&path) {
            warn!(
                "Ignoring {}: '{path}' is already stored in {}",
                entry.path().display(),
                existing.file.display()
            );
            continue;
        }

        let signature = entry
            .metadata()
            .ok()
            .map(|metadata| FileSignature::from_metadata(&metadata));
        index.insert(Page {
            dialect: dialect.id().to_string(),
            file: entry.path().to_path_buf(),
            attachments: layout.page_dir(&path),
            path,
            signature,
        });
    }
    Ok(index)
}
