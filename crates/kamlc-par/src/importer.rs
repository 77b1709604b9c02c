//! Package importing for `-use` statements.
//!
//! The parser only knows the [`PackageImporter`] contract: hand over a
//! dotted chain such as `"foo:bar"` or `"foo:*"`, get back a parsed tree
//! or a failure. [`FsImporter`] is the filesystem implementation: dotted
//! components become path segments, the last one gains the `.kaml`
//! suffix (a terminal `*` is dropped), search roots are tried left to
//! right and the first hit wins. A memo of canonical paths shared across
//! the whole import graph rejects revisits.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use kamlc_util::{FxHashSet, Handler};

use crate::ast::Node;
use crate::error::ImportError;
use crate::Parser;

/// Source file extension for packages.
const SOURCE_SUFFIX: &str = ".kaml";

/// Collaborator consulted for every `-use` statement.
pub trait PackageImporter {
    /// Resolves `name` and returns the parsed tree of the package.
    fn import_package(&mut self, name: &str) -> Result<Node, ImportError>;
}

/// Filesystem-backed importer.
pub struct FsImporter {
    search_paths: Vec<PathBuf>,
    memo: Rc<RefCell<FxHashSet<PathBuf>>>,
}

impl FsImporter {
    /// Creates an importer over the given search roots, tried in order.
    pub fn new(search_paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let search_paths = search_paths
            .into_iter()
            .map(|p| p.canonicalize().unwrap_or(p))
            .collect();
        Self {
            search_paths,
            memo: Rc::new(RefCell::new(FxHashSet::default())),
        }
    }

    /// An importer sharing this one's memo, for the nested parse of an
    /// imported file.
    fn fork(&self) -> Self {
        Self {
            search_paths: self.search_paths.clone(),
            memo: Rc::clone(&self.memo),
        }
    }

    /// Maps `"a:b:c"` / `"a:*"` to the relative path `a/b/c.kaml` /
    /// `a.kaml`.
    fn relative_path(name: &str) -> PathBuf {
        let mut parts: Vec<&str> = name.split(':').collect();
        if parts.last() == Some(&"*") {
            parts.pop();
        }
        let mut path = PathBuf::new();
        let last = parts.len().saturating_sub(1);
        for (i, part) in parts.iter().enumerate() {
            if i == last {
                path.push(format!("{}{}", part, SOURCE_SUFFIX));
            } else {
                path.push(part);
            }
        }
        path
    }
}

impl PackageImporter for FsImporter {
    fn import_package(&mut self, name: &str) -> Result<Node, ImportError> {
        let relative = Self::relative_path(name);

        for root in &self.search_paths {
            let candidate = root.join(&relative);
            let canonical = candidate.canonicalize().unwrap_or_else(|_| candidate.clone());

            if self.memo.borrow().contains(&canonical) {
                return Err(ImportError::AlreadyImported { path: canonical });
            }

            let source = match fs::read_to_string(&candidate) {
                Ok(source) => source,
                // Unreadable at this root; keep searching.
                Err(_) => continue,
            };

            self.memo.borrow_mut().insert(canonical);

            let handler = Handler::new();
            let mut parser =
                Parser::new(&source, &handler).with_importer(Box::new(self.fork()));
            return parser.parse().map_err(|e| ImportError::Parse {
                name: name.to_owned(),
                source: Box::new(e),
            });
        }

        Err(ImportError::NotFound {
            name: name.to_owned(),
            searched: self.search_paths.clone(),
        })
    }
}
