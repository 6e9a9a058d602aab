use async_trait::async_trait;
use codeflow_chunker::SourceFile;
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

/// File extensions the pipeline considers processable
pub const PROCESSABLE_EXTENSIONS: [&str; 14] = [
    "ts", "tsx", "js", "jsx", "html", "css", "scss", "json", "md", "txt", "yaml", "yml", "xml",
    "svg",
];

/// Directory entries never descended into
const SKIPPED_DIRS: [&str; 2] = ["node_modules", "dist"];

/// Errors from a file store collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },
}

/// Read-only file store collaborator.
///
/// The pipeline consumes this narrow contract and never creates or
/// deletes files; any virtual or real filesystem can sit behind it.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<String, StoreError>;
    async fn list_directory(&self, path: &str) -> Result<Vec<String>, StoreError>;
    async fn is_directory(&self, path: &str) -> bool;
}

/// Check whether a file name has a processable extension
#[must_use]
pub fn is_processable(name: &str) -> bool {
    name.rsplit('.')
        .next()
        .map(|ext| {
            let ext = ext.to_lowercase();
            PROCESSABLE_EXTENSIONS.iter().any(|p| *p == ext)
        })
        .unwrap_or(false)
}

/// Walk the store from `root`, collecting processable files.
///
/// Dotfiles, `node_modules` and `dist` are skipped. A failed directory
/// listing or file read is logged and skipped at that granularity; the
/// walk itself always completes.
pub async fn collect_sources(store: &dyn FileStore, root: &str) -> Vec<SourceFile> {
    let mut sources = Vec::new();
    let mut queue = VecDeque::from([root.to_string()]);

    while let Some(dir) = queue.pop_front() {
        let entries = match store.list_directory(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Skipping unreadable directory {dir}: {e}");
                continue;
            }
        };

        for entry in entries {
            if entry.starts_with('.') || SKIPPED_DIRS.contains(&entry.as_str()) {
                continue;
            }

            let full_path = if dir == "/" {
                format!("/{entry}")
            } else {
                format!("{dir}/{entry}")
            };

            if store.is_directory(&full_path).await {
                queue.push_back(full_path);
            } else if is_processable(&entry) {
                match store.read_file(&full_path).await {
                    Ok(content) => sources.push(SourceFile::new(full_path, content)),
                    Err(e) => log::warn!("Skipping unreadable file {full_path}: {e}"),
                }
            }
        }
    }

    log::info!("Collected {} source files under {root}", sources.len());
    sources
}

/// In-memory file store, used in tests and anywhere a virtual tree is
/// needed. Paths are absolute, `/`-separated.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileStore {
    files: BTreeMap<String, String>,
}

impl MemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, normalizing to a leading slash
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self.files.insert(path, content.into());
    }

    fn child_prefix(dir: &str) -> String {
        if dir == "/" {
            "/".to_string()
        } else {
            format!("{}/", dir.trim_end_matches('/'))
        }
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn read_file(&self, path: &str) -> Result<String, StoreError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let prefix = Self::child_prefix(path);
        let mut entries: Vec<String> = Vec::new();

        for key in self.files.keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                if rest.is_empty() {
                    continue;
                }
                let child = rest.split('/').next().unwrap_or(rest).to_string();
                if !entries.contains(&child) {
                    entries.push(child);
                }
            }
        }

        if entries.is_empty() && !self.files.keys().any(|k| k.starts_with(&prefix)) {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(entries)
    }

    async fn is_directory(&self, path: &str) -> bool {
        let prefix = Self::child_prefix(path);
        !self.files.contains_key(path) && self.files.keys().any(|k| k.starts_with(&prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_store() -> MemoryFileStore {
        let mut store = MemoryFileStore::new();
        store.insert("/src/index.ts", "export {};");
        store.insert("/src/components/App.tsx", "function App() {}");
        store.insert("/node_modules/pkg/index.js", "module.exports = {};");
        store.insert("/.env", "SECRET=1");
        store.insert("/readme.md", "# hi");
        store.insert("/image.png", "binary");
        store
    }

    #[tokio::test]
    async fn test_collect_sources_walks_and_filters() {
        let store = sample_store();
        let mut sources = collect_sources(&store, "/").await;
        sources.sort_by(|a, b| a.path.cmp(&b.path));

        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/readme.md", "/src/components/App.tsx", "/src/index.ts"]
        );
    }

    #[tokio::test]
    async fn test_is_directory() {
        let store = sample_store();
        assert!(store.is_directory("/src").await);
        assert!(store.is_directory("/src/components").await);
        assert!(!store.is_directory("/src/index.ts").await);
        assert!(!store.is_directory("/missing").await);
    }

    #[tokio::test]
    async fn test_list_directory() {
        let store = sample_store();
        let mut entries = store.list_directory("/src").await.unwrap();
        entries.sort();
        assert_eq!(entries, vec!["components", "index.ts"]);

        assert!(store.list_directory("/nope").await.is_err());
    }

    #[test]
    fn test_is_processable() {
        assert!(is_processable("a.ts"));
        assert!(is_processable("style.SCSS"));
        assert!(!is_processable("image.png"));
        assert!(!is_processable("Makefile"));
    }
}
