//! Request-keyed, file-backed cache of raw HTTP responses.
//!
//! Entries are keyed by the normalized request URL: the credential query
//! parameter is replaced with a fixed placeholder, the scheme, host and
//! path segments become a directory path, and the sorted percent-encoded
//! query string becomes the filename. Entries are immutable once written;
//! there is no expiration or eviction. The atomic write-then-rename
//! discipline is the only coordination concurrent readers and writers need.

pub mod response;

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::warn;
use url::Url;
use url::form_urlencoded;

use crate::cache::response::RawResponse;

/// Query parameter carrying the API credential.
const CREDENTIAL_PARAM: &str = "apiKey";

/// Placeholder substituted for the credential value in cache keys, keeping
/// keys stable across credential rotation.
const CREDENTIAL_PLACEHOLDER: &str = "X";

/// Errors from the cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the backing store failed.
    #[error("cache I/O failed")]
    Io(#[from] std::io::Error),

    /// A stored entry does not parse back into a response.
    #[error("malformed cache entry: {0}")]
    Malformed(String),
}

/// Storage capability behind the cache: durable-write-then-publish and
/// read-by-key. The filesystem implementation is the production store; the
/// in-memory one backs tests.
pub trait CacheIo: Send + Sync {
    /// Durably writes `contents`, then publishes it at `dir/filename` in
    /// one atomic step. A partially written entry must never be observable
    /// at the final path. Creating `dir` is idempotent.
    fn write_atomic(&self, dir: &Path, filename: &str, contents: &[u8]) -> Result<(), CacheError>;

    /// Reads the entry at `path`. A missing entry is `Ok(None)`, not an
    /// error.
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, CacheError>;
}

/// Filesystem store: temp file in the destination directory, fsync, rename.
#[derive(Debug, Default)]
pub struct FsCacheIo;

impl CacheIo for FsCacheIo {
    fn write_atomic(&self, dir: &Path, filename: &str, contents: &[u8]) -> Result<(), CacheError> {
        std::fs::create_dir_all(dir)?;

        // The temp file lives in the destination directory so the final
        // rename never crosses a filesystem boundary.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(dir.join(filename)).map_err(|e| e.error)?;
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, CacheError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests. Each write publishes the full buffer at once,
/// so the atomicity contract holds trivially.
#[derive(Debug, Default)]
pub struct MemoryCacheIo {
    entries: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryCacheIo {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheIo for MemoryCacheIo {
    fn write_atomic(&self, dir: &Path, filename: &str, contents: &[u8]) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .insert(dir.join(filename), contents.to_vec());
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.lock().unwrap().get(path).cloned())
    }
}

/// Derives the cache location for a request URL: directory from scheme,
/// host and path segments; filename from the normalized query string.
pub(crate) fn entry_path(root: &Path, url: &Url) -> (PathBuf, String) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut normalized = false;
    for pair in &mut pairs {
        if pair.0 == CREDENTIAL_PARAM {
            pair.1 = CREDENTIAL_PLACEHOLDER.to_string();
            normalized = true;
        }
    }
    if !normalized {
        pairs.push((
            CREDENTIAL_PARAM.to_string(),
            CREDENTIAL_PLACEHOLDER.to_string(),
        ));
    }
    pairs.sort();

    let mut query = form_urlencoded::Serializer::new(String::new());
    for (k, v) in &pairs {
        query.append_pair(k, v);
    }

    let mut dir = root.to_path_buf();
    dir.push(url.scheme());
    if let Some(host) = url.host_str() {
        dir.push(host);
    }
    for segment in url.path_segments().into_iter().flatten() {
        if !segment.is_empty() {
            dir.push(segment);
        }
    }

    (dir, format!("{}.json", query.finish()))
}

/// The response cache: key derivation plus a pluggable [`CacheIo`] store.
pub struct FileCache {
    root: PathBuf,
    io: Box<dyn CacheIo>,
}

impl FileCache {
    /// Cache rooted at `root` on the local filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_io(root, Box::new(FsCacheIo))
    }

    /// Cache with a custom backing store.
    pub fn with_io(root: impl Into<PathBuf>, io: Box<dyn CacheIo>) -> Self {
        Self {
            root: root.into(),
            io,
        }
    }

    /// Looks up the entry for `url`. `Ok(None)` is a miss.
    pub fn get(&self, url: &Url) -> Result<Option<RawResponse>, CacheError> {
        let (dir, filename) = entry_path(&self.root, url);
        match self.io.read(&dir.join(filename))? {
            Some(bytes) => RawResponse::parse(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Stores `response` under the key derived from `url`.
    pub fn save(&self, url: &Url, response: &RawResponse) -> Result<(), CacheError> {
        let (dir, filename) = entry_path(&self.root, url);
        self.io.write_atomic(&dir, &filename, &response.to_bytes())
    }

    /// Lookup that treats an unreadable or unparseable entry as a miss so
    /// the fetch path can fall through to the network.
    pub(crate) fn get_or_miss(&self, url: &Url) -> Option<RawResponse> {
        match self.get(url) {
            Ok(hit) => hit,
            Err(error) => {
                warn!(%url, %error, "ignoring unreadable cache entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use reqwest::header::HeaderMap;

    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn response(body: &[u8]) -> RawResponse {
        RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.to_vec(),
        }
    }

    #[test]
    fn key_splits_scheme_host_and_path_segments() {
        let (dir, file) = entry_path(
            Path::new("/cache"),
            &url("https://api.polygon.io/v2/aggs/ticker/AAPL/range/1/hour/2019-01-01/2019-01-02?unadjusted=false&apiKey=secret"),
        );
        assert_eq!(
            dir,
            Path::new("/cache/https/api.polygon.io/v2/aggs/ticker/AAPL/range/1/hour/2019-01-01/2019-01-02")
        );
        assert_eq!(file, "apiKey=X&unadjusted=false.json");
    }

    #[test]
    fn credential_value_never_reaches_the_key() {
        let root = Path::new("/cache");
        let a = entry_path(root, &url("https://h/x?apiKey=first&b=1"));
        let b = entry_path(root, &url("https://h/x?apiKey=rotated&b=1"));
        assert_eq!(a, b);
        assert!(!a.1.contains("first"));
    }

    #[test]
    fn query_parameters_are_sorted() {
        let (_, file) = entry_path(Path::new("/c"), &url("https://h/x?z=1&a=2&apiKey=k"));
        assert_eq!(file, "a=2&apiKey=X&z=1.json");
    }

    #[test]
    fn credential_parameter_is_added_when_absent() {
        let (_, file) = entry_path(Path::new("/c"), &url("https://h/x?a=1"));
        assert_eq!(file, "a=1&apiKey=X.json");
    }

    #[test]
    fn memory_store_round_trips() {
        let cache = FileCache::with_io("/c", Box::new(MemoryCacheIo::default()));
        let key = url("https://h/v1/thing?apiKey=k");

        assert!(cache.get(&key).unwrap().is_none());
        cache.save(&key, &response(b"payload")).unwrap();
        let hit = cache.get(&key).unwrap().unwrap();
        assert_eq!(hit.body, b"payload");
    }

    #[test]
    fn rewriting_a_key_is_idempotent() {
        let cache = FileCache::with_io("/c", Box::new(MemoryCacheIo::default()));
        let key = url("https://h/v1/thing?apiKey=k");

        cache.save(&key, &response(b"same")).unwrap();
        cache.save(&key, &response(b"same")).unwrap();
        assert_eq!(cache.get(&key).unwrap().unwrap().body, b"same");
    }
}
