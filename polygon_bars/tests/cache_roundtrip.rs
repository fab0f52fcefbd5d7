//! On-disk behavior of the response cache: round-trips, key normalization,
//! atomic publication.

use std::path::{Path, PathBuf};

use polygon_bars::cache::FileCache;
use polygon_bars::cache::response::RawResponse;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

fn sample_response() -> RawResponse {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    RawResponse {
        status: StatusCode::OK,
        headers,
        body: br#"{"results":[{"o":1.5E2,"c":150,"h":151,"l":149,"v":10,"t":1546419600000}]}"#
            .to_vec(),
    }
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                found.push(path);
            }
        }
    }
    found
}

#[test]
fn saved_entries_read_back_byte_identical() {
    let root = tempfile::tempdir().unwrap();
    let cache = FileCache::new(root.path());
    let key = Url::parse("https://api.polygon.io/v2/aggs/ticker/AAPL/range/1/hour/2019-01-01/2019-01-02?unadjusted=false&apiKey=live-key").unwrap();

    assert!(cache.get(&key).unwrap().is_none());

    let response = sample_response();
    cache.save(&key, &response).unwrap();

    let hit = cache.get(&key).unwrap().unwrap();
    assert_eq!(hit.status, response.status);
    assert_eq!(hit.headers, response.headers);
    assert_eq!(hit.body, response.body);
}

#[test]
fn credential_rotation_reads_the_same_entry() {
    let root = tempfile::tempdir().unwrap();
    let cache = FileCache::new(root.path());
    let original = Url::parse("https://h/v1/x?apiKey=old&a=1").unwrap();
    let rotated = Url::parse("https://h/v1/x?apiKey=new&a=1").unwrap();

    cache.save(&original, &sample_response()).unwrap();
    let hit = cache.get(&rotated).unwrap().unwrap();
    assert_eq!(hit.body, sample_response().body);
}

#[test]
fn publication_leaves_exactly_one_file_and_no_temp_debris() {
    let root = tempfile::tempdir().unwrap();
    let cache = FileCache::new(root.path());
    let key = Url::parse("https://h/v1/x?apiKey=k&a=1").unwrap();

    cache.save(&key, &sample_response()).unwrap();
    // Rewriting the same key republishes the same bytes.
    cache.save(&key, &sample_response()).unwrap();

    let files = files_under(root.path());
    assert_eq!(files.len(), 1, "unexpected files: {files:?}");
    let name = files[0].file_name().unwrap().to_str().unwrap();
    assert!(name.ends_with(".json"));
    assert!(name.contains("apiKey=X"), "credential not normalized: {name}");
    assert!(!name.contains("apiKey=k"));
}

#[test]
fn interrupted_write_never_exposes_a_partial_entry() {
    let root = tempfile::tempdir().unwrap();
    let cache = FileCache::new(root.path());
    let key = Url::parse("https://h/v1/x?apiKey=k&a=1").unwrap();

    let complete = sample_response();
    cache.save(&key, &complete).unwrap();
    let entry = files_under(root.path()).pop().unwrap();
    let entry_dir = entry.parent().unwrap().to_path_buf();

    // A writer dying mid-write: temp file in the entry directory, a few
    // bytes written, dropped before the rename ever happens.
    {
        use std::io::Write;
        let mut dying = tempfile::NamedTempFile::new_in(&entry_dir).unwrap();
        dying.write_all(b"HTTP/1.1 2").unwrap();
    }

    // The final path still serves the complete prior entry.
    let hit = cache.get(&key).unwrap().unwrap();
    assert_eq!(hit.status, complete.status);
    assert_eq!(hit.headers, complete.headers);
    assert_eq!(hit.body, complete.body);

    // Nothing partial is visible anywhere under the cache root.
    let files = files_under(root.path());
    assert_eq!(files.len(), 1, "interrupted write left debris: {files:?}");
    assert_eq!(files[0], entry);
}

#[test]
fn directory_layout_follows_the_request_url() {
    let root = tempfile::tempdir().unwrap();
    let cache = FileCache::new(root.path());
    let key = Url::parse("https://api.polygon.io/v2/aggs/ticker/AAPL/range/1/hour/2019-01-01/2019-01-02?apiKey=k").unwrap();

    cache.save(&key, &sample_response()).unwrap();

    let expected = root
        .path()
        .join("https/api.polygon.io/v2/aggs/ticker/AAPL/range/1/hour/2019-01-01/2019-01-02");
    assert!(expected.is_dir(), "missing {expected:?}");
}

#[test]
fn truncated_entries_fail_to_parse_instead_of_passing_through() {
    let root = tempfile::tempdir().unwrap();
    let cache = FileCache::new(root.path());
    let key = Url::parse("https://h/v1/x?apiKey=k").unwrap();

    cache.save(&key, &sample_response()).unwrap();
    let files = files_under(root.path());
    std::fs::write(&files[0], b"HTTP/1.1 200").unwrap();

    assert!(cache.get(&key).is_err());
}
