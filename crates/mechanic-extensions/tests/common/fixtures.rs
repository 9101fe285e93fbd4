//! Stream documents, descriptor files and mock stream servers

#![allow(dead_code)]

use super::constants::*;
use mechanic_core::config::{SingleExtensionEntry, SourceDescriptor};
use mechanic_extensions::SourceFetcher;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn test_fetcher() -> SourceFetcher {
    SourceFetcher::new(TEST_HTTP_TIMEOUT).unwrap()
}

/// Stream document wrapping `items` under `extensions`
pub fn stream_document(items: Vec<Value>) -> Value {
    json!({ "extensions": items })
}

/// Write a stream document into `dir` and return its path
pub fn write_stream(dir: &TempDir, file_name: &str, document: &Value) -> PathBuf {
    let path = dir.path().join(file_name);
    std::fs::write(&path, serde_json::to_string_pretty(document).unwrap()).unwrap();
    path
}

/// Write a single-extension YAML descriptor into `dir`
pub fn write_descriptor(dir: &TempDir, file_name: &str, yaml: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    std::fs::write(&path, yaml).unwrap();
    path
}

pub fn descriptor_yaml(name: &str, version: &str) -> String {
    format!(
        "extensionName: {}\ndeveloper: Local Dev\ntags:\n  - local\ndescription: Built here\nversion: \"{}\"\n",
        name, version
    )
}

pub fn stream_source(url: &str) -> SourceDescriptor {
    SourceDescriptor::Stream {
        url: url.to_string(),
        is_store: false,
    }
}

pub fn store_source(url: &str) -> SourceDescriptor {
    SourceDescriptor::Stream {
        url: url.to_string(),
        is_store: true,
    }
}

pub fn path_source(path: &Path) -> SourceDescriptor {
    stream_source(&path.display().to_string())
}

pub fn single_source(path: &Path, name: &str) -> SourceDescriptor {
    SourceDescriptor::SingleExtension(SingleExtensionEntry {
        path: path.to_path_buf(),
        name: name.to_string(),
    })
}

/// Serve a stream document at `route`
pub async fn mock_stream(server: &MockServer, route: &str, document: &Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(document))
        .mount(server)
        .await;
}

/// Serve an error status at `route`
pub async fn mock_failing_stream(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve a body that is not JSON at `route`
pub async fn mock_garbage_stream(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a stream</html>"))
        .mount(server)
        .await;
}
