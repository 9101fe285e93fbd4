//! Test constants for mechanic-extensions tests

#![allow(dead_code)]

use std::time::Duration;

/// HTTP timeout used by test fetchers
pub const TEST_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Store stream used by in-memory fixtures
pub const STORE_STREAM: &str = "http://store.test/data.json";

/// Repository stream used by in-memory fixtures
pub const REPO_STREAM: &str = "https://repo.test/registry.json";

/// Second repository stream
pub const OTHER_STREAM: &str = "https://other.test/registry.json";

/// Path of mocked stream documents on the wiremock server
pub const STREAM_PATH: &str = "/api/v2/registry.json";

pub const STORE_PATH: &str = "/data.json";

pub const DEFAULT_DEVELOPER: &str = "Alice";
