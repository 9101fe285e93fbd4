//! Common test utilities for mechanic-extensions
//!
//! This module provides shared test infrastructure including:
//! - Constants for stream URLs and extension names
//! - Record builders for creating catalog fixtures
//! - A recording mock extension host
//! - Stream documents and descriptor files

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod fixtures;
pub mod mocks;

pub use builders::*;
pub use constants::*;
pub use fixtures::*;
pub use mocks::*;
