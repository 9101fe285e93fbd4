//! Type definitions for Mechanic extension records and local installs

mod extension_types;
mod manifest_types;

pub use extension_types::*;
pub use manifest_types::*;
