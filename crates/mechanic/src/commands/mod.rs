//! CLI command implementations

pub mod action;
pub mod check;
pub mod list;
pub mod settings;
pub mod single;
pub mod stream;

mod session;
