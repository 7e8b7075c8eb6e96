//! CLI command implementations.

pub mod common;
pub mod key;
pub mod replay;
