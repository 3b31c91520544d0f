//! # Plumb Core Kernel
//!
//! Shared foundations used by every other module of `plumb-core`.
//!
//! ## Key Components:
//!
//! - **Core Constants**: naming conventions for namespaces, cache buckets and
//!   the root plugin attribute, found in the `constants` submodule.
//! - **Error Handling**: the crate-wide [`Error`](error::Error) type that wraps
//!   each subsystem error, and the matching `Result` alias.
pub mod constants;
pub mod error;

pub use error::{Error, Result};
