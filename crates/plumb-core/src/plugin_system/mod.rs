//! # Plumb Core Plugin System
//!
//! The host-facing layer on top of discovery. A [`PluginManager`] owns one
//! plugin kind: it runs the [`DiscoveryEngine`](crate::discovery::DiscoveryEngine),
//! expands derivatives, applies alter hooks and instantiates plugins from the
//! class table.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: the [`Plugin`] runtime contract, the [`PluginContext`]
//!   handed to constructors and the [`PluginBase`] helper.
//! - **[`registry`]**: the [`ClassRegistry`] (class reference to constructor)
//!   and the [`DeriverRegistry`].
//! - **[`derivative`]**: the [`Deriver`] contract and [`LabelVariantDeriver`].
//! - **[`manager`]**: the [`PluginManager`] trait and [`DefaultPluginManager`].
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod derivative;
pub mod error;
pub mod manager;
pub mod registry;
pub mod traits;

pub use derivative::{Deriver, LabelVariantDeriver};
pub use error::PluginSystemError;
pub use manager::{AlterHook, DefaultPluginManager, PluginManager};
pub use registry::{ClassRegistry, DeriverRegistry};
pub use traits::{Plugin, PluginBase, PluginConstructor, PluginContext};

#[cfg(test)]
mod tests;
