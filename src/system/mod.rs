//! # System Integration Utilities
//!
//! Process-wide state shared by the containers and codecs.
//!
//! ## Features
//!
//! - **Global Context**: the process-wide reader-writer lock and fatal-error hook
//! - **Allocation Policy**: growth helpers that route allocation failure to the fatal hook

pub mod context;

pub use context::{Context, FatalHandler};
pub(crate) use context::reserve_or_die;
