//! CLI command implementations
//!
//! Handles all command-line interface operations:
//! - schema: Extract schema facts from migrations
//! - inventory: Inventory the source tree
//! - extract: Extract features from planning documents
//! - report: Reconcile saved fact artifacts into the progress report
//! - audit: Run the whole pipeline in one pass

mod artifacts;
mod commands;

pub use artifacts::*;
pub use commands::*;
