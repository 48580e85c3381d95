//! Common types and constants shared between the deploy scripts and the
//! subgraph handlers for the Admin plugin.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod constants;
pub mod types;
