//! Event handlers, one module per emitting contract.

pub mod members;
pub mod plugin;
pub mod setup_processor;
