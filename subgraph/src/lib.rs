//! Event handlers projecting Admin plugin chain events into queryable
//! entities, together with the entity store, deterministic id constructors,
//! and the per-data-source context plumbing the handlers run against.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod context;
pub mod entities;
pub mod events;
pub mod handlers;
pub mod ids;
pub mod runtime;
pub mod store;
