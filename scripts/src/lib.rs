//! Scripts for deploying the Admin plugin and publishing it to its plugin
//! repo.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod ens;
pub mod errors;
pub mod metadata;
pub mod networks;
pub mod solidity;
pub mod utils;
pub mod version;
pub mod wrapper;
