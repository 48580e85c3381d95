//! Loading and encoding of compiled contract artifacts.
//!
//! Artifacts are the `{ abi, bytecode }` JSON files emitted by the Solidity
//! toolchain, read from the artifacts directory at runtime. Constructor and
//! function encoding goes through the dynamic ABI so that the scripts need
//! no compile-time bindings for contracts they only ever deploy.

use std::{fs, path::Path};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::Bytes,
};
use serde::Deserialize;

use crate::errors::ScriptError;

/// A compiled contract artifact
#[derive(Clone, Debug, Deserialize)]
pub struct ContractArtifact {
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: Bytes,
}

/// Parses an artifact from its JSON source
pub fn parse_artifact(raw: &str) -> Result<ContractArtifact, ScriptError> {
    serde_json::from_str(raw).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
}

/// Loads the artifact of the named contract from the artifacts directory
pub fn load_artifact(artifacts_dir: &Path, name: &str) -> Result<ContractArtifact, ScriptError> {
    let path = artifacts_dir.join(format!("{name}.json"));
    let raw = fs::read_to_string(&path)
        .map_err(|e| ScriptError::ReadFile(format!("artifact '{name}': {e}")))?;
    parse_artifact(&raw)
}

/// ABI-encodes the constructor arguments of an artifact, without the
/// bytecode prefix
pub fn constructor_input(
    artifact: &ContractArtifact,
    args: &[DynSolValue],
) -> Result<Vec<u8>, ScriptError> {
    match artifact.abi.constructor() {
        Some(constructor) => constructor
            .abi_encode_input(args)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string())),
        None if args.is_empty() => Ok(Vec::new()),
        None => Err(ScriptError::CalldataConstruction(
            "constructor arguments given for a contract without a constructor".to_string(),
        )),
    }
}

/// Builds the deployment data of an artifact, the creation bytecode followed
/// by the ABI-encoded constructor arguments
pub fn deploy_data(
    artifact: &ContractArtifact,
    args: &[DynSolValue],
) -> Result<Bytes, ScriptError> {
    let mut data = artifact.bytecode.to_vec();
    data.extend(constructor_input(artifact, args)?);
    Ok(data.into())
}

/// ABI-encodes a call to the named function, selector included.
///
/// Overloaded functions resolve to the first overload in the ABI, which is
/// sufficient for the framework contracts the scripts touch.
pub fn encode_function_data(
    abi: &JsonAbi,
    function: &str,
    args: &[DynSolValue],
) -> Result<Bytes, ScriptError> {
    let function = abi
        .function(function)
        .and_then(|overloads| overloads.first())
        .ok_or_else(|| {
            ScriptError::CalldataConstruction(format!("function '{function}' not in ABI"))
        })?;

    function
        .abi_encode_input(args)
        .map(Bytes::from)
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}
