//! Metadata upload.
//!
//! Release and build metadata are pinned to IPFS through Pinata and
//! published on chain as the UTF-8 bytes of their `ipfs://` URIs. Local
//! networks and simulated runs skip the upload and publish the empty URI
//! placeholder instead.

use alloy::primitives::Bytes;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        BUILD_METADATA, BUILD_METADATA_PIN_NAME, EMPTY_METADATA_URI, PINATA_PIN_JSON_URL,
        RELEASE_METADATA, RELEASE_METADATA_PIN_NAME,
    },
    errors::ScriptError,
    networks::Network,
};

/// The metadata URIs of a publication
#[derive(Clone, Debug)]
pub struct MetadataUris {
    /// The release metadata URI
    pub release: String,
    /// The build metadata URI
    pub build: String,
}

/// The byte encoding of a metadata URI as published on chain, the UTF-8
/// bytes of the URI string itself.
///
/// The empty URI placeholder `0x` is no exception, it publishes as the two
/// bytes `0x3078`.
pub fn metadata_bytes(uri: &str) -> Bytes {
    uri.as_bytes().to_vec().into()
}

/// Uploads the release and build metadata for a publication, or
/// short-circuits to the empty URI on local networks and simulated runs
pub async fn upload_metadata(
    network: Network,
    simulate: bool,
    jwt: Option<&str>,
) -> Result<MetadataUris, ScriptError> {
    if network.is_local() || simulate {
        return Ok(MetadataUris {
            release: EMPTY_METADATA_URI.to_string(),
            build: EMPTY_METADATA_URI.to_string(),
        });
    }

    let jwt = jwt.ok_or_else(|| {
        ScriptError::Precondition(
            "a Pinata JWT is required to upload metadata on remote networks".to_string(),
        )
    })?;

    let client = PinataClient::new(jwt.to_string());
    let release = client
        .pin_json(RELEASE_METADATA, RELEASE_METADATA_PIN_NAME)
        .await?;
    let build = client.pin_json(BUILD_METADATA, BUILD_METADATA_PIN_NAME).await?;

    Ok(MetadataUris { release, build })
}

/// A client pinning JSON documents to IPFS through Pinata
pub struct PinataClient {
    /// The underlying HTTP client
    client: reqwest::Client,
    /// The JWT pin requests authenticate with
    jwt: String,
}

impl PinataClient {
    /// Constructor
    pub fn new(jwt: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            jwt,
        }
    }

    /// Pins a JSON document under the given pin name, returning its
    /// `ipfs://` URI
    pub async fn pin_json(&self, content: &str, name: &str) -> Result<String, ScriptError> {
        let content: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ScriptError::Serde(e.to_string()))?;
        let request = PinRequest::new(name, content);

        let response = self
            .client
            .post(PINATA_PIN_JSON_URL)
            .bearer_auth(&self.jwt)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScriptError::MetadataUpload(e.to_string()))?
            .error_for_status()
            .map_err(|e| ScriptError::MetadataUpload(e.to_string()))?
            .json::<PinResponse>()
            .await
            .map_err(|e| ScriptError::MetadataUpload(e.to_string()))?;

        Ok(format!("ipfs://{}", response.ipfs_hash))
    }
}

/// The body of a Pinata pin request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PinRequest {
    /// Pinning options
    pinata_options: PinOptions,
    /// The pin name shown in the Pinata dashboard
    pinata_metadata: PinMetadata,
    /// The document to pin
    pinata_content: serde_json::Value,
}

impl PinRequest {
    /// Builds a pin request for a document
    fn new(name: &str, content: serde_json::Value) -> Self {
        Self {
            pinata_options: PinOptions { cid_version: 0 },
            pinata_metadata: PinMetadata {
                name: name.to_string(),
            },
            pinata_content: content,
        }
    }
}

/// Pinata pinning options
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PinOptions {
    /// The CID version minted for the pin
    cid_version: u8,
}

/// The display metadata of a pin
#[derive(Debug, Serialize)]
struct PinMetadata {
    /// The pin name
    name: String,
}

/// The body of a successful Pinata pin response
#[derive(Debug, Deserialize)]
struct PinResponse {
    /// The content hash the document was pinned under
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[cfg(test)]
mod tests {
    use crate::{
        constants::{BUILD_METADATA, RELEASE_METADATA},
        networks::Network,
    };

    use super::{metadata_bytes, upload_metadata, PinRequest, PinResponse};

    #[test]
    fn test_metadata_bytes_utf8() {
        // The empty URI placeholder publishes as its own UTF-8 bytes
        assert_eq!(metadata_bytes("0x").as_ref(), &[0x30, 0x78]);

        let uri = "ipfs://QmaLkXhFtBbzfstN4eLveyvbLGrdNmFFpgJ64CMRoAttat";
        assert_eq!(metadata_bytes(uri).as_ref(), uri.as_bytes());
    }

    #[test]
    fn test_bundled_metadata_is_json() {
        serde_json::from_str::<serde_json::Value>(RELEASE_METADATA).unwrap();
        serde_json::from_str::<serde_json::Value>(BUILD_METADATA).unwrap();
    }

    #[test]
    fn test_pin_request_shape() {
        let request = PinRequest::new("admin-release-metadata", serde_json::json!({"name": "Admin"}));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["pinataOptions"]["cidVersion"], 0);
        assert_eq!(value["pinataMetadata"]["name"], "admin-release-metadata");
        assert_eq!(value["pinataContent"]["name"], "Admin");
    }

    #[test]
    fn test_pin_response_parsing() {
        let response: PinResponse =
            serde_json::from_str(r#"{"IpfsHash": "QmTest", "PinSize": 10, "Timestamp": "now"}"#)
                .unwrap();
        assert_eq!(response.ipfs_hash, "QmTest");
    }

    #[tokio::test]
    async fn test_upload_short_circuits_locally() {
        let uris = upload_metadata(Network::Localhost, false, None).await.unwrap();
        assert_eq!(uris.release, "0x");
        assert_eq!(uris.build, "0x");

        // Simulation skips the upload on remote networks too
        let uris = upload_metadata(Network::Sepolia, true, None).await.unwrap();
        assert_eq!(uris.release, "0x");
        assert_eq!(uris.build, "0x");
    }

    #[tokio::test]
    async fn test_upload_requires_jwt_remotely() {
        assert!(upload_metadata(Network::Sepolia, false, None).await.is_err());
    }
}
