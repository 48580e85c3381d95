//! Implementations of the various deploy scripts

use std::fs;

use alloy::{
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider},
    sol_types::SolCall,
};
use itertools::Itertools;
use plugin_common::{
    constants::{
        permission_id, MAINTAINER_PERMISSION_NAME, PLUGIN_CONTRACT_NAME,
        PLUGIN_REPO_ENS_SUBDOMAIN, PLUGIN_SETUP_CONTRACT_NAME,
    },
    types::{CreateVersionArgs, ProposalAction, ProposalPayload, VersionTag},
};
use tracing::info;

use crate::{
    cli::{DeployArgs, DeployTag, PublishArgs, UpgradeArgs},
    constants::{
        IMPERSONATION_BALANCE_WEI, PLACEHOLDER_BUILD_METADATA, PLACEHOLDER_RELEASE_METADATA,
        PLUGIN_REPO_ARTIFACT, PLUGIN_REPO_RECORD_NAME, PROPOSAL_DATA_FILE_PREFIX,
    },
    ens::{find_plugin_repo, framework_supports_ens},
    errors::ScriptError,
    metadata::{metadata_bytes, upload_metadata, MetadataUris},
    networks::{known_contracts, Network},
    solidity::{PluginRepo, PluginRepoFactory, PluginRepoRegistry, PluginSetup},
    utils::{find_event, require_valid_address, setup_bare_provider, DeployedContract},
    version::{
        past_version_created_events, plan_publication, version_already_published, PublishStep,
    },
    wrapper::{DeployOptions, Deployer},
};

/// The fatal error raised when no management DAO address can be resolved
const INVALID_MANAGEMENT_DAO: &str =
    "Management DAO address in .env is not defined or is not a valid address (is not an address or is address zero)";

/// The fatal error raised when no plugin repo factory address can be
/// resolved
const INVALID_REPO_FACTORY: &str =
    "Plugin Repo Factory address in .env is not defined or is not a valid address (is not an address or is address zero)";

/// The fatal error raised when no placeholder setup is known on the network
const MISSING_PLACEHOLDER_SETUP: &str = "Aborting. Placeholder setup not present in this network";

/// A contract queued for source verification
#[derive(Clone, Debug)]
pub struct VerifyEntry {
    /// The contract name as the verifier knows it
    pub name: String,
    /// The deployed address
    pub address: Address,
}

/// Contracts deployed during a run, queued for source verification.
///
/// Verification itself happens out of band; the queue is logged at the end
/// of the run so operators know what to submit.
#[derive(Default)]
pub struct VerifyQueue {
    /// The queued contracts in deployment order
    entries: Vec<VerifyEntry>,
}

impl VerifyQueue {
    /// Queues a contract for verification
    pub fn push(&mut self, name: &str, address: Address) {
        self.entries.push(VerifyEntry {
            name: name.to_string(),
            address,
        });
    }

    /// Whether any contracts are queued
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Logs the queued contracts
    pub fn log(&self) {
        if self.entries.is_empty() {
            return;
        }

        let entries = self
            .entries
            .iter()
            .map(|entry| format!("{} at {}", entry.name, entry.address))
            .join(", ");
        info!("contracts to verify: {entries}");
    }
}

/// Shared state the deploy commands run against
pub struct ScriptContext {
    /// The deployment wrapper for the target network
    pub deployer: Deployer,
    /// The production network framework addresses are resolved against
    pub production: Network,
    /// The RPC URL the deployer's provider is connected to
    pub rpc_url: String,
    /// An explicit plugin repo address overriding discovery
    pub plugin_repo_override: Option<String>,
    /// An explicit management DAO address override
    pub management_dao_override: Option<String>,
    /// An explicit plugin repo factory address override
    pub repo_factory_override: Option<String>,
    /// An explicit placeholder setup address override
    pub placeholder_setup_override: Option<String>,
    /// The Pinata JWT metadata uploads authenticate with
    pub pinata_jwt: Option<String>,
    /// Whether to skip metadata uploads and publish empty URIs instead
    pub simulate_metadata: bool,
    /// Contracts queued for source verification
    pub verify_queue: VerifyQueue,
}

impl ScriptContext {
    /// The network the commands run against
    pub fn network(&self) -> Network {
        self.deployer.network()
    }

    /// The plugin repo factory creating repos for the framework
    fn repo_factory(&self) -> Result<Address, ScriptError> {
        resolve_address(
            self.repo_factory_override.as_deref(),
            known_contracts(self.production).plugin_repo_factory,
            INVALID_REPO_FACTORY,
        )
    }

    /// The DAO governing the framework deployment
    fn management_dao(&self) -> Result<Address, ScriptError> {
        resolve_address(
            self.management_dao_override.as_deref(),
            known_contracts(self.production).management_dao,
            INVALID_MANAGEMENT_DAO,
        )
    }

    /// The placeholder setup published when backfilling skipped builds
    fn placeholder_setup(&self) -> Result<Address, ScriptError> {
        resolve_address(
            self.placeholder_setup_override.as_deref(),
            known_contracts(self.production).placeholder_setup,
            MISSING_PLACEHOLDER_SETUP,
        )
    }
}

/// Resolves a framework address from an explicit override or the known
/// contracts of the production network, failing with `message` when neither
/// yields a usable address
fn resolve_address(
    override_raw: Option<&str>,
    known: Option<Address>,
    message: &str,
) -> Result<Address, ScriptError> {
    let address = match override_raw {
        Some(raw) => raw.parse::<Address>().ok(),
        None => known,
    };
    require_valid_address(address, message)
}

/// Creates the plugin repo through the repo factory, unless one is already
/// discoverable on the network
pub async fn create_repo(ctx: &mut ScriptContext) -> Result<(), ScriptError> {
    let factory_address = ctx.repo_factory()?;
    let (existing, ens_domain) = find_plugin_repo(
        &ctx.deployer,
        factory_address,
        ctx.plugin_repo_override.as_deref(),
    )
    .await?;

    if let Some(repo) = existing {
        info!("plugin repo already deployed at {repo} ({ens_domain}), skipping");
        ctx.verify_queue.push(PLUGIN_REPO_ARTIFACT, repo);
        return Ok(());
    }

    // Frameworks without an ENS registrar register repos under an empty
    // subdomain
    let subdomain = if framework_supports_ens(factory_address, ctx.deployer.provider()).await? {
        PLUGIN_REPO_ENS_SUBDOMAIN
    } else {
        ""
    };

    let factory = PluginRepoFactory::new(factory_address, ctx.deployer.provider().clone());
    let receipt = factory
        .createPluginRepo(subdomain.to_string(), ctx.deployer.sender())
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let registered = find_event::<PluginRepoRegistry::PluginRepoRegistered>(&receipt)
        .ok_or_else(|| {
            ScriptError::InvariantViolation(
                "repo creation receipt has no PluginRepoRegistered event".to_string(),
            )
        })?;
    let repo = registered.pluginRepo;

    let artifact = ctx.deployer.artifact(PLUGIN_REPO_ARTIFACT)?;
    let record = DeployedContract {
        address: repo,
        abi: artifact.abi.clone(),
        transaction_hash: receipt.transaction_hash,
        receipt: serde_json::to_value(&receipt).map_err(|e| ScriptError::Serde(e.to_string()))?,
    };
    ctx.deployer.record_deployment(PLUGIN_REPO_RECORD_NAME, &record)?;
    ctx.verify_queue.push(PLUGIN_REPO_ARTIFACT, repo);

    info!("created {PLUGIN_CONTRACT_NAME} plugin repo at {repo} with ENS domain '{ens_domain}'");
    Ok(())
}

/// Deploys the plugin setup contract, reusing an existing record when one
/// is present on this network
pub async fn deploy_setup(ctx: &mut ScriptContext) -> Result<(), ScriptError> {
    let record = match ctx.deployer.deployment(PLUGIN_SETUP_CONTRACT_NAME)? {
        Some(existing) => {
            info!(
                "{PLUGIN_SETUP_CONTRACT_NAME} already deployed at {}, skipping",
                existing.address
            );
            existing
        },
        None => {
            ctx.deployer
                .deploy(PLUGIN_SETUP_CONTRACT_NAME, DeployOptions::default())
                .await?
        },
    };

    // The setup deploys the plugin implementation base in its constructor,
    // both get queued for verification
    let setup = PluginSetup::new(record.address, ctx.deployer.provider().clone());
    let implementation = setup
        .implementation()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    ctx.verify_queue.push(PLUGIN_SETUP_CONTRACT_NAME, record.address);
    ctx.verify_queue.push(PLUGIN_CONTRACT_NAME, implementation);
    Ok(())
}

/// Publishes the plugin setup as a new version in the plugin repo.
///
/// The signer must hold the repo's maintainer permission. Without it, and
/// off local networks, the `createVersion` action is serialized into a
/// proposal payload file for the management DAO to execute instead.
pub async fn publish(args: PublishArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let target = VersionTag::new(args.release, args.build);
    info!(
        "publishing {PLUGIN_SETUP_CONTRACT_NAME} as v{target} in the '{PLUGIN_REPO_ENS_SUBDOMAIN}' plugin repo"
    );

    let factory = ctx.repo_factory()?;
    let (repo_address, ens_domain) =
        find_plugin_repo(&ctx.deployer, factory, ctx.plugin_repo_override.as_deref()).await?;
    let repo_address = repo_address.ok_or_else(|| {
        ScriptError::Precondition(format!("PluginRepo '{ens_domain}' does not exist yet"))
    })?;

    let provider = ctx.deployer.provider();

    // Skip when the target version has already been published
    let past_events = past_version_created_events(repo_address, provider).await?;
    if version_already_published(&past_events, target) {
        info!(
            "build number {} has already been published for release {}, skipping publication",
            target.build, target.release
        );
        return Ok(());
    }

    let repo = PluginRepo::new(repo_address, provider.clone());
    let latest_release = repo
        .latestRelease()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    let latest_build = repo
        .buildCount(target.release)
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .to::<u16>();

    // Validate the target version before anything is uploaded or sent
    let steps = plan_publication(latest_release, latest_build, target)?;

    let uris = upload_metadata(ctx.network(), ctx.simulate_metadata, ctx.pinata_jwt.as_deref())
        .await?;
    info!("release metadata at {}", uris.release);
    info!("build metadata at {}", uris.build);

    let setup = ctx
        .deployer
        .deployment(PLUGIN_SETUP_CONTRACT_NAME)?
        .ok_or_else(|| ScriptError::Precondition("setup deployment unavailable".to_string()))?;

    let maintainer_id = permission_id(MAINTAINER_PERMISSION_NAME);
    let deployer_is_maintainer = repo
        .isGranted(
            repo_address,
            ctx.deployer.sender(),
            maintainer_id,
            Bytes::new(),
        )
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    // A deployer without the maintainer permission impersonates the
    // management DAO on local networks, where the node signs for it
    let signer = if deployer_is_maintainer || !ctx.network().is_local() {
        PublishSigner {
            provider: provider.clone(),
            address: ctx.deployer.sender(),
        }
    } else {
        management_dao_signer(ctx).await?
    };

    let signer_is_maintainer = repo
        .isGranted(repo_address, signer.address, maintainer_id, Bytes::new())
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if signer_is_maintainer {
        // The placeholder must be known up front, a network without one
        // cannot backfill skipped builds
        let placeholder = ctx.placeholder_setup()?;

        let mut placeholders_published = 0usize;
        for step in steps {
            match step {
                PublishStep::Placeholder => {
                    placeholders_published += 1;
                    info!("publishing placeholder {placeholders_published}");
                    create_version(
                        repo_address,
                        &signer,
                        target.release,
                        placeholder,
                        PLACEHOLDER_RELEASE_METADATA,
                        PLACEHOLDER_BUILD_METADATA,
                    )
                    .await?;
                },
                PublishStep::Setup => {
                    create_version(
                        repo_address,
                        &signer,
                        target.release,
                        setup.address,
                        &uris.release,
                        &uris.build,
                    )
                    .await?;
                },
            }
        }

        // Read back the latest version, a release mismatch means the repo
        // ended up in an unexpected state
        let latest = repo
            .getLatestVersion(target.release)
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if latest.tag.release != target.release {
            return Err(ScriptError::InvariantViolation(
                "something went wrong".to_string(),
            ));
        }

        info!(
            "published {PLUGIN_SETUP_CONTRACT_NAME} at {} in PluginRepo {ens_domain} at {repo_address}",
            setup.address
        );
    } else {
        let payload =
            build_proposal_payload(repo_address, setup.address, target, &uris, &ens_domain);
        let path = proposal_data_file(ctx.network());
        let serialized = serde_json::to_string_pretty(&payload)
            .map_err(|e| ScriptError::Serde(e.to_string()))?;
        fs::write(&path, serialized).map_err(|e| ScriptError::WriteFile(e.to_string()))?;

        info!(
            "saved proposal data to '{path}', use it to create a proposal on the management DAO calling createVersion on the {ens_domain} plugin repo at {repo_address}"
        );
    }

    Ok(())
}

/// Upgrades a recorded UUPS proxy to a freshly deployed implementation
pub async fn upgrade(args: UpgradeArgs, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
    let call = match args.calldata {
        Some(raw) => raw
            .parse::<Bytes>()
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?,
        None => Bytes::new(),
    };

    let record = ctx.deployer.upgrade(&args.contract, &args.artifact, call).await?;
    ctx.verify_queue.push(&args.artifact, record.address);
    Ok(())
}

/// Runs the deploy pipeline, or only the steps selected by `--tags`
pub async fn deploy(args: DeployArgs, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
    if run_tag(&args.tags, DeployTag::CreateRepo) {
        create_repo(ctx).await?;
    }

    if run_tag(&args.tags, DeployTag::NewVersion) {
        deploy_setup(ctx).await?;
        publish(args.version, ctx).await?;
    }

    Ok(())
}

/// Whether the pipeline step selected by `tag` should run; an empty tag
/// list selects every step
fn run_tag(tags: &[DeployTag], tag: DeployTag) -> bool {
    tags.is_empty() || tags.contains(&tag)
}

/// The account `createVersion` transactions are sent from
struct PublishSigner {
    /// The provider the transactions go through
    provider: DynProvider,
    /// The sending address
    address: Address,
}

/// Impersonates the management DAO on a local node, funding it so it can
/// send `createVersion` transactions directly
async fn management_dao_signer(ctx: &ScriptContext) -> Result<PublishSigner, ScriptError> {
    let dao = ctx.management_dao()?;

    // A bare provider lets the node sign for the impersonated account
    // instead of the deployer key. The node's replies differ in shape, so
    // they are read as raw values and dropped.
    let provider = setup_bare_provider(&ctx.rpc_url).await?;
    provider
        .raw_request::<_, serde_json::Value>("hardhat_impersonateAccount".into(), (dao,))
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    provider
        .raw_request::<_, serde_json::Value>(
            "hardhat_setBalance".into(),
            (dao, format!("0x{:x}", IMPERSONATION_BALANCE_WEI)),
        )
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    info!("impersonating management DAO {dao}");
    Ok(PublishSigner {
        provider,
        address: dao,
    })
}

/// Sends a single `createVersion` and requires its `VersionCreated` event
async fn create_version(
    repo: Address,
    signer: &PublishSigner,
    release: u8,
    setup: Address,
    release_metadata_uri: &str,
    build_metadata_uri: &str,
) -> Result<(), ScriptError> {
    let instance = PluginRepo::new(repo, signer.provider.clone());
    let receipt = instance
        .createVersion(
            release,
            setup,
            metadata_bytes(build_metadata_uri),
            metadata_bytes(release_metadata_uri),
        )
        .from(signer.address)
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    find_event::<PluginRepo::VersionCreated>(&receipt).ok_or_else(|| {
        ScriptError::InvariantViolation(
            "createVersion receipt has no VersionCreated event".to_string(),
        )
    })?;

    Ok(())
}

/// Builds the `createVersion` proposal payload a management DAO member
/// submits when the deployer cannot publish directly
fn build_proposal_payload(
    repo: Address,
    setup: Address,
    target: VersionTag,
    uris: &MetadataUris,
    ens_domain: &str,
) -> ProposalPayload {
    let build_metadata = metadata_bytes(&uris.build);
    let release_metadata = metadata_bytes(&uris.release);

    let call = PluginRepo::createVersionCall {
        release: target.release,
        pluginSetup: setup,
        buildMetadata: build_metadata.clone(),
        releaseMetadata: release_metadata.clone(),
    };

    ProposalPayload {
        proposal_title: format!("Publish '{PLUGIN_CONTRACT_NAME}' plugin v{target}"),
        proposal_summary: format!(
            "Publishes v{target} of the '{PLUGIN_CONTRACT_NAME}' plugin in the '{ens_domain}' plugin repo."
        ),
        proposal_description: format!(
            "Publishes the '{PLUGIN_SETUP_CONTRACT_NAME}' deployed at '{setup}' as v{target} in the '{ens_domain}' plugin repo at '{repo}', with release metadata '{}' and (immutable) build metadata '{}'.",
            uris.release, uris.build,
        ),
        actions: vec![ProposalAction {
            to: repo,
            create_version: CreateVersionArgs {
                release: target.release,
                plugin_setup: setup,
                build_metadata,
                release_metadata,
            },
            calldata: call.abi_encode().into(),
        }],
    }
}

/// The proposal payload file for a network, written into the working
/// directory
fn proposal_data_file(network: Network) -> String {
    format!("{PROPOSAL_DATA_FILE_PREFIX}-{}.json", network.name())
}
