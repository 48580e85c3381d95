//! Definitions of CLI arguments and commands for deploy scripts

use clap::{Args, Parser, Subcommand, ValueEnum};
use plugin_common::constants::TARGET_VERSION;

use crate::{
    commands::{create_repo, deploy, deploy_setup, publish, upgrade, ScriptContext},
    constants::{DEPLOYMENTS_DIR, PLUGIN_REPO_ARTIFACT, PLUGIN_REPO_RECORD_NAME},
    errors::ScriptError,
};

/// Deploys and publishes the Admin plugin
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PRIVATE_KEY")]
    pub priv_key: String,

    /// Name of the network to deploy to
    #[arg(short, long, default_value = "localhost")]
    pub network: String,

    /// Alchemy API key remote RPC URLs are derived with
    #[arg(long, env = "ALCHEMY_API_KEY")]
    pub alchemy_api_key: Option<String>,

    /// Network RPC URL, overriding the URL derived from the network name
    #[arg(short, long)]
    pub rpc_url: Option<String>,

    /// Directory contract artifacts are loaded from
    #[arg(long, default_value = "artifacts")]
    pub artifacts_path: String,

    /// Directory deployment records are written to
    #[arg(long, default_value = DEPLOYMENTS_DIR)]
    pub deployments_path: String,

    /// Name of the production network framework addresses are resolved
    /// against when running locally
    #[arg(long, env = "NETWORK_NAME")]
    pub production_network: Option<String>,

    /// Plugin repo address, overriding discovery through records and ENS
    #[arg(long, env = "PLUGIN_REPO_ADDRESS")]
    pub plugin_repo: Option<String>,

    /// Management DAO address, overriding the known framework contracts
    #[arg(long, env = "MANAGEMENT_DAO_ADDRESS")]
    pub management_dao: Option<String>,

    /// Plugin repo factory address, overriding the known framework
    /// contracts
    #[arg(long, env = "PLUGIN_REPO_FACTORY_ADDRESS")]
    pub plugin_repo_factory: Option<String>,

    /// Placeholder setup address, overriding the known framework contracts
    #[arg(long, env = "PLACEHOLDER_SETUP_ADDRESS")]
    pub placeholder_setup: Option<String>,

    /// Pinata JWT metadata uploads authenticate with
    #[arg(long, env = "PINATA_JWT")]
    pub pinata_jwt: Option<String>,

    /// Skip metadata uploads and publish empty metadata URIs instead
    #[arg(long)]
    pub simulate_metadata: bool,

    /// The deploy command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deploy commands
#[derive(Subcommand)]
pub enum Command {
    /// Create the plugin repo unless one already exists
    CreateRepo,
    /// Deploy the plugin setup contract
    DeploySetup,
    /// Publish the plugin setup as a new version in the plugin repo
    Publish(PublishArgs),
    /// Upgrade a recorded UUPS proxy to a fresh implementation
    Upgrade(UpgradeArgs),
    /// Run the deploy pipeline
    Deploy(DeployArgs),
}

impl Command {
    /// Runs the command against the script context
    pub async fn run(self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        match self {
            Command::CreateRepo => create_repo(ctx).await,
            Command::DeploySetup => deploy_setup(ctx).await,
            Command::Publish(args) => publish(args, ctx).await,
            Command::Upgrade(args) => upgrade(args, ctx).await,
            Command::Deploy(args) => deploy(args, ctx).await,
        }
    }
}

/// Publish the plugin setup as a version in the plugin repo
#[derive(Args)]
pub struct PublishArgs {
    /// The release number to publish under
    #[arg(long, default_value_t = TARGET_VERSION.release)]
    pub release: u8,

    /// The build number to publish
    #[arg(long, default_value_t = TARGET_VERSION.build)]
    pub build: u16,
}

/// Upgrade a recorded UUPS proxy
#[derive(Args)]
pub struct UpgradeArgs {
    /// Name of the deployment record of the proxy to upgrade
    #[arg(long, default_value = PLUGIN_REPO_RECORD_NAME)]
    pub contract: String,

    /// Artifact of the new implementation contract
    #[arg(long, default_value = PLUGIN_REPO_ARTIFACT)]
    pub artifact: String,

    /// Optional calldata, in hex form, with which to call the
    /// implementation contract when upgrading
    #[arg(short, long)]
    pub calldata: Option<String>,
}

/// Run the deploy pipeline
#[derive(Args)]
pub struct DeployArgs {
    /// The pipeline steps to run, all of them when empty
    #[arg(long, value_enum)]
    pub tags: Vec<DeployTag>,

    /// The version published by the publication step
    #[command(flatten)]
    pub version: PublishArgs,
}

/// A step of the deploy pipeline, selected by tag
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeployTag {
    /// Create the plugin repo
    CreateRepo,
    /// Deploy the plugin setup and publish it as a version
    NewVersion,
}
