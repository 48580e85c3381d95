use std::path::PathBuf;

use clap::Parser;
use scripts::{
    cli::Cli,
    commands::{ScriptContext, VerifyQueue},
    errors::ScriptError,
    networks::Network,
    utils::setup_client,
    wrapper::Deployer,
};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        priv_key,
        network,
        alchemy_api_key,
        rpc_url,
        artifacts_path,
        deployments_path,
        production_network,
        plugin_repo,
        management_dao,
        plugin_repo_factory,
        placeholder_setup,
        pinata_jwt,
        simulate_metadata,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let network = network
        .parse::<Network>()
        .map_err(ScriptError::Precondition)?;
    let rpc_url = match rpc_url {
        Some(url) => url,
        None => network.rpc_url(alchemy_api_key.as_deref())?,
    };

    let (provider, sender) = setup_client(&priv_key, &rpc_url).await?;
    let deployer = Deployer::new(
        network,
        provider,
        sender,
        PathBuf::from(artifacts_path),
        PathBuf::from(deployments_path),
    )
    .await?;

    let mut ctx = ScriptContext {
        deployer,
        production: network.production(production_network.as_deref())?,
        rpc_url,
        plugin_repo_override: plugin_repo,
        management_dao_override: management_dao,
        repo_factory_override: plugin_repo_factory,
        placeholder_setup_override: placeholder_setup,
        pinata_jwt,
        simulate_metadata,
        verify_queue: VerifyQueue::default(),
    };

    command.run(&mut ctx).await?;
    ctx.verify_queue.log();

    Ok(())
}
