use clap::ArgMatches;
use tracing::info;

use harbor_core::channel::ChannelBookmark;
use harbor_core::config::{Config, HarborConfig};
use harbor_core::library::BundleLibrary;
use harbor_core::refresh::run_worker;
use harbor_core::signing::{BundleSigner, CommandSigner};

/// Environment variable the hosting subsystem passes the channel bookmark
/// in when this process is launched as the builtin refresh helper.
const ENV_CHANNEL_BOOKMARK: &str = "HARBOR_CHANNEL_BOOKMARK";

pub fn handle_worker_command(_matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let bookmark = std::env::var(ENV_CHANNEL_BOOKMARK)
        .map(ChannelBookmark::new)
        .map_err(|_| format!("{} is not set; this command is launched by the host", ENV_CHANNEL_BOOKMARK))?;

    let config = Config::new();
    let harbor_config = HarborConfig::load_hierarchy()?;
    let library = BundleLibrary::from_config(&config);
    let signer = CommandSigner::from_config(&harbor_config.signing);

    info!(event = "cli.worker.started");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_worker(
        &bookmark,
        &library,
        signer.as_ref().map(|s| s as &dyn BundleSigner),
    ))?;
    Ok(())
}
