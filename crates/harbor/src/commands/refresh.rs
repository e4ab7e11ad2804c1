use std::sync::Arc;

use clap::ArgMatches;
use tokio::sync::mpsc;
use tracing::info;

use harbor_core::config::{Config, HarborConfig};
use harbor_core::launcher::{ProcessLauncher, SubprocessHost};
use harbor_core::library::BundleLibrary;
use harbor_core::refresh::RefreshCoordinator;

pub fn handle_refresh_command(_matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    let harbor_config = HarborConfig::load_hierarchy()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let library = BundleLibrary::from_config(&config);
        let (interruption_tx, mut interruptions) = mpsc::unbounded_channel();
        let host = Arc::new(SubprocessHost::new(library, interruption_tx));
        let launcher = ProcessLauncher::new(host, &harbor_config.launcher);
        let coordinator = RefreshCoordinator::new();

        coordinator
            .refresh_all(
                &launcher,
                &mut interruptions,
                harbor_config.library.selected_app.clone(),
                |value| {
                    eprintln!("Refreshing... {:.0}%", value * 100.0);
                },
            )
            .await?;

        info!(event = "cli.refresh.completed");
        println!("All apps have been refreshed.");
        Ok(())
    })
}
