use std::sync::Arc;

use clap::ArgMatches;
use tokio::sync::mpsc;
use tracing::{error, info};

use harbor_core::config::{Config, HarborConfig};
use harbor_core::launcher::{ProcessLauncher, SubprocessHost};
use harbor_core::library::BundleLibrary;
use harbor_core::sessions::SessionRegistry;

pub fn handle_run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let bundle_ids: Vec<String> = matches
        .get_many::<String>("bundle-id")
        .expect("bundle-id is required")
        .cloned()
        .collect();
    let maximized = matches.get_flag("maximized");
    let container_override = matches.get_one::<String>("container").cloned();

    let config = Config::new();
    let harbor_config = HarborConfig::load_hierarchy()?;

    if !harbor_config.multitask.enabled && bundle_ids.len() > 1 {
        return Err(
            "Multitasking is disabled; launch a single app or enable [multitask] in config".into(),
        );
    }

    let mut multitask = harbor_config.multitask.clone();
    if maximized {
        multitask.launch_maximized = true;
    }

    let container_id = container_override
        .or_else(|| harbor_config.library.selected_container.clone())
        .unwrap_or_else(|| "default".to_string());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let library = BundleLibrary::from_config(&config);
        let (interruption_tx, mut interruptions) = mpsc::unbounded_channel();
        let host = Arc::new(SubprocessHost::new(library.clone(), interruption_tx));
        let launcher = ProcessLauncher::new(host, &harbor_config.launcher);
        let mut registry = SessionRegistry::new(multitask);

        for bundle_id in &bundle_ids {
            let display_name = match library.resolve(bundle_id) {
                Ok(resolved) => resolved.display_name,
                Err(e) => {
                    error!(event = "cli.run.resolve_failed", bundle_id = bundle_id, error = %e);
                    eprintln!("Cannot launch '{}': {}", bundle_id, e);
                    continue;
                }
            };

            let session_id = format!("{}:{}", bundle_id, container_id);
            let session =
                registry.get_or_create(&session_id, bundle_id, &container_id, &display_name);
            if let Err(e) = session.start(&launcher) {
                eprintln!("Cannot launch '{}': {}", bundle_id, e);
                continue;
            }
            match session.complete_launch(&launcher).await {
                Ok(()) => {
                    let pid = session.pid().map(|p| p.as_u32()).unwrap_or(0);
                    println!("Launched {} ({}) - pid {}", display_name, bundle_id, pid);
                }
                Err(e) => {
                    eprintln!("Launch of '{}' failed: {}", bundle_id, e);
                }
            }
        }

        if !registry.has_live_sessions() {
            return Err("No guest apps are running".into());
        }

        info!(
            event = "cli.run.sessions_started",
            count = registry.list_active().len(),
        );
        println!("Press Ctrl-C to terminate all guests.");

        // Owning loop: interruptions from background exit watchers are
        // applied to the registry here, never on the watcher tasks.
        loop {
            tokio::select! {
                Some(token) = interruptions.recv() => {
                    if let Some(session_id) = registry.handle_interruption(token) {
                        let session = registry.get(&session_id).expect("session still registered");
                        if session.window().exited_unexpectedly() {
                            println!("{} exited unexpectedly", session_id);
                        } else {
                            println!("{} terminated", session_id);
                        }
                    }
                    if !registry.has_live_sessions() {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("Terminating all guests...");
                    registry.terminate_all(&launcher);
                    if !registry.has_live_sessions() {
                        break;
                    }
                }
            }
        }

        harbor_core::events::log_app_shutdown();
        Ok(())
    })
}
