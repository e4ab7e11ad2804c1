use clap::ArgMatches;
use tracing::error;

use harbor_core::events;

mod apps;
mod completions;
mod install;
mod refresh;
mod run;
mod worker;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    match matches.subcommand() {
        Some(("run", sub_matches)) => run::handle_run_command(sub_matches),
        Some(("apps", sub_matches)) => apps::handle_apps_command(sub_matches),
        Some(("install", sub_matches)) => install::handle_install_command(sub_matches),
        Some(("refresh", sub_matches)) => refresh::handle_refresh_command(sub_matches),
        Some(("refresh-worker", sub_matches)) => worker::handle_worker_command(sub_matches),
        Some(("completions", sub_matches)) => completions::handle_completions_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
