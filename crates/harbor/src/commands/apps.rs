use clap::ArgMatches;
use tracing::info;

use harbor_core::config::Config;
use harbor_core::library::BundleLibrary;

pub fn handle_apps_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    let library = BundleLibrary::from_config(&config);
    let bundles = library.list_bundles()?;

    info!(event = "cli.apps.listed", count = bundles.len());

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&bundles)?);
        return Ok(());
    }

    if bundles.is_empty() {
        println!("No apps installed. Use 'harbor install <path>' to add one.");
        return Ok(());
    }

    let id_width = bundles
        .iter()
        .map(|b| b.bundle_id.len())
        .max()
        .unwrap_or(0)
        .max("BUNDLE ID".len());

    println!("{:<id_width$}  NAME", "BUNDLE ID");
    for bundle in &bundles {
        println!("{:<id_width$}  {}", bundle.bundle_id, bundle.display_name);
    }

    Ok(())
}
