use std::path::PathBuf;

use clap::ArgMatches;
use tracing::info;

use harbor_core::config::Config;
use harbor_core::library::BundleLibrary;

pub fn handle_install_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let source = PathBuf::from(
        matches
            .get_one::<String>("path")
            .expect("path is required"),
    );
    if !source.is_dir() {
        return Err(format!("'{}' is not a directory", source.display()).into());
    }

    let bundle_id = match matches.get_one::<String>("id") {
        Some(id) => id.clone(),
        None => source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or("Cannot derive a bundle id from the source path; pass --id")?,
    };

    let config = Config::new();
    let library = BundleLibrary::from_config(&config);
    let installed = library.install(&bundle_id, &source)?;

    info!(
        event = "cli.install.completed",
        bundle_id = bundle_id,
        source = %source.display(),
    );
    println!("Installed {} ({})", installed.display_name, bundle_id);
    Ok(())
}
