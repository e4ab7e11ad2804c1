use tracing::{info, warn};

use crate::channel::{ChannelBookmark, ChannelError, ProgressReporter};
use crate::library::{BundleLibrary, InstalledBundle};
use crate::refresh::REFRESH_ALL_ACTION;
use crate::refresh::errors::RefreshError;
use crate::signing::BundleSigner;
use crate::staging::BundleTransaction;

/// Helper-process entry point for one refresh operation.
///
/// Connects back to the host over the bookmarked channel, waits for its
/// instruction, then re-stages (and re-signs, when a signer is configured)
/// every installed bundle, reporting progress proportional to bundles
/// processed. Per-bundle failures cancel that bundle's transaction and are
/// reported to the host as a failure completion; they are not errors from
/// this function's point of view, since the channel delivered them.
pub async fn run_worker(
    bookmark: &ChannelBookmark,
    library: &BundleLibrary,
    signer: Option<&dyn BundleSigner>,
) -> Result<(), RefreshError> {
    let mut reporter = ProgressReporter::connect(bookmark).await?;

    let Some(action) = reporter.next_command().await? else {
        return Err(ChannelError::PeerDisconnected.into());
    };
    if action != REFRESH_ALL_ACTION {
        reporter
            .report_completion(Some(format!("unknown action '{}'", action)))
            .await?;
        return Ok(());
    }

    let bundles = match library.list_bundles() {
        Ok(bundles) => bundles,
        Err(e) => {
            reporter.report_completion(Some(e.to_string())).await?;
            return Ok(());
        }
    };

    info!(
        event = "core.refresh.worker_started",
        bundle_count = bundles.len(),
    );

    let total = bundles.len();
    for (index, bundle) in bundles.iter().enumerate() {
        if let Err(message) = refresh_bundle(bundle, signer) {
            warn!(
                event = "core.refresh.bundle_failed",
                bundle_id = bundle.bundle_id,
                error = %message,
            );
            reporter
                .report_completion(Some(format!("{}: {}", bundle.bundle_id, message)))
                .await?;
            return Ok(());
        }
        let value = (index + 1) as f64 / total as f64;
        reporter.report_progress(value).await?;
        info!(
            event = "core.refresh.bundle_refreshed",
            bundle_id = bundle.bundle_id,
            progress = value,
        );
    }

    reporter.report_completion(None).await?;
    Ok(())
}

fn refresh_bundle(bundle: &InstalledBundle, signer: Option<&dyn BundleSigner>) -> Result<(), String> {
    let mut txn = BundleTransaction::new(&bundle.path);
    let working = txn.begin().map_err(|e| e.to_string())?.to_path_buf();

    match signer {
        Some(signer) => {
            if let Err(e) = signer.sign_bundle(&working) {
                txn.cancel();
                return Err(e.to_string());
            }
        }
        None => {
            warn!(
                event = "core.refresh.signing_skipped",
                bundle_id = bundle.bundle_id,
                "No signing command configured; bundle re-staged unsigned"
            );
        }
    }

    txn.commit().map_err(|e| e.to_string())
}
