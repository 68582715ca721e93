// Instance enumeration across every region of an account.
// A failing region is logged and skipped; the listing covers the rest.

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{info, instrument, warn};

use crate::cloud_repo::CloudProvider;
use crate::error::SourceError;
use crate::models::{Credentials, InstanceListing};

/// Regions scanned at once.
const REGION_CONCURRENCY: usize = 4;

const TERMINATED: &str = "terminated";

/// Fails only when the region list itself cannot be read.
#[instrument(skip_all, fields(operation = "list_instances"))]
pub async fn list_instances(
    provider: &dyn CloudProvider,
    credentials: &Credentials,
) -> Result<InstanceListing, SourceError> {
    let regions = provider.list_regions(credentials).await?;

    let results: Vec<_> = stream::iter(regions)
        .map(|region| async move {
            let result = provider.list_region_instances(credentials, &region).await;
            (region, result)
        })
        .buffered(REGION_CONCURRENCY)
        .collect()
        .await;

    let mut listing = InstanceListing::default();
    let mut failed_regions = 0usize;
    for (region, result) in results {
        match result {
            Ok(inventory) => {
                listing.compute_instances.extend(
                    inventory
                        .compute
                        .into_iter()
                        .filter(|i| i.state != TERMINATED),
                );
                listing.managed_db_instances.extend(inventory.managed_db);
            }
            Err(e) => {
                warn!(region = %region, error = %e, "skipping region: listing failed");
                failed_regions += 1;
            }
        }
    }
    info!(
        compute = listing.compute_instances.len(),
        managed_db = listing.managed_db_instances.len(),
        failed_regions,
        "instances listed"
    );
    Ok(listing)
}
