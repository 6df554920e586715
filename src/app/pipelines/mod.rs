pub mod commission_report;
pub mod price_migration;
pub mod referral_seed;

pub use commission_report::CommissionReportPipeline;
pub use price_migration::PriceMigrationPipeline;
pub use referral_seed::ReferralSeedPipeline;

use crate::core::{DocumentStore, DocumentUpdate};
use crate::utils::error::Result;

/// Writes each update to the store in order. Returns how many were applied;
/// in dry-run mode nothing is written and the count is zero.
pub(crate) async fn apply_updates<D: DocumentStore>(
    store: &D,
    collection: &str,
    updates: &[DocumentUpdate],
    dry_run: bool,
) -> Result<usize> {
    if dry_run {
        for update in updates {
            tracing::info!(
                "🔍 [dry-run] {}/{}: {}",
                collection,
                update.id,
                serde_json::to_string(&update.fields)?
            );
        }
        return Ok(0);
    }

    if updates.is_empty() {
        return Ok(0);
    }

    store.update_documents(collection, updates).await?;
    tracing::debug!("💾 Wrote {} updates to '{}'", updates.len(), collection);
    Ok(updates.len())
}
