//! Six-hourly vendor monitoring sweep.
//!
//! Tier drives cadence: critical vendors daily, high weekly, medium
//! monthly, low quarterly. The sweep does not fetch external data itself;
//! it emits a `vendor.check_due` event per due vendor that the external
//! monitoring connectors consume, and stamps the vendor so the next sweep
//! skips it until its cadence elapses again. Inbound signals also stamp
//! the vendor, so an actively reporting connector keeps its vendors out of
//! the due set.

use veriguard_db::repositories::{EventRepo, VendorRepo};
use veriguard_db::DbPool;

/// Emit check-due events for every vendor past its tier cadence.
pub async fn run(pool: &DbPool) -> Result<(), String> {
    let due = VendorRepo::list_due_for_monitoring(pool)
        .await
        .map_err(|e| format!("Due vendor query failed: {e}"))?;

    for vendor in &due {
        EventRepo::insert(
            pool,
            Some(vendor.organization_id),
            "vendor.check_due",
            Some("vendor"),
            Some(vendor.id),
            None,
            &serde_json::json!({"tier": vendor.tier, "name": vendor.name}),
        )
        .await
        .map_err(|e| format!("Failed to record check-due event: {e}"))?;

        VendorRepo::mark_monitored(pool, vendor.id)
            .await
            .map_err(|e| format!("Failed to stamp vendor: {e}"))?;
    }

    if !due.is_empty() {
        tracing::info!(count = due.len(), "Vendors due for monitoring checks");
    }
    Ok(())
}
