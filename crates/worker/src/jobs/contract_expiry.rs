//! Daily contract expiry reminder.

use veriguard_db::repositories::{ContractRepo, EventRepo};
use veriguard_db::DbPool;

/// Contracts ending within this many days get a reminder.
const REMINDER_WINDOW_DAYS: i64 = 30;

/// Find active contracts ending within the reminder window that have not
/// been reminded yet, emit an event for each, and stamp the reminder.
///
/// The stamp makes the handler idempotent: a retried run skips contracts
/// already reminded.
pub async fn run(pool: &DbPool) -> Result<(), String> {
    let expiring = ContractRepo::expiring_within(pool, REMINDER_WINDOW_DAYS)
        .await
        .map_err(|e| format!("Expiring contract query failed: {e}"))?;

    for contract in &expiring {
        EventRepo::insert(
            pool,
            Some(contract.organization_id),
            "contract.expiring",
            Some("contract"),
            Some(contract.id),
            None,
            &serde_json::json!({
                "vendor_id": contract.vendor_id,
                "name": contract.name,
                "end_date": contract.end_date,
                "auto_renews": contract.auto_renews,
            }),
        )
        .await
        .map_err(|e| format!("Failed to record expiry event: {e}"))?;

        ContractRepo::mark_reminder_sent(pool, contract.id)
            .await
            .map_err(|e| format!("Failed to stamp reminder: {e}"))?;

        tracing::info!(
            contract_id = contract.id,
            vendor_id = contract.vendor_id,
            end_date = %contract.end_date,
            "Contract expiry reminder recorded"
        );
    }

    if !expiring.is_empty() {
        tracing::info!(count = expiring.len(), "Contract expiry reminders processed");
    }
    Ok(())
}
