use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{Error, transaction::TransactionService};

/// The result of removing duplicate transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// A message describing what was removed.
    pub message: String,
    /// The number of transactions that were deleted.
    pub removed_count: usize,
}

impl CleanupReport {
    pub(crate) fn new(removed_count: usize) -> Self {
        Self {
            message: format!("Removed {removed_count} duplicate transactions"),
            removed_count,
        }
    }
}

/// A route handler that deletes duplicate transactions, keeping the oldest
/// (lowest ID) transaction of each group.
pub async fn remove_duplicates_endpoint(
    State(service): State<TransactionService>,
) -> Result<Json<CleanupReport>, Error> {
    let removed_count = service.remove_duplicates()?;

    Ok(Json(CleanupReport::new(removed_count)))
}
