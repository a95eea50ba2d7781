use axum::{Json, extract::State};

use crate::{Error, summary::Summary, transaction::TransactionService};

/// A route handler for the income, expense and category totals.
///
/// The totals cover every stored transaction, not only the current month.
pub async fn get_monthly_summary_endpoint(
    State(service): State<TransactionService>,
) -> Result<Json<Summary>, Error> {
    service.monthly_summary().map(Json)
}
