//! Removal of duplicate transactions.
//!
//! Two transactions are duplicates when their type, category, amount, date
//! and description are all equal. Only the ID may differ.

use rusqlite::{Connection, params};

use crate::{Error, database_id::TransactionId, transaction::RowsAffected};

/// One set of transactions that share every field except the ID.
#[derive(Debug)]
struct DuplicateGroup {
    keep_id: TransactionId,
    kind: String,
    category: String,
    amount: f64,
    date: String,
    description: String,
    size: u32,
}

/// Delete every duplicate transaction, keeping the one with the lowest ID in
/// each group.
///
/// Each group is removed by a single `DELETE` statement, so if this function
/// fails part way through, the groups that were already processed stay
/// deleted and the remaining groups are untouched.
///
/// Returns the total number of deleted rows.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn remove_duplicate_transactions(connection: &Connection) -> Result<RowsAffected, Error> {
    let groups = get_duplicate_groups(connection)?;

    let mut removed_count = 0;

    for group in &groups {
        let removed = connection.execute(
            "DELETE FROM \"transaction\"
             WHERE type = ?1 AND category = ?2 AND amount = ?3 AND date = ?4 AND description = ?5
             AND id != ?6",
            params![
                group.kind,
                group.category,
                group.amount,
                group.date,
                group.description,
                group.keep_id,
            ],
        )?;

        tracing::debug!(
            "Removed {removed} of {} duplicates of transaction {}",
            group.size - 1,
            group.keep_id
        );

        removed_count += removed;
    }

    if removed_count > 0 {
        tracing::info!(
            "Removed {removed_count} duplicate transactions from {} groups",
            groups.len()
        );
    }

    Ok(removed_count)
}

fn get_duplicate_groups(connection: &Connection) -> Result<Vec<DuplicateGroup>, Error> {
    // Date and type are read back as the raw stored text so the DELETE
    // compares against exactly what is in the table.
    let mut statement = connection.prepare(
        "SELECT MIN(id), type, category, amount, date, description, COUNT(id)
         FROM \"transaction\"
         GROUP BY type, category, amount, date, description
         HAVING COUNT(id) > 1",
    )?;

    let groups = statement
        .query_map([], |row| {
            Ok(DuplicateGroup {
                keep_id: row.get(0)?,
                kind: row.get(1)?,
                category: row.get(2)?,
                amount: row.get(3)?,
                date: row.get(4)?,
                description: row.get(5)?,
                size: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(groups)
}
