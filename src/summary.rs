//! Aggregation of transactions into totals and per-category sums.
//!
//! These functions are shared by the [crate::TransactionService] and the
//! [crate::client::TransactionCache] so that the server's summary and the
//! dashboard's charts are always computed the same way.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::transaction::{Transaction, TransactionType};

/// Totals over a set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The sum of the amounts of income transactions.
    pub total_income: f64,
    /// The sum of the amounts of expense transactions.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub balance: f64,
    /// The sum of amounts for each category.
    ///
    /// Income and expenses in the same category are added together, not
    /// netted against each other.
    pub categories: BTreeMap<String, f64>,
}

/// Sum `transactions` into a [Summary].
///
/// Pass the transactions that should be included; to summarize a filtered
/// view, combine with [crate::filter_and_sort].
pub fn summarize<'a, I>(transactions: I) -> Summary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut summary = Summary::default();

    for transaction in transactions {
        match transaction.kind {
            TransactionType::Income => summary.total_income += transaction.amount,
            TransactionType::Expense => summary.total_expense += transaction.amount,
        }

        *summary
            .categories
            .entry(transaction.category.clone())
            .or_insert(0.0) += transaction.amount;
    }

    summary.balance = summary.total_income - summary.total_expense;

    summary
}

/// One slice of a category pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    /// The category name.
    pub name: String,
    /// The category total, rounded to cents.
    pub value: f64,
    /// The share of the total for the transaction type as a percentage,
    /// rounded to one decimal place.
    pub percentage: f64,
}

/// Group the transactions of one `kind` by category.
///
/// # Returns
/// One [CategoryShare] per category, largest first. Categories with equal
/// totals are sorted by name.
pub fn category_breakdown<'a, I>(transactions: I, kind: TransactionType) -> Vec<CategoryShare>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions.into_iter().filter(|t| t.kind == kind) {
        *totals.entry(transaction.category.as_str()).or_insert(0.0) += transaction.amount;
    }

    let rounded: Vec<(&str, f64)> = totals
        .into_iter()
        .map(|(name, total)| (name, round_to(total, 2)))
        .collect();
    let grand_total: f64 = rounded.iter().map(|(_, value)| value).sum();

    let mut shares: Vec<CategoryShare> = rounded
        .into_iter()
        .map(|(name, value)| CategoryShare {
            name: name.to_owned(),
            value,
            percentage: if grand_total > 0.0 {
                round_to(value / grand_total * 100.0, 1)
            } else {
                0.0
            },
        })
        .collect();

    shares.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));

    shares
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
