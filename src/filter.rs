//! Filtering and ordering for the transaction list view.

use time::Date;

use crate::transaction::{Transaction, TransactionType};

/// The active filters of the transaction list.
///
/// Unset fields, and empty search or category strings, match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive text that must appear in the description or category.
    pub search: Option<String>,
    /// The exact category name.
    pub category: Option<String>,
    /// Only income or only expenses.
    pub kind: Option<TransactionType>,
    /// The earliest date to include.
    pub from: Option<Date>,
    /// The latest date to include.
    pub to: Option<Date>,
}

impl TransactionFilter {
    /// Whether `transaction` passes every active filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(search) = active(&self.search) {
            let search = search.to_lowercase();
            let found = transaction.description.to_lowercase().contains(&search)
                || transaction.category.to_lowercase().contains(&search);

            if !found {
                return false;
            }
        }

        if let Some(category) = active(&self.category)
            && transaction.category != category
        {
            return false;
        }

        if self.kind.is_some_and(|kind| transaction.kind != kind) {
            return false;
        }

        if self.from.is_some_and(|from| transaction.date < from) {
            return false;
        }

        if self.to.is_some_and(|to| transaction.date > to) {
            return false;
        }

        true
    }

    /// A filter for every transaction in the calendar month of `date`.
    pub fn month_of(date: Date) -> Self {
        let first = date.replace_day(1).unwrap_or(date);
        let last = (28..=31)
            .rev()
            .find_map(|day| date.replace_day(day).ok())
            .unwrap_or(date);

        Self {
            from: Some(first),
            to: Some(last),
            ..Default::default()
        }
    }

    /// Whether any filter is set.
    pub fn is_active(&self) -> bool {
        active(&self.search).is_some()
            || active(&self.category).is_some()
            || self.kind.is_some()
            || self.from.is_some()
            || self.to.is_some()
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

/// Select the transactions that match `filter`, most recent first.
///
/// Transactions on the same date keep their relative order from
/// `transactions`.
pub fn filter_and_sort<'a>(
    transactions: &'a [Transaction],
    filter: &TransactionFilter,
) -> Vec<&'a Transaction> {
    let mut matching: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .collect();

    // `sort_by` is stable.
    matching.sort_by(|a, b| b.date.cmp(&a.date));

    matching
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        filter::{TransactionFilter, filter_and_sort},
        transaction::{Transaction, TransactionType},
    };

    fn create_test_transaction(
        id: i64,
        kind: TransactionType,
        category: &str,
        date: Date,
        description: &str,
    ) -> Transaction {
        Transaction {
            id,
            kind,
            category: category.to_owned(),
            amount: 10.0,
            date,
            description: description.to_owned(),
        }
    }

    fn get_test_transactions() -> Vec<Transaction> {
        vec![
            create_test_transaction(
                1,
                TransactionType::Income,
                "Services",
                date!(2024 - 01 - 15),
                "Website Design Project",
            ),
            create_test_transaction(
                2,
                TransactionType::Expense,
                "Office",
                date!(2024 - 01 - 14),
                "Office Supplies",
            ),
            create_test_transaction(
                3,
                TransactionType::Income,
                "Services",
                date!(2024 - 01 - 13),
                "Client Consultation",
            ),
            create_test_transaction(
                4,
                TransactionType::Expense,
                "Technology",
                date!(2024 - 01 - 12),
                "Software Subscription",
            ),
            create_test_transaction(
                5,
                TransactionType::Expense,
                "Travel",
                date!(2024 - 01 - 14),
                "Taxi to client",
            ),
        ]
    }

    fn ids(transactions: &[&Transaction]) -> Vec<i64> {
        transactions.iter().map(|transaction| transaction.id).collect()
    }

    #[test]
    fn empty_filter_sorts_by_date_descending_and_is_stable() {
        let transactions = get_test_transactions();

        let got = filter_and_sort(&transactions, &TransactionFilter::default());

        // 2 and 5 share a date and keep their input order.
        assert_eq!(ids(&got), vec![1, 2, 5, 3, 4]);
    }

    #[test]
    fn search_matches_description_or_category_ignoring_case() {
        let transactions = get_test_transactions();
        let filter = TransactionFilter {
            search: Some("CLIENT".to_owned()),
            ..Default::default()
        };

        let got = filter_and_sort(&transactions, &filter);

        assert_eq!(ids(&got), vec![5, 3]);

        let filter = TransactionFilter {
            search: Some("tech".to_owned()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_sort(&transactions, &filter)), vec![4]);
    }

    #[test]
    fn category_must_match_exactly() {
        let transactions = get_test_transactions();
        let filter = TransactionFilter {
            category: Some("services".to_owned()),
            ..Default::default()
        };

        assert!(filter_and_sort(&transactions, &filter).is_empty());

        let filter = TransactionFilter {
            category: Some("Services".to_owned()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_sort(&transactions, &filter)), vec![1, 3]);
    }

    #[test]
    fn type_filter() {
        let transactions = get_test_transactions();
        let filter = TransactionFilter {
            kind: Some(TransactionType::Expense),
            ..Default::default()
        };

        let got = filter_and_sort(&transactions, &filter);

        assert_eq!(ids(&got), vec![2, 5, 4]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let transactions = get_test_transactions();
        let filter = TransactionFilter {
            from: Some(date!(2024 - 01 - 13)),
            to: Some(date!(2024 - 01 - 14)),
            ..Default::default()
        };

        let got = filter_and_sort(&transactions, &filter);

        assert_eq!(ids(&got), vec![2, 5, 3]);
    }

    #[test]
    fn all_filters_must_pass() {
        let transactions = get_test_transactions();
        let filter = TransactionFilter {
            search: Some("client".to_owned()),
            kind: Some(TransactionType::Income),
            to: Some(date!(2024 - 01 - 13)),
            ..Default::default()
        };

        let got = filter_and_sort(&transactions, &filter);

        assert_eq!(ids(&got), vec![3]);
    }

    #[test]
    fn month_of_covers_whole_month() {
        let filter = TransactionFilter::month_of(date!(2024 - 02 - 17));

        assert_eq!(filter.from, Some(date!(2024 - 02 - 01)));
        assert_eq!(filter.to, Some(date!(2024 - 02 - 29)));
        assert!(filter.is_active());

        let filter = TransactionFilter::month_of(date!(2023 - 12 - 01));
        assert_eq!(filter.from, Some(date!(2023 - 12 - 01)));
        assert_eq!(filter.to, Some(date!(2023 - 12 - 31)));
    }

    #[test]
    fn month_of_excludes_neighbouring_months() {
        let transactions = vec![
            create_test_transaction(1, TransactionType::Income, "A", date!(2023 - 12 - 31), ""),
            create_test_transaction(2, TransactionType::Income, "A", date!(2024 - 01 - 01), ""),
            create_test_transaction(3, TransactionType::Income, "A", date!(2024 - 01 - 31), ""),
            create_test_transaction(4, TransactionType::Income, "A", date!(2024 - 02 - 01), ""),
        ];

        let filter = TransactionFilter::month_of(date!(2024 - 01 - 20));

        let got = filter_and_sort(&transactions, &filter);

        assert_eq!(ids(&got), vec![3, 2]);
    }

    #[test]
    fn empty_strings_are_inactive() {
        let filter = TransactionFilter {
            search: Some(String::new()),
            category: Some(String::new()),
            ..Default::default()
        };

        assert!(!filter.is_active());
        assert_eq!(filter_and_sort(&get_test_transactions(), &filter).len(), 5);
    }
}
