//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{id}', use [format_endpoint].

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/transactions/{id}";
/// The route for the income, expense and category totals.
pub const MONTHLY_SUMMARY: &str = "/transactions/summary/monthly";
/// The route for deleting duplicate transactions.
pub const CLEANUP_DUPLICATES: &str = "/transactions/cleanup/duplicates";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/transactions/{id}', '{id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know the routes can be parsed as URIs.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::MONTHLY_SUMMARY);
        assert_endpoint_is_valid_uri(endpoints::CLEANUP_DUPLICATES);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint(endpoints::TRANSACTION, 7);

        assert_eq!(formatted_path, "/transactions/7");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint(endpoints::TRANSACTIONS, 1);

        assert_eq!(formatted_path, "/transactions");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/transactions/{transaction_id}/tags", 1);

        assert_eq!(formatted_path, "/transactions/1/tags");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
