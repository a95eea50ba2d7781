//! CSV export of the transaction list.

use crate::{client::ClientError, transaction::Transaction};

const HEADER: [&str; 5] = ["Date", "Description", "Category", "Amount", "Type"];

/// Write `transactions` as CSV in the order given, with a header row.
pub(crate) fn write_csv<'a, I>(transactions: I) -> Result<String, ClientError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(HEADER).map_err(export_error)?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.date.to_string().as_str(),
                transaction.description.as_str(),
                transaction.category.as_str(),
                transaction.amount.to_string().as_str(),
                transaction.kind.as_str(),
            ])
            .map_err(export_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| ClientError::Export(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| ClientError::Export(error.to_string()))
}

fn export_error(error: csv::Error) -> ClientError {
    ClientError::Export(error.to_string())
}
