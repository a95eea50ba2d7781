use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;

use ledger_lite::{DEFAULT_SAMPLE_DATA, TransactionService, load_sample_data};

/// A utility for creating a test database for the REST API server of ledger_lite.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// A JSON file of transactions to add instead of the bundled sample data.
    #[arg(long)]
    sample_data: Option<PathBuf>,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let sample_data = match &args.sample_data {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEFAULT_SAMPLE_DATA.to_owned(),
    };

    println!("Creating database at {output_path:#?}");
    let service = TransactionService::open(output_path)?;

    println!("Adding sample transactions...");
    let inserted = load_sample_data(&sample_data, &service)?;
    println!("Added {inserted} transactions");

    service.close()?;

    println!("Success!");

    Ok(())
}
