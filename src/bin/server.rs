use std::{net::SocketAddr, path::PathBuf, process::exit};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ledger_lite::{
    AppState, DEFAULT_SAMPLE_DATA, TransactionService, build_router, graceful_shutdown,
    load_sample_data, load_sample_data_file, logging_middleware,
};

/// The REST API server for ledger_lite.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_FILE", default_value = "data.db")]
    db_path: PathBuf,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// A JSON file of transactions to add when the database is empty.
    ///
    /// The bundled sample transactions are used if this is not set.
    #[arg(long, env = "SAMPLE_DATA")]
    sample_data: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let service = match TransactionService::open(&args.db_path) {
        Ok(service) => service,
        Err(error) => {
            tracing::error!("Could not open the database at {:?}: {error}", args.db_path);
            exit(1);
        }
    };

    let seed_result = match &args.sample_data {
        Some(path) => load_sample_data_file(path, &service),
        None => load_sample_data(DEFAULT_SAMPLE_DATA, &service),
    };

    if let Err(error) = seed_result {
        tracing::error!("Could not add sample data: {error}");
        exit(1);
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(AppState::new(service.clone()))
        .layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    let serve_result = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await;

    if let Err(error) = serve_result {
        tracing::error!("Server error: {error}");
    }

    if let Err(error) = service.close() {
        tracing::error!("Could not close the database: {error}");
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
