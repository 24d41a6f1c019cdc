//! oxide-store daemon
//!
//! Owns the database and its snapshot timer, and serves the REST API over
//! HTTP until interrupted. Exits non-zero on any init failure (bad config,
//! unwritable snapshot path, port bind failure).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_store_core::Database;
use oxide_store_rest::{api_router, Method, Request, Router};

/// Schema-enforced tabular store with periodic JSON snapshots.
#[derive(Parser)]
#[command(name = "oxide-store-daemon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Snapshot file path.
    #[arg(long, env = "DUMP_PATH", default_value = ".dump.json")]
    dump_path: PathBuf,

    /// Interval between snapshots, e.g. "30s" or "1m".
    #[arg(long, env = "DUMP_INTERVAL", default_value = "1m", value_parser = humantime::parse_duration)]
    dump_interval: Duration,

    /// HTTP port to listen on.
    #[arg(long, env = "REST_PORT", default_value_t = 8080)]
    port: u16,

    /// Load an existing snapshot file on startup.
    #[arg(long)]
    restore: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db = Database::new(&cli.dump_path, cli.dump_interval)?;
    info!(
        path = %cli.dump_path.display(),
        interval = %humantime::format_duration(cli.dump_interval),
        "database initialised"
    );

    if let Some(path) = &cli.restore {
        db.from_dump(path)?;
        info!(path = %path.display(), "restored database from snapshot");
    }

    let router = Arc::new(api_router(Arc::clone(&db)));
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "rest api listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = accepted?;
                let io = TokioIo::new(stream);
                let router = Arc::clone(&router);

                tokio::task::spawn(async move {
                    let service = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { handle_request(req, &router).await }
                    });

                    if let Err(error) = http1::Builder::new().serve_connection(io, service).await {
                        tracing::debug!(%error, "error serving connection");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("shutting down, writing final snapshot");
    db.store_dump()?;
    Ok(())
}

/// Bridges a hyper request onto the rest router and back.
async fn handle_request(
    req: HyperRequest<hyper::body::Incoming>,
    router: &Router,
) -> Result<HyperResponse<Full<Bytes>>, std::convert::Infallible> {
    let Some(method) = Method::parse(req.method().as_str()) else {
        return Ok(plain_status(StatusCode::METHOD_NOT_ALLOWED));
    };
    let path = req.uri().path().to_string();

    let body = req
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    let request = Request::new(method, path).body(body.to_vec());

    let response = router.handle(request).await;

    let mut out = HyperResponse::new(Full::new(Bytes::from(response.body)));
    *out.status_mut() =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    for (key, value) in &response.headers {
        if let (Ok(name), Ok(value)) = (
            hyper::header::HeaderName::try_from(key.as_str()),
            hyper::header::HeaderValue::try_from(value.as_str()),
        ) {
            out.headers_mut().insert(name, value);
        }
    }
    Ok(out)
}

fn plain_status(status: StatusCode) -> HyperResponse<Full<Bytes>> {
    let mut response = HyperResponse::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
