pub mod error;
pub mod fixtures;
pub mod gallery;
pub mod listing;
pub mod notification;
pub mod routes;
pub mod wizard;

use core::convert::Infallible;
use std::sync::Arc;

use error::AppError;
use festival_coordination_config::Config;
use festival_coordination_database::gateway::ScheduleSeed;
use festival_coordination_database::{get_database_connection, Gateway};
use fixtures::Fixtures;
use futures_util::{pin_mut, Future};
use headers::{Header, HeaderMapExt as _};
use http::Request;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use notification::Notifier;
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Everything a request handler needs. Cheap to clone, one copy per
/// connection.
#[derive(Clone)]
pub struct FestivalState {
    pub gateway: Gateway,
    pub fixtures: Arc<Fixtures>,
    pub notifier: Arc<Notifier>,
    pub config: Arc<Config>,
}

impl FestivalState {
    #[must_use]
    pub fn new(config: Config, fixtures: Fixtures, gateway: Gateway) -> Self {
        Self {
            gateway,
            fixtures: Arc::new(fixtures),
            notifier: Arc::new(Notifier::new(config.pusher.clone())),
            config: Arc::new(config),
        }
    }
}

pub trait ResponseTypedHeaderExt {
    #[must_use]
    fn typed_header<H: Header>(self, header: H) -> Self;
}

impl ResponseTypedHeaderExt for http::response::Builder {
    fn typed_header<H: Header>(self, header: H) -> Self {
        let mut this = self;
        if let Some(headers) = this.headers_mut() {
            headers.typed_insert(header);
        }
        this
    }
}

/// Loads the fixtures, opens the pool and seeds the aarti schedule.
pub async fn setup_state(config: Config) -> Result<FestivalState, AppError> {
    info!("starting up server...");

    let fixtures = Fixtures::load(&config.fixtures_dir).await?;
    let pool = get_database_connection(&config.database_url)?;
    let gateway = Gateway::new(pool);

    match gateway
        .initialize_aarti_schedule(&fixtures.schedule_rows())
        .await
    {
        Some(ScheduleSeed::AlreadyPresent) => info!("aarti schedule already present"),
        Some(ScheduleSeed::Inserted(count)) => info!("aarti schedule initialized with {count} slots"),
        None => warn!("continuing without a seeded aarti schedule"),
    }

    Ok(FestivalState::new(config, fixtures, gateway))
}

#[allow(clippy::cognitive_complexity)]
pub async fn run_server(
    config: Config,
) -> Result<impl Future<Output = Result<(), AppError>>, AppError> {
    let state = setup_state(config).await?;

    let listener = TcpListener::bind(state.config.listen).await?;
    info!("listening on {}", listener.local_addr()?);

    // tell the connections to shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let shutdown_tx = Arc::new(shutdown_tx);

    // wait for the connections to finish shutdown
    let (closed_tx, closed_rx) = watch::channel(());

    info!("started up server...");

    Ok(async move {
        let shutdown = shutdown_signal();
        pin_mut!(shutdown);

        #[allow(clippy::redundant_pub_crate)]
        loop {
            select! {
                accept = listener.accept() => {
                    let (socket, remote_addr) = match accept {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            warn!("failed to accept connection: {err}");
                            continue;
                        }
                    };

                    let state = state.clone();
                    let shutdown_tx = Arc::clone(&shutdown_tx);
                    let closed_rx = closed_rx.clone();

                    tokio::spawn(async move {
                        let socket = TokioIo::new(socket);

                        let hyper_service = hyper::service::service_fn(move |request: Request<Incoming>| {
                            let state = state.clone();
                            async move { Ok::<_, Infallible>(routes::handle(&state, request).await) }
                        });

                        let builder = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new());
                        let connection = builder.serve_connection_with_upgrades(socket, hyper_service);
                        pin_mut!(connection);

                        select! {
                            connection_result = connection.as_mut() => {
                                if let Err(err) = connection_result {
                                    error!("failed to serve connection {remote_addr}: {err:#}");
                                }
                            }
                            () = shutdown_tx.closed() => {
                                connection.as_mut().graceful_shutdown();
                                if let Err(err) = connection.as_mut().await {
                                    error!("failed to finish connection {remote_addr}: {err:#}");
                                }
                            }
                        }

                        drop(closed_rx);
                    });
                }
                () = &mut shutdown => {
                    warn!("shutting down, waiting for open connections");
                    drop(shutdown_rx); // initiate shutdown
                    drop(closed_rx);
                    closed_tx.closed().await;
                    break;
                }
            }
        }

        info!("server stopped");
        Ok(())
    })
}

async fn wait_forever() {
    core::future::pending::<()>().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {err}");
            wait_forever().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
                wait_forever().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = wait_forever();

    #[allow(clippy::redundant_pub_crate)]
    {
        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }
    }
}
