//! HTTP server.
//!
//! The server binds a TCP listener, serves HTTP/1.1 connections through the
//! middleware pipeline and dispatcher, and drains gracefully when its
//! shutdown signal fires.
//!
//! # Shutdown sequence
//!
//! 1. The health flag turns unhealthy.
//! 2. Every open connection is told to stop keeping alive: idle connections
//!    close at once, busy ones close after their current response.
//! 3. The listener is dropped so no new connections are accepted.
//! 4. The server waits for open connections to close, bounded by the drain
//!    deadline.
//!
//! # Example
//!
//! ```rust,ignore
//! use wicket_server::{Server, ServerConfig};
//!
//! let server = Server::builder()
//!     .config(ServerConfig::builder().listen_addr("0.0.0.0:8888").build())
//!     .access_log(sink)
//!     .page("/", index)
//!     .build()?;
//!
//! server.run().await?;
//! ```

use crate::config::ServerConfig;
use crate::connection::ConnectionActivity;
use crate::dispatcher::Dispatcher;
use crate::error::{ServerError, ShutdownError, StartupError};
use crate::health::HealthState;
use crate::lifecycle::LifecycleManager;
use crate::shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};
use wicket_core::{
    BoxFuture, PageHandler, Request, RequestContext, RequestId, RequestIdentity, Response,
    ResponseExt,
};
use wicket_middleware::{MiddlewareContext, Pipeline};
use wicket_telemetry::AccessLogSink;

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// A configured server that has not yet bound its listener.
pub struct Server {
    shared: Arc<Shared>,
    lifecycle: LifecycleManager,
}

/// State shared by every connection task.
struct Shared {
    config: ServerConfig,
    pipeline: Pipeline,
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.shared.config
    }

    /// The lifecycle manager, shared with the running server.
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// Binds the listener and marks the server healthy.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Bind`] if the address cannot be bound.
    pub async fn bind(self) -> Result<BoundServer, StartupError> {
        let addr = self.shared.config.listen_addr().to_string();
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.lifecycle.mark_start_failed()?;
                return Err(StartupError::Bind { addr, source });
            }
        };
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::Bind { addr, source })?;

        self.lifecycle.mark_serving()?;
        info!(%local_addr, "Server is ready to handle requests at {local_addr}");

        Ok(BoundServer {
            listener,
            local_addr,
            shared: self.shared,
            lifecycle: self.lifecycle,
        })
    }

    /// Binds, serves until SIGINT or SIGTERM, then drains.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Startup`] if binding fails and
    /// [`ServerError::Shutdown`] if the drain deadline passes.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds, serves until `shutdown` fires, then drains.
    ///
    /// # Errors
    ///
    /// See [`Server::run`].
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let bound = self.bind().await?;
        bound.serve(shutdown).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.shared.config)
            .field("lifecycle", &self.lifecycle.state())
            .finish_non_exhaustive()
    }
}

/// A server whose listener is bound and which reports healthy.
pub struct BoundServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    lifecycle: LifecycleManager,
}

impl BoundServer {
    /// The address actually bound, useful when the configured port was `0`.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The lifecycle manager.
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// The health flag.
    #[must_use]
    pub fn health(&self) -> HealthState {
        self.lifecycle.health().clone()
    }

    /// Accepts connections until `shutdown` fires, then drains.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::DrainTimeout`] if connections are still open
    /// when the drain deadline passes.
    pub async fn serve(self, shutdown: ShutdownSignal) -> Result<(), ShutdownError> {
        let Self {
            listener,
            local_addr,
            shared,
            lifecycle,
        } = self;
        let tracker = ConnectionTracker::new();
        let drain = ShutdownSignal::new();

        loop {
            tokio::select! {
                biased;

                () = shutdown.recv() => break,

                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let token = tracker.acquire();
                        let shared = Arc::clone(&shared);
                        let drain = drain.clone();
                        tokio::spawn(async move {
                            serve_connection(shared, stream, remote_addr, drain, token).await;
                        });
                    }
                    Err(error) => {
                        warn!(%error, "failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }

        info!(%local_addr, "Server is shutting down...");
        lifecycle.begin_drain();
        drain.trigger();
        drop(listener);

        debug!(
            active = tracker.active_connections(),
            deadline = ?lifecycle.drain_deadline(),
            "draining connections"
        );

        match lifecycle.drain(&tracker).await {
            Ok(()) => {
                info!("Server stopped");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "could not gracefully shut down the server");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for BoundServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundServer")
            .field("local_addr", &self.local_addr)
            .field("lifecycle", &self.lifecycle.state())
            .finish_non_exhaustive()
    }
}

/// Serves one TCP connection until the client closes it, it idles out, or
/// the server drains.
async fn serve_connection(
    shared: Arc<Shared>,
    stream: TcpStream,
    remote_addr: SocketAddr,
    drain: ShutdownSignal,
    _token: ConnectionToken,
) {
    let activity = ConnectionActivity::new();
    let idle_timeout = shared.config.idle_timeout();
    let read_timeout = shared.config.read_timeout();

    let service = {
        let activity = activity.clone();
        service_fn(move |request: http::Request<Incoming>| {
            let shared = Arc::clone(&shared);
            let guard = activity.begin();
            async move {
                let response = shared.handle_request(request, remote_addr).await;
                drop(guard);
                Ok::<_, Infallible>(response)
            }
        })
    };

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(read_timeout)
        .keep_alive(true);
    let conn = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let mut closing = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(error) = result {
                    debug!(%remote_addr, %error, "connection error");
                }
                break;
            }
            () = drain.recv(), if !closing => {
                debug!(%remote_addr, in_flight = activity.in_flight(), "draining connection");
                closing = true;
                conn.as_mut().graceful_shutdown();
            }
            () = activity.idle_for(idle_timeout), if !closing => {
                debug!(%remote_addr, "closing idle connection");
                closing = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

impl Shared {
    /// Collects the body, then runs the request through the pipeline and the
    /// dispatcher.
    ///
    /// A body that cannot be read within the read timeout is answered inside
    /// the pipeline so that the request still gets an id and a log line.
    async fn handle_request(
        &self,
        request: http::Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Response {
        let (parts, body) = request.into_parts();

        let (body, body_error) =
            match tokio::time::timeout(self.config.read_timeout(), body.collect()).await {
                Ok(Ok(collected)) => (collected.to_bytes(), None),
                Ok(Err(error)) => {
                    debug!(%remote_addr, %error, "failed to read request body");
                    (Bytes::new(), Some((StatusCode::BAD_REQUEST, "failed to read request body")))
                }
                Err(_) => {
                    debug!(%remote_addr, "request body read timed out");
                    (Bytes::new(), Some((StatusCode::REQUEST_TIMEOUT, "request body read timed out")))
                }
            };
        let request = http::Request::from_parts(parts, Full::new(body));

        let dispatcher = Arc::clone(&self.dispatcher);
        self.pipeline
            .process(
                MiddlewareContext::with_remote_addr(remote_addr),
                request,
                move |ctx: &mut MiddlewareContext, request: Request| -> BoxFuture<'static, Response> {
                    let request_context = ctx
                        .request_context()
                        .cloned()
                        .unwrap_or_else(|| RequestContext::new(RequestId::unknown()));
                    Box::pin(async move {
                        match body_error {
                            Some((status, message)) => Response::error(status, message),
                            None => dispatcher.dispatch(&request_context, request).await,
                        }
                    })
                },
            )
            .await
    }
}

/// Builder for [`Server`].
pub struct ServerBuilder {
    config: ServerConfig,
    identity: RequestIdentity,
    access_log: Option<Arc<AccessLogSink>>,
    pages: Vec<(String, Arc<dyn PageHandler>)>,
    health: HealthState,
}

impl ServerBuilder {
    /// Creates a builder with the default configuration and no pages.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            identity: RequestIdentity::new(),
            access_log: None,
            pages: Vec::new(),
            health: HealthState::new(),
        }
    }

    /// Sets the server configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the request id source.
    #[must_use]
    pub fn identity(mut self, identity: RequestIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Sets the access-log sink. Required.
    #[must_use]
    pub fn access_log(mut self, sink: Arc<AccessLogSink>) -> Self {
        self.access_log = Some(sink);
        self
    }

    /// Shares an existing health flag with the server.
    #[must_use]
    pub fn health(mut self, health: HealthState) -> Self {
        self.health = health;
        self
    }

    /// Registers a page at an exact path.
    #[must_use]
    pub fn page(mut self, path: impl Into<String>, page: Arc<dyn PageHandler>) -> Self {
        self.pages.push((path.into(), page));
        self
    }

    /// Registers several pages.
    #[must_use]
    pub fn pages<P, I>(mut self, pages: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = (P, Arc<dyn PageHandler>)>,
    {
        self.pages
            .extend(pages.into_iter().map(|(path, page)| (path.into(), page)));
        self
    }

    /// Builds the server.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::MissingAccessLog`] if no sink was set.
    pub fn build(self) -> Result<Server, StartupError> {
        let sink = self.access_log.ok_or(StartupError::MissingAccessLog)?;

        let dispatcher = self
            .pages
            .into_iter()
            .fold(
                Dispatcher::builder(self.health.clone(), Arc::clone(&sink))
                    .write_timeout(self.config.write_timeout()),
                |builder, (path, page)| builder.page(path, page),
            )
            .build();
        debug!(paths = ?dispatcher.paths(), "routes registered");

        let lifecycle = LifecycleManager::new(self.health, self.config.drain_deadline());
        let pipeline = Pipeline::standard(self.identity, sink);

        Ok(Server {
            shared: Arc::new(Shared {
                config: self.config,
                pipeline,
                dispatcher: Arc::new(dispatcher),
            }),
            lifecycle,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
