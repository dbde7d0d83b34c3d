//! Exact-path request dispatch.
//!
//! | Path      | Response                                                 |
//! |-----------|----------------------------------------------------------|
//! | `/health` | `204` while healthy, `503` otherwise, empty body         |
//! | `/log`    | `200` with the raw access-log file as `text/plain`       |
//! | pages     | whatever the registered [`PageHandler`] renders          |
//! | anything else | `404`                                                |
//!
//! Paths match exactly; there are no prefixes or parameters. The method is not
//! inspected.

use crate::health::HealthState;
use http::header::{HeaderValue, X_CONTENT_TYPE_OPTIONS};
use http::StatusCode;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use wicket_core::{PageHandler, Request, RequestContext, Response, ResponseExt};
use wicket_telemetry::AccessLogSink;

/// Path of the health check.
pub const HEALTH_PATH: &str = "/health";

/// Path of the access-log viewer.
pub const LOG_PATH: &str = "/log";

const LOG_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Clone)]
enum Route {
    Health,
    Log,
    Page(Arc<dyn PageHandler>),
}

/// Maps request paths to the built-in endpoints and registered pages.
pub struct Dispatcher {
    routes: HashMap<String, Route>,
    health: HealthState,
    sink: Arc<AccessLogSink>,
    write_timeout: Duration,
}

impl Dispatcher {
    /// Starts a dispatcher with the `/health` and `/log` routes in place.
    #[must_use]
    pub fn builder(health: HealthState, sink: Arc<AccessLogSink>) -> DispatcherBuilder {
        DispatcherBuilder::new(health, sink)
    }

    /// Registered paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Routes one request and returns its response.
    ///
    /// Never fails: page errors and timeouts are turned into error responses.
    pub async fn dispatch(&self, ctx: &RequestContext, request: Request) -> Response {
        match self.routes.get(request.uri().path()) {
            Some(Route::Health) => self.health_response(),
            Some(Route::Log) => self.log_response().await,
            Some(Route::Page(page)) => self.render_page(page.as_ref(), ctx, &request).await,
            None => Response::error(StatusCode::NOT_FOUND, "404 page not found"),
        }
    }

    fn health_response(&self) -> Response {
        if self.health.is_healthy() {
            Response::empty(StatusCode::NO_CONTENT)
        } else {
            Response::empty(StatusCode::SERVICE_UNAVAILABLE)
        }
    }

    async fn log_response(&self) -> Response {
        let sink = Arc::clone(&self.sink);
        match tokio::task::spawn_blocking(move || sink.contents()).await {
            Ok(Ok(contents)) => {
                let mut response = Response::with_body(StatusCode::OK, LOG_CONTENT_TYPE, contents);
                response
                    .headers_mut()
                    .insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
                response
            }
            Ok(Err(error)) => {
                warn!(%error, path = %self.sink.path().display(), "failed to read access log");
                Response::error(StatusCode::INTERNAL_SERVER_ERROR, "failed to read access log")
            }
            Err(error) => {
                warn!(%error, "access log read task failed");
                Response::error(StatusCode::INTERNAL_SERVER_ERROR, "failed to read access log")
            }
        }
    }

    async fn render_page(
        &self,
        page: &dyn PageHandler,
        ctx: &RequestContext,
        request: &Request,
    ) -> Response {
        match tokio::time::timeout(self.write_timeout, page.render(ctx, request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                warn!(
                    request_id = %ctx.request_id(),
                    page = page.name(),
                    %error,
                    "page failed"
                );
                Response::error(error.status_code(), &error.to_string())
            }
            Err(_) => {
                warn!(
                    request_id = %ctx.request_id(),
                    page = page.name(),
                    timeout = ?self.write_timeout,
                    "page timed out"
                );
                Response::error(StatusCode::SERVICE_UNAVAILABLE, "handler timed out")
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("paths", &self.paths())
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    routes: HashMap<String, Route>,
    health: HealthState,
    sink: Arc<AccessLogSink>,
    write_timeout: Duration,
}

impl DispatcherBuilder {
    fn new(health: HealthState, sink: Arc<AccessLogSink>) -> Self {
        let mut routes = HashMap::new();
        routes.insert(HEALTH_PATH.to_string(), Route::Health);
        routes.insert(LOG_PATH.to_string(), Route::Log);
        Self {
            routes,
            health,
            sink,
            write_timeout: Duration::from_secs(crate::config::DEFAULT_WRITE_TIMEOUT_SECS),
        }
    }

    /// Registers a page at an exact path.
    ///
    /// `/health` and `/log` cannot be replaced; attempts are logged and
    /// ignored. Registering the same page path twice keeps the later page.
    #[must_use]
    pub fn page(mut self, path: impl Into<String>, page: Arc<dyn PageHandler>) -> Self {
        let path = path.into();
        if path == HEALTH_PATH || path == LOG_PATH {
            warn!(%path, page = page.name(), "refusing to shadow a built-in route");
            return self;
        }
        self.routes.insert(path, Route::Page(page));
        self
    }

    /// Bounds how long a page may take to render.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Builds the dispatcher.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            routes: self.routes,
            health: self.health,
            sink: self.sink,
            write_timeout: self.write_timeout,
        }
    }
}
