//! Fixed-order middleware pipeline.
//!
//! The standard pipeline has two stages, outermost first:
//!
//! 1. **Tracing** - resolve the request id and echo it on the response
//! 2. **Access log** - write one line per completed request
//!
//! The access-log stage sits inside the tracing stage so that it can read the
//! request id the tracing stage resolved.

use crate::context::MiddlewareContext;
use crate::middleware::{Middleware, Next};
use crate::stages::{AccessLogStage, TracingStage};
use std::sync::Arc;
use wicket_core::{BoxFuture, Request, RequestIdentity, Response};
use wicket_telemetry::AccessLogSink;

/// A type-erased stage.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable chain of stages wrapped around a handler.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::standard(RequestIdentity::new(), sink);
/// let response = pipeline
///     .process(MiddlewareContext::with_remote_addr(peer), request, handler)
///     .await;
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Builds the standard `Tracing → AccessLog` pipeline.
    pub fn standard(identity: RequestIdentity, sink: Arc<AccessLogSink>) -> Self {
        Self::builder()
            .stage(TracingStage::new(identity))
            .stage(AccessLogStage::new(sink))
            .build()
    }

    /// Runs a request through every stage and then `handler`.
    pub async fn process<H>(&self, mut ctx: MiddlewareContext, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Names of the stages, outermost first.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Number of stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. Stages run in the order they are added.
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// The stages of the standard pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Request id resolution and propagation
    Tracing = 1,
    /// Access-log emission
    AccessLog = 2,
}

impl Stage {
    /// Returns the stage name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tracing => "tracing",
            Self::AccessLog => "access_log",
        }
    }

    /// Returns all stages in order.
    pub const fn all() -> [Stage; 2] {
        [Self::Tracing, Self::AccessLog]
    }
}
