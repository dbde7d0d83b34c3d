//! Page handler contract.
//!
//! The [`PageHandler`] trait is the only thing the server requires of a page:
//! given a request, produce a response or report an error. Pages hold no
//! shared mutable state.

use crate::context::RequestContext;
use crate::error::PageResult;
use crate::types::{BoxFuture, Request, Response};

/// A page served behind the dispatcher.
///
/// The trait is object safe so that pages of different types can live in one
/// routing table as `Arc<dyn PageHandler>`.
///
/// # Example
///
/// ```
/// use wicket_core::{BoxFuture, PageHandler, PageResult, Request, RequestContext, Response, ResponseExt};
///
/// struct Hello;
///
/// impl PageHandler for Hello {
///     fn name(&self) -> &'static str {
///         "hello"
///     }
///
///     fn render<'a>(
///         &'a self,
///         _ctx: &'a RequestContext,
///         _request: &'a Request,
///     ) -> BoxFuture<'a, PageResult<Response>> {
///         Box::pin(async { Ok(Response::html("<h1>Hello</h1>")) })
///     }
/// }
/// ```
pub trait PageHandler: Send + Sync + 'static {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Renders the page for one request.
    ///
    /// An `Err` is contained to this request: the dispatcher turns it into a
    /// 5xx response and the request is still access-logged.
    fn render<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, PageResult<Response>>;
}

/// A page built from a synchronous function.
pub struct FnPage<F> {
    name: &'static str,
    func: F,
}

impl<F> FnPage<F> {
    /// Wraps `func` as a page called `name`.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> PageHandler for FnPage<F>
where
    F: Fn(&RequestContext, &Request) -> PageResult<Response> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn render<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, PageResult<Response>> {
        let result = (self.func)(ctx, request);
        Box::pin(async move { result })
    }
}

/// Shorthand for [`FnPage::new`].
pub const fn page_fn<F>(name: &'static str, func: F) -> FnPage<F>
where
    F: Fn(&RequestContext, &Request) -> PageResult<Response> + Send + Sync + 'static,
{
    FnPage::new(name, func)
}
