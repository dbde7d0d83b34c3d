//! Landing page.

use crate::layout::{Layout, OPEN_SANS_CSS};
use wicket_core::{BoxFuture, PageHandler, PageResult, Request, RequestContext, Response, ResponseExt};

const BODY: &str = r#"<div class="main-content">
    <h2>Wicket Web Server</h2>
    <p>A small HTTP server with request tracing, an access log, a health check and graceful shutdown.</p>
    <br>
    <h4>It also serves a few demo pages:</h4>
    <p>A spreadsheet editor using <a href="https://bossanova.uk/jexcel/v2/">JExcel</a></p>
    <p>A QR code generator using the <a href="https://developers.google.com/chart">Google Charts API</a></p>
    <p>An SVG surface plot (after <a href="https://github.com/adonovan/gopl.io/blob/master/ch3/surface/main.go">The Go Programming Language</a>)</p>
    <p>A rotating 3D sphere using <a href="https://threejs.org/">THREE.js</a></p>
</div>"#;

/// Introduction page served at `/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexPage;

impl IndexPage {
    fn html() -> String {
        Layout {
            title: "Wicket Web Server",
            description: "A small web server with request tracing, an access log, a health check and graceful shutdown.",
            keywords: "rust web server",
            css_files: &[OPEN_SANS_CSS],
            body: BODY,
            ..Layout::default()
        }
        .render()
    }
}

impl PageHandler for IndexPage {
    fn name(&self) -> &'static str {
        "index"
    }

    fn render<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _request: &'a Request,
    ) -> BoxFuture<'a, PageResult<Response>> {
        Box::pin(async { Ok(Response::html(Self::html())) })
    }
}
