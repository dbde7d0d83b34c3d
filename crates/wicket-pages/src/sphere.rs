//! Rotating THREE.js sphere page.

use crate::layout::{Layout, OPEN_SANS_CSS};
use wicket_core::{BoxFuture, PageHandler, PageResult, Request, RequestContext, Response, ResponseExt};

const SPHERE_JS: &str = include_str!("../assets/sphere.js");

const BODY: &str = r#"<div id="table-container">
    <div id="container">
        <div id="main">
            <section id="sphere-container"></section>
        </div>
    </div>
</div>"#;

/// Point-cloud sphere served at `/sphere`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpherePage;

impl SpherePage {
    fn html() -> String {
        Layout {
            title: "Wicket THREE.js Rotating Sphere",
            description: "Simple THREE.js rotating sphere.",
            keywords: "rust web server THREE.js rotating sphere",
            css_files: &[OPEN_SANS_CSS],
            js_files: &["https://cdnjs.cloudflare.com/ajax/libs/three.js/103/three.min.js"],
            body: BODY,
            script: Some(SPHERE_JS),
            ..Layout::default()
        }
        .render()
    }
}

impl PageHandler for SpherePage {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn render<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _request: &'a Request,
    ) -> BoxFuture<'a, PageResult<Response>> {
        Box::pin(async { Ok(Response::html(Self::html())) })
    }
}
