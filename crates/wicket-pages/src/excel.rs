//! Spreadsheet editor page.

use crate::layout::{Layout, OPEN_SANS_CSS};
use wicket_core::{BoxFuture, PageHandler, PageResult, Request, RequestContext, Response, ResponseExt};

const CSS_FILES: [&str; 3] = [
    "https://cdnjs.cloudflare.com/ajax/libs/jexcel/3.5.0/jexcel.min.css",
    "https://bossanova.uk/jsuites/v2/jsuites.css",
    OPEN_SANS_CSS,
];

const JS_FILES: [&str; 3] = [
    "https://cdnjs.cloudflare.com/ajax/libs/jquery/3.4.1/jquery.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/jexcel/3.5.0/jexcel.min.js",
    "https://bossanova.uk/jsuites/v2/jsuites.js",
];

const BODY: &str = r#"<div id="table-container">
    <div id="container">
        <div id="main">
            <h2>Simple Excel Editor</h2>
            <div id="spreadsheet"></div>
            <script>
                // 20 columns, 15 rows
                $('#spreadsheet').jexcel({ minDimensions: [20, 15] });
            </script>
        </div>
    </div>
</div>"#;

/// JExcel spreadsheet served at `/excel`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelPage;

impl ExcelPage {
    fn html() -> String {
        Layout {
            title: "Wicket Excel Web Editor",
            description: "Simple web server example with JExcel.",
            keywords: "rust web server jexcel spreadsheet",
            css_files: &CSS_FILES,
            js_files: &JS_FILES,
            body: BODY,
            ..Layout::default()
        }
        .render()
    }
}

impl PageHandler for ExcelPage {
    fn name(&self) -> &'static str {
        "excel"
    }

    fn render<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _request: &'a Request,
    ) -> BoxFuture<'a, PageResult<Response>> {
        Box::pin(async { Ok(Response::html(Self::html())) })
    }
}
