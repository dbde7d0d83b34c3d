//! Isometric SVG plot of `sin(r)/r`.

use crate::layout::{Layout, OPEN_SANS_CSS};
use std::f64::consts::PI;
use std::fmt::Write;
use wicket_core::{BoxFuture, PageHandler, PageResult, Request, RequestContext, Response, ResponseExt};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 500.0;
const CELLS: u32 = 100;
/// Axis range, -15..+15.
const XY_RANGE: f64 = 30.0;
/// Pixels per x or y unit.
const XY_SCALE: f64 = WIDTH / 2.0 / XY_RANGE;
/// Pixels per z unit.
const Z_SCALE: f64 = HEIGHT * 0.4;
/// Angle of the x and y axes (30 degrees).
const ANGLE: f64 = PI / 6.0;

/// SVG surface plot served at `/svg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgPage;

impl SvgPage {
    fn html() -> String {
        let body = surface_svg();
        Layout {
            title: "Wicket SVG Generation",
            description: "Simple SVG generation.",
            keywords: "rust web server svg generation",
            css_files: &[OPEN_SANS_CSS],
            body: &body,
            ..Layout::default()
        }
        .render()
    }
}

impl PageHandler for SvgPage {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn render<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        _request: &'a Request,
    ) -> BoxFuture<'a, PageResult<Response>> {
        Box::pin(async { Ok(Response::html(Self::html())) })
    }
}

/// Renders the surface as one polygon per grid cell.
///
/// Cells touching a point where the function is undefined (the origin) are
/// left out.
fn surface_svg() -> String {
    let mut svg = format!(
        "<div class=\"main-content\"><svg xmlns='http://www.w3.org/2000/svg' \
         style='stroke: grey; fill: white; stroke-width: 0.7' \
         width='{WIDTH}' height='{HEIGHT}'>\n"
    );

    for i in 0..CELLS {
        for j in 0..CELLS {
            let corners = [
                corner(i + 1, j),
                corner(i, j),
                corner(i, j + 1),
                corner(i + 1, j + 1),
            ];
            if corners.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
                continue;
            }
            let [(ax, ay), (bx, by), (cx, cy), (dx, dy)] = corners;
            let _ = writeln!(
                svg,
                "<polygon points='{ax},{ay} {bx},{by} {cx},{cy} {dx},{dy}'/>"
            );
        }
    }

    svg.push_str("</svg></div>");
    svg
}

/// Projects the corner of cell `(i, j)` onto the canvas.
fn corner(i: u32, j: u32) -> (f64, f64) {
    let x = XY_RANGE * (f64::from(i) / f64::from(CELLS) - 0.5);
    let y = XY_RANGE * (f64::from(j) / f64::from(CELLS) - 0.5);
    let z = height(x, y);

    let sx = WIDTH / 2.0 + (x - y) * ANGLE.cos() * XY_SCALE;
    let sy = HEIGHT / 2.0 + (x + y) * ANGLE.sin() * XY_SCALE - z * Z_SCALE;
    (sx, sy)
}

fn height(x: f64, y: f64) -> f64 {
    let r = x.hypot(y);
    r.sin() / r
}
