//! # Wicket Pages
//!
//! The demo pages served by Wicket, each a [`PageHandler`]:
//!
//! | Path                 | Page                  |
//! |----------------------|-----------------------|
//! | `/`                  | [`IndexPage`]         |
//! | `/excel`             | [`ExcelPage`]         |
//! | `/qr-code-generator` | [`QrCodePage`]        |
//! | `/svg`               | [`SvgPage`]           |
//! | `/sphere`            | [`SpherePage`]        |
//!
//! Pages hold no state. All of them share one HTML [`Layout`].

#![doc(html_root_url = "https://docs.rs/wicket-pages/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod excel;
mod index;
pub mod layout;
mod qr_code;
mod sphere;
mod svg;

use std::sync::Arc;
use wicket_core::PageHandler;

pub use excel::ExcelPage;
pub use index::IndexPage;
pub use layout::Layout;
pub use qr_code::QrCodePage;
pub use sphere::SpherePage;
pub use svg::SvgPage;

/// The demo pages paired with the path each is served at.
pub fn default_pages() -> Vec<(&'static str, Arc<dyn PageHandler>)> {
    let index: Arc<dyn PageHandler> = Arc::new(IndexPage);
    let excel: Arc<dyn PageHandler> = Arc::new(ExcelPage);
    let qr_code: Arc<dyn PageHandler> = Arc::new(QrCodePage);
    let svg: Arc<dyn PageHandler> = Arc::new(SvgPage);
    let sphere: Arc<dyn PageHandler> = Arc::new(SpherePage);

    vec![
        ("/", index),
        ("/excel", excel),
        ("/qr-code-generator", qr_code),
        ("/svg", svg),
        ("/sphere", sphere),
    ]
}
