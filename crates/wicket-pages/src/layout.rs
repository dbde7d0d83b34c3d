//! The HTML shell shared by every page.

use std::fmt::Write;

/// Stylesheet inlined into every page.
const MAIN_CSS: &str = include_str!("../assets/main.css");

/// Web font used by the navigation bar and body.
pub(crate) const OPEN_SANS_CSS: &str = "https://fonts.googleapis.com/css?family=Open+Sans";

/// Navigation links, in display order.
const NAV_LINKS: [(&str, &str); 5] = [
    ("/", "Home"),
    ("/excel", "Excel App"),
    ("/qr-code-generator", "QR Code Generator"),
    ("/svg", "SVG Example"),
    ("/sphere", "Sphere"),
];

/// Content slotted into the shared shell.
///
/// Text fields are HTML-escaped. `body` and `script` are inserted verbatim.
#[derive(Debug, Default, Clone)]
pub struct Layout<'a> {
    /// `<title>` text.
    pub title: &'a str,
    /// `description` meta tag.
    pub description: &'a str,
    /// `keywords` meta tag.
    pub keywords: &'a str,
    /// `author` meta tag.
    pub author: &'a str,
    /// External stylesheets.
    pub css_files: &'a [&'a str],
    /// External scripts, loaded in `<head>`.
    pub js_files: &'a [&'a str],
    /// Page body markup.
    pub body: &'a str,
    /// Inline script appended after the body.
    pub script: Option<&'a str>,
}

impl Layout<'_> {
    /// Renders the complete document.
    pub fn render(&self) -> String {
        let mut head_links = String::new();
        for href in self.css_files {
            let _ = writeln!(
                head_links,
                r#"    <link rel="stylesheet" type="text/css" href="{}">"#,
                html_escape(href)
            );
        }
        for src in self.js_files {
            let _ = writeln!(head_links, r#"    <script src="{}"></script>"#, html_escape(src));
        }

        let mut nav = String::new();
        for (href, label) in NAV_LINKS {
            let _ = writeln!(nav, r#"                <li><a href="{href}">{label}</a></li>"#);
        }

        let script = self
            .script
            .map(|js| format!("<script>\n{js}</script>\n"))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="description" content="{description}">
    <meta name="keywords" content="{keywords}">
    <meta name="author" content="{author}">
    <title>{title}</title>
{head_links}    <style>
{css}    </style>
</head>
<body>
    <header>
        <div class="main-nav">
            <nav>
            <ul>
{nav}            </ul>
            </nav>
        </div>
    </header>
{body}
</body>
{script}</html>
"#,
            title = html_escape(self.title),
            description = html_escape(self.description),
            keywords = html_escape(self.keywords),
            author = html_escape(self.author),
            css = MAIN_CSS,
            body = self.body,
        )
    }
}

/// Escapes text for use in HTML content and quoted attributes.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
