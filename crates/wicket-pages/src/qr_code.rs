//! QR code form backed by the Google Charts image API.

use crate::layout::{html_escape, Layout};
use wicket_core::{
    BoxFuture, PageError, PageHandler, PageResult, Request, RequestContext, Response, ResponseExt,
};

/// Query parameter holding the text to encode.
const QR_FIELD: &str = "qr_code_text";

const CHART_URL: &str = "http://chart.apis.google.com/chart?chs=300x300&cht=qr&choe=UTF-8&chl=";

/// QR code generator served at `/qr-code-generator`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodePage;

impl QrCodePage {
    fn html(text: Option<&str>) -> String {
        let result = match text {
            Some(text) if !text.is_empty() => format!(
                r#"
        <img src="{src}" />
        <br>
        {shown}
        <br>
        <br>"#,
                src = html_escape(&format!("{CHART_URL}{}", urlencoding::encode(text))),
                shown = html_escape(text),
            ),
            _ => String::new(),
        };

        let body = format!(
            r#"<div class="main-content">
    <h2>QR Code Generator</h2>
    <form action="/qr-code-generator" name="qr_code_form" method="GET">
        <input maxLength=512 size=80 name="{QR_FIELD}" value="" title="Text to QR Encode">
        <br>
        <input type=submit value="Show QR" name="qr_code_submission">
        <br>{result}
    </form>
</div>"#
        );

        Layout {
            title: "Wicket QR Code Generator",
            description: "Simple QR code generator using the Google Charts API.",
            keywords: "rust web server qr code generator google api",
            body: &body,
            ..Layout::default()
        }
        .render()
    }
}

impl PageHandler for QrCodePage {
    fn name(&self) -> &'static str {
        "qr_code"
    }

    fn render<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, PageResult<Response>> {
        Box::pin(async move {
            let text = query_value(request.uri().query(), QR_FIELD)?;
            Ok(Response::html(Self::html(text.as_deref())))
        })
    }
}

/// Returns the first decoded value of `name` in a form-encoded query string.
fn query_value(query: Option<&str>, name: &str) -> PageResult<Option<String>> {
    let Some(query) = query else {
        return Ok(None);
    };

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == name {
            let decoded = urlencoding::decode(&value.replace('+', " "))
                .map_err(|_| PageError::bad_request(format!("{name} is not valid UTF-8")))?
                .into_owned();
            return Ok(Some(decoded));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::{BodyExt, Full};
    use wicket_core::RequestId;

    #[test]
    fn test_query_value() {
        assert_eq!(
            query_value(Some("qr_code_text=hello+world%21&x=1"), QR_FIELD)
                .unwrap()
                .as_deref(),
            Some("hello world!")
        );
        assert_eq!(query_value(Some("x=1"), QR_FIELD).unwrap(), None);
        assert_eq!(query_value(None, QR_FIELD).unwrap(), None);
        assert_eq!(
            query_value(Some("qr_code_text"), QR_FIELD).unwrap().as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_query_value_first_wins() {
        assert_eq!(
            query_value(Some("qr_code_text=a&qr_code_text=b"), QR_FIELD)
                .unwrap()
                .as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_query_value_rejects_invalid_utf8() {
        assert!(matches!(
            query_value(Some("qr_code_text=%FF"), QR_FIELD),
            Err(PageError::BadRequest(_))
        ));
    }

    #[test]
    fn test_form_without_text_has_no_image() {
        let html = QrCodePage::html(None);
        assert!(html.contains(r#"name="qr_code_text""#));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_text_is_escaped_and_encoded() {
        let html = QrCodePage::html(Some("<b>&"));
        assert!(html.contains("chl=%3Cb%3E%26"));
        assert!(html.contains("&lt;b&gt;&amp;"));
        assert!(!html.contains("<b>&"));
    }

    #[tokio::test]
    async fn test_render_from_request() {
        let request = http::Request::builder()
            .uri("/qr-code-generator?qr_code_text=rust&qr_code_submission=Show+QR")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let ctx = RequestContext::new(RequestId::new("1"));

        let response = QrCodePage.render(&ctx, &request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("chl=rust"));
    }
}
