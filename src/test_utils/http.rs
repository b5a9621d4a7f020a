use axum::{body::Body, http::StatusCode, response::Response};

use crate::test_utils::{assert_valid_html, parse_html_fragment};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = response
        .headers()
        .get("content-type")
        .expect("content-type header missing");
    assert_eq!(content_type_header, content_type);
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    let header_error_message = format!("Headers missing {header_name}");

    response
        .headers()
        .get(header_name)
        .expect(&header_error_message)
        .to_str()
        .expect("Could not convert to str")
        .to_string()
}

/// Assert that the response redirects an htmx request to `endpoint`.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(get_header(response, "hx-redirect"), endpoint);
}

/// Assert that the response is an error alert with `status` that mentions `want_text`.
pub(crate) async fn assert_alert_response(
    response: Response<Body>,
    status: StatusCode,
    want_text: &str,
) {
    assert_eq!(response.status(), status);
    assert!(
        response.headers().get("hx-redirect").is_none(),
        "an error alert should not redirect"
    );

    let html = parse_html_fragment(response).await;
    assert_valid_html(&html);
    let text = html.root_element().text().collect::<String>();
    assert!(
        text.contains(want_text),
        "want alert to contain {want_text:?}, got {text:?}"
    );
}
