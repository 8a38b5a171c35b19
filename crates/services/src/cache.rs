use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::Response,
};
use chrono::Utc;

pub const NEVER_CACHE_CONTROL: &str = "max-age=0, no-cache, no-store, must-revalidate, private";

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Marks a response as uncacheable for browsers and intermediaries.
///
/// `Cache-Control` and `Pragma` are overwritten; an `Expires` header that is
/// already present is kept, otherwise it is set to the current time.
pub fn add_never_cache_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(NEVER_CACHE_CONTROL),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

    if !headers.contains_key(header::EXPIRES) {
        let now = Utc::now().format(HTTP_DATE_FORMAT).to_string();
        if let Ok(value) = HeaderValue::from_str(&now) {
            headers.insert(header::EXPIRES, value);
        }
    }
}

pub fn never_cache(mut response: Response) -> Response {
    add_never_cache_headers(response.headers_mut());
    response
}
