use axum::http::{header, Method};
use services::{ServiceReply, ServiceRequest, SimpleDispatcher};

pub fn dispatcher() -> SimpleDispatcher {
    SimpleDispatcher::new()
        .register("render_preview", |req: ServiceRequest| async move {
            let text = req
                .form("text")
                .or_else(|| req.query("text").map(String::from))
                .unwrap_or_default();
            Ok(ServiceReply::response((
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                render_preview(&text),
            )))
        })
        .with_methods("render_preview", &[Method::GET, Method::POST])
}

/// Escaped preview markup: one paragraph per blank-line separated block.
pub fn render_preview(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| format!("<p>{}</p>", escape_html(block)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}
