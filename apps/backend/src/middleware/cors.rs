use std::env;

use actix_cors::Cors;
use actix_web::http::header;

/// CORS for the lobby API and the WebSocket handshake.
///
/// Origins come from `CORS_ALLOWED_ORIGINS` (comma-separated, http(s) only);
/// empty and "null" entries are ignored. Without any valid origin only the
/// local dev frontends are allowed.
pub fn cors_middleware() -> Cors {
    let origins = allowed_origins(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![
            header::HeaderName::from_static("x-trace-id"),
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(3600);

    for origin in origins {
        cors = cors.allowed_origin(&origin);
    }
    cors
}

fn allowed_origins(raw: &str) -> Vec<String> {
    let configured: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect();

    if configured.is_empty() {
        vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ]
    } else {
        configured
    }
}
