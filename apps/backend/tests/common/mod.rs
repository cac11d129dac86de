#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use serde_json::Value;

// Logging is auto-installed for every test binary that declares `mod common;`
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Reads a successful response body as JSON.
pub async fn read_json<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).unwrap_or_else(|_| {
        panic!(
            "expected a JSON body, got {:?}",
            String::from_utf8_lossy(&body)
        )
    })
}
