use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;

use crate::domain::ids::{ConnId, GameId};

/// Handlers tag their response with the [`GameId`] they created or the
/// [`ConnId`] they opened; both end up on the `request_completed` line.
struct Completed {
    method: String,
    path: String,
    status: u16,
    duration_us: u64,
    upgrade: bool,
    trace_id: String,
    game_id: Option<String>,
    conn_id: Option<String>,
}

macro_rules! request_completed {
    ($level:ident, $completed:expr) => {{
        let c = &$completed;
        tracing::$level!(
            http.method = %c.method,
            url.path = %c.path,
            http.status_code = c.status,
            duration_us = c.duration_us,
            upgrade = c.upgrade,
            trace_id = %c.trace_id,
            game_id = c.game_id.as_deref(),
            conn_id = c.conn_id.as_deref(),
            "request_completed"
        )
    }};
}

/// One `request_completed` line per request, leveled by status class.
/// WebSocket upgrades log when the handshake response is produced.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let upgrade = req.headers().contains_key("upgrade");
        let trace_id = req
            .extensions()
            .get::<String>()
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let (status, game_id, conn_id) = match &result {
                Ok(res) => {
                    let extensions = res.response().extensions();
                    let game_id = extensions.get::<GameId>().map(ToString::to_string);
                    let conn_id = extensions.get::<ConnId>().map(ToString::to_string);
                    (res.status(), game_id, conn_id)
                }
                Err(err) => (err.as_response_error().status_code(), None, None),
            };
            let completed = Completed {
                method,
                path,
                status: status.as_u16(),
                duration_us: start.elapsed().as_micros() as u64,
                upgrade,
                trace_id,
                game_id,
                conn_id,
            };

            if status.is_server_error() {
                request_completed!(error, completed);
            } else if status.is_client_error() {
                request_completed!(warn, completed);
            } else {
                request_completed!(info, completed);
            }

            result
        })
    }
}
