//! Hyper service wrapper that captures exchanges as they are served

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::service::Service;
use hyper::{Request, Response};
use tracing::error;

use crate::capture::{Record, RequestPart, ResponsePart};
use crate::config::CaptureConfig;
use crate::engine::DocEngine;

/// Boxed error produced by wrapped services and body streams
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service wrapper that documents every exchange passing through it
///
/// Buffers the request body, hands the inner service a fresh copy, buffers
/// the response the inner service produced, and folds the captured record
/// into the shared document engine. Capture failures never alter the
/// response delivered to the original caller.
///
/// The engine mutex serializes catalogue updates across concurrent
/// exchanges; it is never held across an await point.
#[derive(Clone)]
pub struct CaptureService<S> {
    inner: S,
    engine: Arc<Mutex<DocEngine>>,
    config: Arc<CaptureConfig>,
}

impl<S> CaptureService<S> {
    /// Wrap an inner service with exchange capture
    pub fn new(inner: S, engine: Arc<Mutex<DocEngine>>, config: CaptureConfig) -> Self {
        Self {
            inner,
            engine,
            config: Arc::new(config),
        }
    }

    /// Serve one exchange, capturing it on the way through
    ///
    /// Usable directly when the embedding does not dispatch through the
    /// [`Service`] trait.
    ///
    /// # Errors
    ///
    /// Returns error if a body stream fails mid-read or the inner service
    /// fails. Capture and catalogue failures are logged, never returned.
    pub async fn handle<B, RB>(
        &self,
        request: Request<B>,
    ) -> std::result::Result<Response<Full<Bytes>>, BoxError>
    where
        S: Service<Request<Full<Bytes>>, Response = Response<RB>>,
        S::Error: Into<BoxError>,
        B: Body,
        B::Error: Into<BoxError>,
        RB: Body,
        RB::Error: Into<BoxError>,
    {
        let capture_enabled = !self
            .engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_disabled();

        // Drain the request body once; every path below restores a copy
        let (parts, body) = request.into_parts();
        let body_bytes = body.collect().await.map_err(Into::into)?.to_bytes();

        let request_part = if capture_enabled {
            match RequestPart::capture(
                &parts,
                &body_bytes,
                &self.config.suppressed_request_headers,
                self.config.on_failure,
            ) {
                Ok(part) => Some(part),
                Err(err) => {
                    error!("Request capture aborted: {err}");
                    None
                }
            }
        } else {
            None
        };

        let restored = Request::from_parts(parts, Full::new(body_bytes));
        let response = self.inner.call(restored).await.map_err(Into::into)?;

        let (response_parts, response_body) = response.into_parts();
        let response_bytes = response_body.collect().await.map_err(Into::into)?.to_bytes();

        if let Some(request_part) = request_part {
            match ResponsePart::capture(
                response_parts.status,
                &response_parts.headers,
                &response_bytes,
                &self.config.suppressed_response_headers,
                self.config.on_failure,
            ) {
                Ok(response_part) => {
                    let record = Record::new(request_part, response_part);
                    let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Err(err) = engine.capture(record) {
                        error!("Failed to update catalogue: {err}");
                    }
                }
                Err(err) => error!("Response capture aborted: {err}"),
            }
        }

        Ok(Response::from_parts(response_parts, Full::new(response_bytes)))
    }
}

impl<S, B, RB> Service<Request<B>> for CaptureService<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<RB>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    RB: Body + Send + 'static,
    RB::Data: Send,
    RB::Error: Into<BoxError>,
{
    type Response = Response<Full<Bytes>>;
    type Error = BoxError;
    type Future =
        Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: Request<B>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { service.handle(request).await })
    }
}
