//! Minimal embedding: a pet store that documents itself while serving
//!
//! Run with `cargo run --example basic`, then hit the endpoints:
//!
//! ```sh
//! curl -X POST localhost:3000/pets -H 'content-type: application/json' -d '{"name":"rex"}'
//! curl localhost:3000/pets?limit=10
//! ```
//!
//! Every distinct endpoint lands in `apidoc.html` next to the process.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{info, warn};

use apiary::config::Config;
use apiary::engine::DocEngine;
use apiary::middleware::CaptureService;

async fn app(req: Request<Full<Bytes>>) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match (req.method().as_str(), req.uri().path()) {
        ("POST", "/pets") => Response::builder()
            .status(StatusCode::CREATED)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(br#"{"id":1,"name":"rex"}"#)))
            .unwrap(),
        ("GET", "/pets") => Response::builder()
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(br#"[{"id":1,"name":"rex"}]"#)))
            .unwrap(),
        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::new()))
            .unwrap(),
    };

    Ok(response)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::new("pet store", "apidoc.html");
    let engine = Arc::new(Mutex::new(DocEngine::new(&config)?));
    let service = CaptureService::new(service_fn(app), engine, config.capture.clone());

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    info!("Serving on http://127.0.0.1:3000, catalogue in apidoc.html");

    loop {
        let (stream, _) = listener.accept().await?;
        let service = service.clone();
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                warn!("Connection error: {err}");
            }
        });
    }
}
