//! HTTP proxy standing between the showcase frontend and AWS Location Service.
//!
//! The frontend never sees the API key. It calls routes under `/api`, and the proxy forwards
//! them to AWS using [`LocationClient`]. Map styles are served already localized, see
//! [`location_kit::apply_language_preference`].
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]

mod error;
mod routes;

use std::{
    convert::Infallible,
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::Arc,
};

use http_body_util::Full;
use hyper::{Request, Response, body::Incoming, server::conn::http1, service::Service};
use hyper_util::rt::TokioIo;
use location_kit::{Config, LocationClient, StyleRequest};
use tokio::{net::TcpListener, task::JoinHandle};

pub use error::Error;
use routes::Routes;

/// Proxy server, accepting connections in the background until dropped.
pub struct Proxy {
    port: u16,
    accept_loop: JoinHandle<()>,
}

impl Proxy {
    /// Bind to `addr` and start accepting connections.
    ///
    /// # Errors
    ///
    /// When the HTTP client cannot be created, or the address cannot be bound.
    pub async fn bind(addr: SocketAddr, config: &Config) -> Result<Self, Error> {
        let routes = Arc::new(Routes::new(
            LocationClient::new(config)?,
            StyleRequest {
                style: config.map_style,
                ..StyleRequest::default()
            },
        ));

        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();
        log::info!("Proxy server running at http://localhost:{port}");

        let accept_loop = tokio::spawn(accept_continuously(listener, routes));
        Ok(Self { port, accept_loop })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait until the accept loop ends, which normally does not happen.
    ///
    /// # Errors
    ///
    /// When the accept loop panics.
    pub async fn serve_forever(mut self) -> Result<(), Error> {
        (&mut self.accept_loop).await?;
        Ok(())
    }
}

impl Drop for Proxy {
    fn drop(&mut self) {
        self.accept_loop.abort();
    }
}

/// Serve the proxy on all interfaces, on the port from `config`.
///
/// # Errors
///
/// When the proxy cannot be started.
pub async fn run(config: &Config) -> Result<(), Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    Proxy::bind(addr, config).await?.serve_forever().await
}

async fn accept_continuously(listener: TcpListener, routes: Arc<Routes>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                log::warn!("Could not accept a connection: {error}.");
                continue;
            }
        };

        log::trace!("Connection from {peer}.");
        let service = ProxyService {
            routes: Arc::clone(&routes),
        };

        tokio::spawn(async move {
            if let Err(error) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                log::debug!("Connection with {peer} closed: {error}.");
            }
        });
    }
}

struct ProxyService {
    routes: Arc<Routes>,
}

impl Service<Request<Incoming>> for ProxyService {
    type Response = Response<Full<bytes::Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: Request<Incoming>) -> Self::Future {
        let routes = Arc::clone(&self.routes);
        Box::pin(async move { Ok(routes.handle(request).await) })
    }
}
