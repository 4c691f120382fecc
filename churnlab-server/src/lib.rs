//! ChurnLab Server — HTTP inference service for the churn pipeline.
//!
//! Loads the fitted pipeline artifact once at startup (failing fatally if it
//! is absent) and serves three endpoints from a synchronous request loop:
//! - `GET /` — health check
//! - `POST /predict` — churn probability for one feature mapping
//! - `GET /metrics` — the persisted training metrics, verbatim
//!
//! There is no shared mutable state: the one pipeline instance is read-only
//! for the process lifetime.

pub mod api;
pub mod config;

pub use api::{handle, ApiResponse, AppState, PredictRequest, PredictResponse, ServeError};
pub use config::{ConfigError, ServerConfig};

use std::io::Read;

/// A bound HTTP listener plus the loaded app state.
pub struct ChurnServer {
    server: tiny_http::Server,
    state: AppState,
}

impl ChurnServer {
    /// Bind the listener. Pass port 0 to let the OS pick one.
    pub fn bind(addr: &str, state: AppState) -> Result<Self, ServeError> {
        let server = tiny_http::Server::http(addr).map_err(|e| ServeError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { server, state })
    }

    /// The address the listener actually bound.
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.server
            .server_addr()
            .to_ip()
            .expect("http listener always has an ip address")
    }

    /// Serve requests until the process exits.
    pub fn run(&self) {
        for request in self.server.incoming_requests() {
            self.respond(request);
        }
    }

    fn respond(&self, mut request: tiny_http::Request) {
        let mut body = String::new();
        if let Err(e) = request.as_reader().read_to_string(&mut body) {
            log::warn!("failed to read request body: {e}");
            let response = tiny_http::Response::from_string("")
                .with_status_code(tiny_http::StatusCode(400));
            let _ = request.respond(response);
            return;
        }

        let method = request.method().to_string();
        let url = request.url().to_string();
        let api_response = api::handle(&self.state, &method, &url, &body);
        log::debug!("{method} {url} -> {}", api_response.status);

        let response = tiny_http::Response::from_string(api_response.body)
            .with_status_code(tiny_http::StatusCode(api_response.status))
            .with_header(json_content_type());
        if let Err(e) = request.respond(response) {
            log::warn!("failed to send response: {e}");
        }
    }
}

fn json_content_type() -> tiny_http::Header {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("static header is valid")
}
