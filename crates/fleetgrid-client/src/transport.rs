//! Request/response transport to the scheduler agent.

use std::future::Future;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use http::header::{HOST, USER_AGENT};
use http::{HeaderValue, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1::SendRequest;
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use tracing::debug;

use crate::error::{TransportError, TransportResult};

/// A single request/response channel to the scheduler's HTTP API.
///
/// `send` takes `&mut self`, so one transport never carries two exchanges
/// at once. Callers that need concurrency open independent transports.
pub trait Transport: Send {
    fn send(
        &mut self,
        request: Request<Bytes>,
    ) -> impl Future<Output = TransportResult<Response<Bytes>>> + Send;
}

/// HTTP/1.1 over one persistent Unix domain socket connection.
pub struct UnixTransport {
    path: PathBuf,
    sender: SendRequest<Full<Bytes>>,
}

impl UnixTransport {
    /// Connect to the agent socket and complete the HTTP handshake.
    pub async fn connect(path: impl AsRef<Path>) -> TransportResult<Self> {
        let path = path.as_ref().to_path_buf();

        let stream = UnixStream::connect(&path)
            .await
            .map_err(|source| TransportError::Connect {
                path: path.clone(),
                source,
            })?;

        let io = TokioIo::new(stream);
        let (sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(TransportError::Handshake)?;

        // Drive the connection in the background.
        let conn_path = path.clone();
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, socket = %conn_path.display(), "scheduler connection ended");
            }
        });

        debug!(socket = %path.display(), "connected to scheduler");
        Ok(Self { path, sender })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl Transport for UnixTransport {
    async fn send(&mut self, request: Request<Bytes>) -> TransportResult<Response<Bytes>> {
        if self.sender.is_closed() {
            return Err(TransportError::Closed);
        }
        self.sender
            .ready()
            .await
            .map_err(|_| TransportError::Closed)?;

        let (mut parts, body) = request.into_parts();
        parts
            .headers
            .entry(HOST)
            .or_insert(HeaderValue::from_static("localhost"));
        parts
            .headers
            .entry(USER_AGENT)
            .or_insert(HeaderValue::from_static("fleetgrid/0.1"));

        let response = self
            .sender
            .send_request(Request::from_parts(parts, Full::new(body)))
            .await
            .map_err(TransportError::Request)?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(TransportError::Body)?
            .to_bytes();

        Ok(Response::from_parts(parts, body))
    }
}
