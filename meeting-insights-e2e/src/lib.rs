// https://github.com/hyperium/hyper/blob/master/examples/client.rs

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use meeting_insights_backend::setup_server;
use meeting_insights_config::{Config, HoursRange};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tracing::warn;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// In-memory configuration with a small roster.
#[must_use]
pub fn test_config(static_dir: &Path) -> Config {
    Config {
        listen: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)),
        database_url: None,
        static_dir: static_dir.to_path_buf(),
        participants: ["Ada", "Grace", "Linus", "Ken", "Barbara", "Edsger"]
            .map(str::to_owned)
            .to_vec(),
        hours_range: HoursRange {
            minimum: 1.0,
            maximum: 3.0,
        },
    }
}

/// The real router on an ephemeral port, stopped on drop.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn spawn(config: &Config) -> Result<Self> {
        let app = setup_server(config).await?;
        let listener = TcpListener::bind(config.listen).await?;
        let addr = listener.local_addr()?;
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(err) = result {
                warn!("test server failed: {err}");
            }
        });

        Ok(Self {
            addr,
            shutdown: Some(shutdown),
        })
    }

    pub async fn fetch(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<(StatusCode, Bytes)> {
        let stream = TcpStream::connect(self.addr).await?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;
        tokio::task::spawn(async move {
            if let Err(err) = conn.await {
                warn!("connection failed: {err}");
            }
        });

        let mut request = Request::builder()
            .method(method)
            .uri(path)
            .header(hyper::header::HOST, self.addr.to_string());
        if body.is_some() {
            request = request.header(hyper::header::CONTENT_TYPE, "application/json");
        }
        let request = request.body(Full::new(body.unwrap_or_default()))?;

        let response = sender.send_request(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        Ok((status, body))
    }

    pub async fn get_json(&self, path: &str) -> Result<(StatusCode, serde_json::Value)> {
        let (status, body) = self.fetch(Method::GET, path, None).await?;
        Ok((status, parse_json(status, &body)?))
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<(StatusCode, serde_json::Value)> {
        let (status, body) = self
            .fetch(Method::POST, path, Some(Bytes::from(serde_json::to_vec(body)?)))
            .await?;
        Ok((status, parse_json(status, &body)?))
    }
}

/// Error responses are plain text, they come back as a JSON string.
fn parse_json(status: StatusCode, body: &[u8]) -> Result<serde_json::Value> {
    if status.is_success() {
        Ok(serde_json::from_slice(body)?)
    } else {
        Ok(serde_json::Value::String(
            String::from_utf8_lossy(body).into_owned(),
        ))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
