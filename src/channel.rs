//! Request/response transport to a bulb's control endpoint.

use std::future::Future;
use std::time::Duration;

use log::debug;

use crate::codec::{CommandRequest, CommandResponse};
use crate::errors::Error;
use crate::runtime::{self, AsyncTcpStream, TcpStream};

type Result<T> = std::result::Result<T, Error>;

/// Sends one request to a bulb and returns its single response line.
///
/// This is the seam between the controller and the network; tests swap in an
/// in-memory implementation.
pub trait Transport: Send + Sync {
    /// Send `request` to `location` (`host:port`) and return the raw response line.
    fn send(
        &self,
        location: &str,
        request: &CommandRequest,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Opens a new TCP connection for every request.
///
/// Connections are never pooled. The stream is dropped, and the connection
/// closed, on every exit path including timeouts.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    timeout: Duration,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

impl TcpTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

    /// `timeout` bounds the whole round trip: connect, write and read.
    pub fn new(timeout: Duration) -> Self {
        TcpTransport { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn round_trip(location: &str, line: &str) -> Result<String> {
        let mut stream = TcpStream::connect(location)
            .await
            .map_err(|e| Error::socket("connect", e))?;

        stream
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::socket("write", e))?;

        let mut response = String::new();
        let bytes = stream
            .read_line(&mut response)
            .await
            .map_err(|e| Error::socket("read", e))?;
        if bytes == 0 {
            return Err(Error::socket(
                "read",
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed before a response",
                ),
            ));
        }
        Ok(response)
    }
}

impl Transport for TcpTransport {
    async fn send(&self, location: &str, request: &CommandRequest) -> Result<String> {
        validate_location(location)?;
        let line = request.encode()?;
        debug!("sending to {location}: {}", line.trim_end());

        let response = runtime::timeout(self.timeout, Self::round_trip(location, &line))
            .await
            .map_err(|e| Error::socket("round trip", e.into()))??;

        debug!("response from {location}: {}", response.trim_end());
        Ok(response)
    }
}

/// Send a request and decode the response line.
pub async fn request<T: Transport>(
    transport: &T,
    location: &str,
    request: &CommandRequest,
) -> Result<CommandResponse> {
    let line = transport.send(location, request).await?;
    CommandResponse::parse(&line)
}

/// Check that `location` has a `host:port` shape.
pub(crate) fn validate_location(location: &str) -> Result<()> {
    match location.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
        _ => Err(Error::InvalidLocation(location.to_string())),
    }
}

#[cfg(all(test, feature = "runtime-tokio"))]
mod tests {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    use super::*;
    use crate::codec::Param;

    #[test]
    fn test_validate_location() {
        assert!(validate_location("192.168.1.10:55443").is_ok());
        assert!(validate_location("bulb.local:55443").is_ok());
        assert!(validate_location("192.168.1.10").is_err());
        assert!(validate_location(":55443").is_err());
        assert!(validate_location("host:port").is_err());
    }

    #[tokio::test]
    async fn test_round_trip_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(socket);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            reader
                .get_mut()
                .write_all(b"{\"id\":1,\"result\":[\"ok\"]}\r\n")
                .await
                .unwrap();
            line
        });

        let transport = TcpTransport::default();
        let req = CommandRequest::new("set_bright", vec![Param::from(1), Param::from("smooth"), Param::from(500)]);
        let response = request(&transport, &addr, &req).await.unwrap();
        assert!(response.is_ok());

        let received = server.await.unwrap();
        assert_eq!(received, req.encode().unwrap());
    }

    #[tokio::test]
    async fn test_hung_peer_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let transport = TcpTransport::new(Duration::from_millis(100));
        let req = CommandRequest::new("toggle", vec![]);
        let err = transport.send(&addr, &req).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_peer_closes_without_answer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let transport = TcpTransport::default();
        let req = CommandRequest::new("toggle", vec![]);
        assert!(matches!(
            transport.send(&addr, &req).await,
            Err(Error::Socket { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_location_is_rejected() {
        let transport = TcpTransport::default();
        let req = CommandRequest::new("toggle", vec![]);
        assert_eq!(
            transport.send("nowhere", &req).await,
            Err(Error::InvalidLocation("nowhere".into()))
        );
    }
}
