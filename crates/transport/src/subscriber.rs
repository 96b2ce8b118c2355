//! Subscriber - connected receive endpoint

use std::sync::Arc;

use contracts::{ContractError, EndpointAddr, Sample, SampleSource, StreamKind};
use observability::record_sample_received;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{info, instrument};

use crate::{EndpointMetrics, TransportContext};

/// Longest accepted payload, in bytes, excluding the line terminator
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Subscribe endpoint
///
/// Receives every message the publisher broadcasts after the connection is
/// established. `recv` has no timeout: a silent publisher blocks it forever.
pub struct Subscriber {
    name: String,
    addr: EndpointAddr,
    kind: StreamKind,
    lines: FramedRead<TcpStream, LinesCodec>,
    metrics: Arc<EndpointMetrics>,
}

impl Subscriber {
    /// Connect to a publisher
    ///
    /// # Errors
    /// `Transport` if the connection cannot be established; no retry.
    #[instrument(name = "subscriber_connect", skip_all, fields(addr = %addr, kind = %kind))]
    pub async fn connect(
        _ctx: &TransportContext,
        addr: &EndpointAddr,
        kind: StreamKind,
    ) -> Result<Self, ContractError> {
        let stream = TcpStream::connect((addr.host.as_str(), addr.port))
            .await
            .map_err(|e| {
                ContractError::transport(addr.to_string(), format!("connect failed: {e}"))
            })?;
        stream.set_nodelay(true)?;

        let name = format!("subscriber:{addr}");
        info!(subscriber = %name, "Subscriber connected");

        Ok(Self {
            name,
            addr: addr.clone(),
            kind,
            lines: FramedRead::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            metrics: Arc::new(EndpointMetrics::new()),
        })
    }

    /// Publisher address
    pub fn addr(&self) -> &EndpointAddr {
        &self.addr
    }

    /// Expected stream layout
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Endpoint counters
    pub fn metrics(&self) -> &Arc<EndpointMetrics> {
        &self.metrics
    }

    /// Receive the next raw payload
    ///
    /// # Errors
    /// `Transport` on read failure, on a payload longer than
    /// `MAX_LINE_LENGTH`, or when the publisher goes away.
    pub async fn recv_line(&mut self) -> Result<String, ContractError> {
        match self.lines.next().await {
            Some(Ok(line)) => {
                self.metrics.inc_received();
                record_sample_received(&self.name);
                Ok(line)
            }
            None => Err(ContractError::transport(
                &self.name,
                "publisher closed the connection",
            )),
            Some(Err(LinesCodecError::MaxLineLengthExceeded)) => Err(ContractError::transport(
                &self.name,
                format!("payload exceeds {MAX_LINE_LENGTH} bytes"),
            )),
            Some(Err(LinesCodecError::Io(e))) => Err(ContractError::transport(
                &self.name,
                format!("receive failed: {e}"),
            )),
        }
    }
}

impl SampleSource for Subscriber {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recv(&mut self) -> Result<Sample, ContractError> {
        let line = self.recv_line().await?;
        Sample::parse_line(&line, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Publisher;
    use contracts::SampleSink;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let result = Subscriber::connect(
            &TransportContext::default(),
            &EndpointAddr::new("127.0.0.1", port),
            StreamKind::Haptic,
        )
        .await;
        assert!(matches!(result, Err(ContractError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_receives_in_publish_order() {
        let ctx = TransportContext::default();
        let mut publisher = ctx
            .publisher(&EndpointAddr::new("127.0.0.1", 0))
            .await
            .unwrap();
        let addr = EndpointAddr::new("127.0.0.1", publisher.local_addr().port());
        let mut subscriber = ctx.subscriber(&addr, StreamKind::Video).await.unwrap();
        assert!(
            publisher
                .wait_for_subscribers(1, Duration::from_secs(2))
                .await
        );

        for i in 0..10 {
            let sample = Sample::parse_line(&format!("{}.0,{}", i, 4000 + i), StreamKind::Video)
                .unwrap();
            publisher.publish(&sample).await.unwrap();
        }

        for i in 0..10 {
            let sample = subscriber.recv().await.unwrap();
            assert_eq!(sample.encode(), format!("{}.0,{}", i, 4000 + i));
        }
        assert_eq!(subscriber.metrics().received(), 10);
    }

    #[tokio::test]
    async fn test_publisher_drop_is_transport_error() {
        let ctx = TransportContext::default();
        let publisher = ctx
            .publisher(&EndpointAddr::new("127.0.0.1", 0))
            .await
            .unwrap();
        let addr = EndpointAddr::new("127.0.0.1", publisher.local_addr().port());
        let mut subscriber = ctx.subscriber(&addr, StreamKind::Video).await.unwrap();
        assert!(
            publisher
                .wait_for_subscribers(1, Duration::from_secs(2))
                .await
        );

        drop(publisher);
        let result = subscriber.recv().await;
        assert!(matches!(result, Err(ContractError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_oversized_payload_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Never terminated by a line break
            let chunk = vec![b'7'; 8 * 1024];
            for _ in 0..(MAX_LINE_LENGTH / chunk.len() + 2) {
                if stream.write_all(&chunk).await.is_err() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        });

        let mut subscriber = Subscriber::connect(
            &TransportContext::default(),
            &EndpointAddr::new("127.0.0.1", port),
            StreamKind::Generic(1),
        )
        .await
        .unwrap();

        let result = subscriber.recv_line().await;
        assert!(matches!(result, Err(ContractError::Transport { .. })));
        assert_eq!(subscriber.metrics().received(), 0);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_payload_is_format_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"0.0,0.1\n").await.unwrap();
            // Keep the connection open until the client has read
            tokio::time::sleep(Duration::from_millis(200)).await;
        });

        let mut subscriber = Subscriber::connect(
            &TransportContext::default(),
            &EndpointAddr::new("127.0.0.1", port),
            StreamKind::Haptic,
        )
        .await
        .unwrap();

        let result = subscriber.recv().await;
        assert!(matches!(result, Err(ContractError::Format { .. })));
        server.await.unwrap();
    }
}
