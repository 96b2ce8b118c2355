//! Publisher - bound broadcast endpoint

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, EndpointAddr, Sample, SampleSink};
use observability::record_subscriber_lagged;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::{EndpointMetrics, TransportContext};

/// Publish endpoint
///
/// Every accepted subscriber gets its own writer task fed from a broadcast
/// queue. `publish` never waits for subscribers: with none connected the
/// message is dropped, and a subscriber that falls `queue_capacity` messages
/// behind skips ahead.
pub struct Publisher {
    name: String,
    local_addr: SocketAddr,
    tx: broadcast::Sender<Bytes>,
    metrics: Arc<EndpointMetrics>,
    failure: Arc<OnceLock<String>>,
    accept_task: JoinHandle<()>,
}

impl Publisher {
    /// Bind `addr` and start accepting subscribers
    ///
    /// # Errors
    /// `Transport` if the address cannot be bound.
    #[instrument(name = "publisher_bind", skip_all, fields(addr = %addr))]
    pub async fn bind(ctx: &TransportContext, addr: &EndpointAddr) -> Result<Self, ContractError> {
        let listener = TcpListener::bind((addr.host.as_str(), addr.port))
            .await
            .map_err(|e| ContractError::transport(addr.to_string(), format!("bind failed: {e}")))?;
        let local_addr = listener.local_addr()?;

        let name = format!("publisher:{local_addr}");
        let (tx, _) = broadcast::channel(ctx.config().queue_capacity);
        let metrics = Arc::new(EndpointMetrics::new());
        let failure = Arc::new(OnceLock::new());

        let accept_task = tokio::spawn(accept_loop(
            listener,
            tx.clone(),
            Arc::clone(&metrics),
            Arc::clone(&failure),
            name.clone(),
        ));

        info!(publisher = %name, "Publisher bound");

        Ok(Self {
            name,
            local_addr,
            tx,
            metrics,
            failure,
            accept_task,
        })
    }

    /// Actually bound address (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Currently connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Endpoint counters
    pub fn metrics(&self) -> &Arc<EndpointMetrics> {
        &self.metrics
    }

    /// Poll until `count` subscribers are connected or `timeout` elapses
    ///
    /// Diagnostic aid only; the loops never call it, so early messages can
    /// still be lost exactly as with a plain broadcast transport.
    pub async fn wait_for_subscribers(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.subscriber_count() < count {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        true
    }

    /// Broadcast one raw payload
    ///
    /// # Errors
    /// - `Transport` if the accept loop has failed
    /// - `Format` if `payload` contains a line break, which would split the frame
    pub fn publish_line(&self, payload: &str) -> Result<(), ContractError> {
        if let Some(reason) = self.failure.get() {
            return Err(ContractError::transport(&self.name, reason.clone()));
        }
        if payload.contains(['\n', '\r']) {
            return Err(ContractError::format(
                &self.name,
                "payload contains a line break",
            ));
        }

        let mut frame = String::with_capacity(payload.len() + 1);
        frame.push_str(payload);
        frame.push('\n');

        // No receivers means nobody is listening; the message is lost.
        let delivered = self.tx.send(Bytes::from(frame)).unwrap_or(0);
        self.metrics.inc_published();
        debug!(publisher = %self.name, subscribers = delivered, payload, "Published");
        Ok(())
    }
}

impl SampleSink for Publisher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, sample: &Sample) -> Result<(), ContractError> {
        self.publish_line(&sample.encode())
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.accept_task.abort();
        debug!(publisher = %self.name, "Publisher released");
    }
}

/// Accept subscribers until the listener fails
async fn accept_loop(
    listener: TcpListener,
    tx: broadcast::Sender<Bytes>,
    metrics: Arc<EndpointMetrics>,
    failure: Arc<OnceLock<String>>,
    name: String,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    warn!(publisher = %name, %peer, error = %e, "Failed to disable Nagle");
                }
                metrics.inc_accepted();
                info!(publisher = %name, %peer, "Subscriber connected");
                tokio::spawn(subscriber_writer(
                    stream,
                    tx.subscribe(),
                    Arc::clone(&metrics),
                    name.clone(),
                    peer,
                ));
            }
            Err(e) => {
                error!(publisher = %name, error = %e, "Accept failed");
                let _ = failure.set(format!("accept failed: {e}"));
                return;
            }
        }
    }
}

/// Forward broadcast payloads to one subscriber connection
async fn subscriber_writer(
    mut stream: TcpStream,
    mut rx: broadcast::Receiver<Bytes>,
    metrics: Arc<EndpointMetrics>,
    name: String,
    peer: SocketAddr,
) {
    loop {
        match rx.recv().await {
            Ok(payload) => {
                if let Err(e) = stream.write_all(&payload).await {
                    info!(publisher = %name, %peer, error = %e, "Subscriber disconnected");
                    return;
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(publisher = %name, %peer, missed, "Slow subscriber skipped samples");
                metrics.add_lagged(missed);
                record_subscriber_lagged(&name, missed);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!(publisher = %name, %peer, "Publisher closed, writer stopping");
                return;
            }
        }
    }
}
