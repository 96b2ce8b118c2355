//! TransportContext - process-scoped transport resource

use contracts::{ContractError, EndpointAddr, StreamKind, TransportConfig};
use tracing::info;

use crate::{Publisher, Subscriber};

/// Shared transport settings
///
/// Constructed once per process and handed by reference to endpoint
/// constructors. Endpoints are owned by the loop that opened them.
#[derive(Debug, Clone, Default)]
pub struct TransportContext {
    config: TransportConfig,
}

impl TransportContext {
    /// Create the context
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Transport settings
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Bind a publish endpoint
    pub async fn publisher(&self, addr: &EndpointAddr) -> Result<Publisher, ContractError> {
        Publisher::bind(self, addr).await
    }

    /// Connect a subscribe endpoint
    pub async fn subscriber(
        &self,
        addr: &EndpointAddr,
        kind: StreamKind,
    ) -> Result<Subscriber, ContractError> {
        Subscriber::connect(self, addr, kind).await
    }

    /// Give subscribers time to connect before the first publish
    ///
    /// Messages published before a subscriber has connected are still lost.
    pub async fn settle(&self) {
        let delay = self.config.settle_delay();
        if delay.is_zero() {
            return;
        }
        info!(settle_ms = self.config.settle_ms, "Waiting for subscribers to connect");
        tokio::time::sleep(delay).await;
    }
}
