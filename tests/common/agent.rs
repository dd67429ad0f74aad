//! In-process SNMP agent for testing.
//!
//! Wraps the library's Agent with automatic lifecycle management.
//! Agents bind to ephemeral localhost ports and shut down cleanly on drop.

use crate::common::fixtures;

use snmp_v1::agent::RequestHandler;
use snmp_v1::{Agent, ClientConfig, Communicator, MapHandler, Oid, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// An in-process SNMP agent for testing.
///
/// Automatically starts on creation and stops on drop.
/// Uses ephemeral localhost ports to avoid conflicts.
pub struct TestAgent {
    addr: SocketAddr,
    map: Arc<MapHandler>,
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

impl TestAgent {
    /// Create an agent with default system MIB data.
    pub async fn new() -> Self {
        Self::with_data(fixtures::system_mib()).await
    }

    /// Create an agent serving `initial` from a [`MapHandler`].
    pub async fn with_data(initial: BTreeMap<Oid, Value>) -> Self {
        Self::with_handlers(Arc::new(MapHandler::new(initial)), Vec::new()).await
    }

    /// Create an agent with `map` first, then `extra` handlers in order.
    pub async fn with_handlers(map: Arc<MapHandler>, extra: Vec<Arc<dyn RequestHandler>>) -> Self {
        let cancel = CancellationToken::new();

        let mut builder = Agent::builder()
            .bind("127.0.0.1:0")
            .handler_timeout(Duration::from_millis(200))
            .cancel(cancel.clone())
            .handler(map.clone());
        for handler in extra {
            builder = builder.handler(handler);
        }
        let agent = builder.build().await.expect("failed to build test agent");

        let addr = agent.local_addr();

        let task = tokio::spawn(async move {
            if let Err(e) = agent.run().await {
                eprintln!("TestAgent error: {}", e);
            }
        });

        Self {
            addr,
            map,
            cancel,
            _task: task,
        }
    }

    /// Get the agent's listening address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The handler holding the agent's data.
    pub fn map(&self) -> &MapHandler {
        &self.map
    }

    /// Communicator pointed at this agent.
    pub async fn client(&self) -> Communicator {
        self.client_with(ClientConfig {
            timeout: Duration::from_secs(2),
            ..ClientConfig::default()
        })
        .await
    }

    /// Communicator pointed at this agent, with `config`.
    pub async fn client_with(&self, config: ClientConfig) -> Communicator {
        Communicator::connect(&self.addr.ip().to_string(), self.addr.port(), config)
            .await
            .expect("failed to connect to test agent")
    }

    /// Explicitly stop the agent.
    ///
    /// Called automatically on drop, but can be called early if needed.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TestAgent {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
