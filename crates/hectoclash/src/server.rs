//! `HectoclashServer` builder and server loop.
//!
//! This is the entry point for running a duel server. It ties together
//! all the layers: transport → protocol → hub → store.

use std::sync::Arc;

use hectoclash_engine::{PuzzleSource, RandomPuzzles};
use hectoclash_protocol::{Codec, JsonCodec};
use hectoclash_room::{HubHandle, spawn_hub};
use hectoclash_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::persistence::{Persistence, spawn_persistence};
use crate::store::{GameStore, MemoryStore};
use crate::{HectoclashError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<S: GameStore, C: Codec> {
    pub(crate) hub: HubHandle,
    pub(crate) store: Arc<S>,
    pub(crate) codec: C,
    pub(crate) outbound_capacity: usize,
}

/// Builder for configuring and starting a Hectoclash server.
///
/// # Example
///
/// ```rust,no_run
/// use hectoclash::{HectoclashServer, ServerConfig};
///
/// # async fn run() -> Result<(), hectoclash::HectoclashError> {
/// let server = HectoclashServer::builder()
///     .config(ServerConfig::from_env())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct HectoclashServerBuilder {
    config: ServerConfig,
    puzzles: Arc<dyn PuzzleSource>,
}

impl HectoclashServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            puzzles: Arc::new(RandomPuzzles),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets where room puzzles come from. Defaults to [`RandomPuzzles`].
    pub fn puzzles(mut self, source: impl PuzzleSource) -> Self {
        self.puzzles = Arc::new(source);
        self
    }

    /// Binds the listener and starts the hub with an in-memory store.
    pub async fn build(self) -> Result<HectoclashServer<MemoryStore>, HectoclashError> {
        let store = Arc::new(MemoryStore::new(self.config.auto_open_games));
        self.build_with_store(store).await
    }

    /// Binds the listener and starts the hub with the given store.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build_with_store<S: GameStore>(
        self,
        store: Arc<S>,
    ) -> Result<HectoclashServer<S>, HectoclashError> {
        let transport = WebSocketTransport::bind(&self.config.addr).await?;

        let persistence = spawn_persistence(Arc::clone(&store));
        let hub = spawn_hub(self.config.hub.clone(), self.puzzles, persistence.clone());

        let state = Arc::new(ServerState {
            hub,
            store,
            codec: JsonCodec,
            outbound_capacity: self.config.hub.outbound_capacity,
        });

        Ok(HectoclashServer {
            transport,
            state,
            persistence,
        })
    }
}

impl Default for HectoclashServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Hectoclash server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HectoclashServer<S: GameStore> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S, JsonCodec>>,
    persistence: Persistence,
}

impl HectoclashServer<MemoryStore> {
    /// Creates a new builder.
    pub fn builder() -> HectoclashServerBuilder {
        HectoclashServerBuilder::new()
    }
}

impl<S: GameStore> HectoclashServer<S> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the room hub, for inspecting rooms.
    pub fn hub(&self) -> HubHandle {
        self.state.hub.clone()
    }

    /// The store games are recorded in.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.state.store)
    }

    /// The persistence bridge, for waiting on queued store writes.
    pub fn persistence(&self) -> Persistence {
        self.persistence.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), HectoclashError> {
        match self.transport.local_addr() {
            Ok(addr) => tracing::info!(%addr, "Hectoclash server running"),
            Err(_) => tracing::info!("Hectoclash server running"),
        }

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
