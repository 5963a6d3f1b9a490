//! Kindred Server - WebSocket server for family graph queries
//!
//! Clients speak JSON-RPC 2.0 over a WebSocket. The server supports:
//! - Multiple concurrent connections sharing one graph
//! - Family tree and pairwise relationship queries
//! - Adding people and relations, persisted when a snapshot store is attached

use kindred_graph::{KinGraph, SnapshotStore, StoreError, DEFAULT_MAX_DEPTH};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Shared graph state across connections.
pub type SharedGraph = Arc<RwLock<KinGraph>>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where mutated graphs are written.
pub trait SnapshotSink: Send + Sync {
    fn save(&self, graph: &KinGraph) -> Result<(), StoreError>;
}

impl SnapshotSink for SnapshotStore {
    fn save(&self, graph: &KinGraph) -> Result<(), StoreError> {
        SnapshotStore::save(self, graph)
    }
}

/// Everything a handler needs.
#[derive(Clone)]
pub struct ServerContext {
    pub graph: SharedGraph,
    pub snapshot: Option<Arc<dyn SnapshotSink>>,
    pub max_tree_depth: usize,
}

impl ServerContext {
    pub fn new(graph: SharedGraph) -> Self {
        Self {
            graph,
            snapshot: None,
            max_tree_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Writes the graph to the snapshot store, if one is attached.
    pub fn persist(&self, graph: &KinGraph) -> Result<(), StoreError> {
        match &self.snapshot {
            Some(store) => store.save(graph),
            None => Ok(()),
        }
    }
}

mod handlers;
mod protocol;
mod server;

pub use handlers::kin_error;
pub use protocol::{Request, Response, RpcError};
pub use server::{process_message, KindredServer, ServerConfig};
