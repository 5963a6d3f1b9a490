use crate::graph::KinGraph;
use sled::Db;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const GRAPH_KEY: &str = "family_graph";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Persists a whole [`KinGraph`] between runs.
pub struct SnapshotStore {
    db: Db,
}

impl SnapshotStore {
    /// Opens or creates a snapshot store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Saves the graph, replacing any previous snapshot.
    ///
    /// The graph is serialized with bincode under a single fixed key.
    pub fn save(&self, graph: &KinGraph) -> Result<(), StoreError> {
        let bytes = bincode::serialize(graph)?;
        debug!("Saving snapshot ({} bytes)", bytes.len());
        self.db.insert(GRAPH_KEY, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Loads the last saved graph, if any.
    pub fn load(&self) -> Result<Option<KinGraph>, StoreError> {
        match self.db.get(GRAPH_KEY)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Loads the saved graph or starts an empty one.
    pub fn load_or_default(&self) -> Result<KinGraph, StoreError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Clears the stored graph.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.db.remove(GRAPH_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}
