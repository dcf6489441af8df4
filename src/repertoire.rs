//! The currently loaded repertoire, as a versioned swappable handle.
//!
//! A reload builds its [`GameTree`] completely in isolation and only then
//! swaps it in under a short write lock, so readers holding a snapshot keep
//! a consistent tree across reloads and a failed load leaves the previous
//! tree active. There is no interior mutation of trees anywhere.

use std::sync::{Arc, RwLock};

use log::{info, warn};

use crate::error::LoadError;
use crate::tree::GameTree;

struct Active {
    tree: Option<Arc<GameTree>>,
    version: u64,
}

pub struct Repertoire {
    active: RwLock<Active>,
}

impl Repertoire {
    /// An empty handle; queries return no tree until the first load.
    pub fn new() -> Self {
        Repertoire {
            active: RwLock::new(Active { tree: None, version: 0 }),
        }
    }

    /// Parses, builds and atomically swaps in a new tree. Returns the new
    /// version on success; on failure the previous tree stays active.
    pub fn load_str(&self, pgn: &str) -> Result<u64, LoadError> {
        let tree = match GameTree::from_pgn(pgn) {
            Ok(tree) => tree,
            Err(err) => {
                warn!("repertoire load failed, keeping previous tree: {}", err);
                return Err(err);
            }
        };

        let tree = Arc::new(tree);
        let mut active = self.active.write().expect("repertoire lock poisoned");
        active.version += 1;
        info!(
            "repertoire v{} loaded: {} nodes, max depth {}",
            active.version,
            tree.len(),
            tree.max_depth(),
        );
        active.tree = Some(tree);
        Ok(active.version)
    }

    /// The active tree, if any. The snapshot stays valid across later
    /// reloads; drop it to release the old tree.
    pub fn snapshot(&self) -> Option<Arc<GameTree>> {
        self.active
            .read()
            .expect("repertoire lock poisoned")
            .tree
            .clone()
    }

    /// Monotonic load counter; 0 before the first successful load.
    pub fn version(&self) -> u64 {
        self.active.read().expect("repertoire lock poisoned").version
    }
}

impl Default for Repertoire {
    fn default() -> Self {
        Self::new()
    }
}
