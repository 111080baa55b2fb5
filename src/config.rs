//! Index configuration.

/// Which query engine an [`AffixIndex`](crate::AffixIndex) builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// Forward and reverse tries; see [`DualTrieIndex`](crate::DualTrieIndex).
    #[default]
    Dual,
    /// One trie over interleaved words; see [`MixedTrieIndex`](crate::MixedTrieIndex).
    Mixed,
}

/// How trie nodes are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// One contiguous node vector; see [`ArenaStorage`](crate::ArenaStorage).
    #[default]
    Arena,
    /// Individually allocated nodes; see [`PointerStorage`](crate::PointerStorage).
    Pointer,
}

/// Configuration for building an [`AffixIndex`](crate::AffixIndex).
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Query engine
    pub engine: EngineKind,
    /// Node allocation strategy
    pub storage: StorageKind,
    /// Number of nodes to reserve up front. Only arena storage uses it.
    pub node_capacity: Option<usize>,
}

impl Config {
    /// Configuration for the given engine and storage with no reservation.
    pub fn new(engine: EngineKind, storage: StorageKind) -> Self {
        Self {
            engine,
            storage,
            node_capacity: None,
        }
    }

    /// Reserve room for `nodes` trie nodes before inserting.
    pub fn with_node_capacity(mut self, nodes: usize) -> Self {
        self.node_capacity = Some(nodes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine, EngineKind::Dual);
        assert_eq!(config.storage, StorageKind::Arena);
        assert_eq!(config.node_capacity, None);

        let config = Config::new(EngineKind::Mixed, StorageKind::Pointer).with_node_capacity(64);
        assert_eq!(config.engine, EngineKind::Mixed);
        assert_eq!(config.node_capacity, Some(64));
    }
}
