//! Opaque world context handed through to terrain generators.

use serde::{Deserialize, Serialize};

/// World dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Overworld,
    Nether,
    End,
}

/// Context token identifying the world a chunk is generated for.
///
/// Generators receive this unmodified with every sample call; the terrain
/// pipeline itself never interprets it beyond carrying the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldContext {
    seed: u64,
    dimension: Dimension,
}

impl WorldContext {
    pub fn new(seed: u64, dimension: Dimension) -> Self {
        Self { seed, dimension }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_context_accessors() {
        let world = WorldContext::new(42, Dimension::Overworld);
        assert_eq!(world.seed(), 42);
        assert_eq!(world.dimension(), Dimension::Overworld);
    }
}
