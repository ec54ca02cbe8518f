//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which Meridian network a node participates in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkId {
    /// The production network.
    Live,
    /// The public test network.
    Test,
    /// Local development network.
    #[default]
    Dev,
}

impl NetworkId {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
            Self::Dev => "dev",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(NetworkId::Live.as_str(), "live");
        assert_eq!(NetworkId::Test.as_str(), "test");
        assert_eq!(NetworkId::Dev.as_str(), "dev");
    }
}
