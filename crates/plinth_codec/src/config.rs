//! Codec configuration shared by both directions.

use serde::{Deserialize, Serialize};

/// Number of decimal digits a `Real` carries on the wire. A real `r` is
/// encoded as the integer `r * 10^REAL_PRECISION`; see [`crate::Real`].
pub const REAL_PRECISION: u32 = 6;

/// Settings that change how network-dependent primitives are converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Addresses are decoded as, and must be encoded from, mainnet addresses.
    pub is_mainnet: bool,
}

impl CodecConfig {
    /// Configuration for the given network.
    pub fn new(is_mainnet: bool) -> Self {
        Self { is_mainnet }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_testnet() {
        assert!(!CodecConfig::default().is_mainnet);
    }
}
