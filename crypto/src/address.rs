//! Chain-prefixed bech32 addresses.
//!
//! Address format: `<chain>-<hrp>1<data><checksum>`, e.g. `P-local1...`.
//! The data part is the 20-byte address regrouped into 5-bit words under
//! the BIP-173 bech32 checksum.

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use subnet_types::{NetworkId, ShortId};

use crate::error::CryptoError;

/// Chain alias of the platform chain.
pub const P_CHAIN_ALIAS: &str = "P";

/// Encode raw bytes as bech32 under `hrp`.
pub fn bech32_encode(hrp: &str, payload: &[u8]) -> Result<String, CryptoError> {
    let invalid = |reason: String| CryptoError::InvalidAddress {
        address: hrp.to_string(),
        reason,
    };
    let parsed = Hrp::parse(hrp).map_err(|e| invalid(e.to_string()))?;
    bech32::encode::<Bech32>(parsed, payload).map_err(|e| invalid(e.to_string()))
}

/// Decode a bech32 string into `(hrp, payload)`. The hrp is lowercased.
pub fn bech32_decode(s: &str) -> Result<(String, Vec<u8>), CryptoError> {
    let checked = CheckedHrpstring::new::<Bech32>(s).map_err(|e| CryptoError::InvalidAddress {
        address: s.to_string(),
        reason: e.to_string(),
    })?;
    Ok((checked.hrp().to_lowercase(), checked.byte_iter().collect()))
}

/// Format an address as `<chain>-<hrp>1...`.
pub fn format_address(chain: &str, hrp: &str, address: &ShortId) -> Result<String, CryptoError> {
    Ok(format!("{chain}-{}", bech32_encode(hrp, address.as_bytes())?))
}

/// Format a platform-chain address for the given network.
pub fn format_p_address(network: NetworkId, address: &ShortId) -> Result<String, CryptoError> {
    format_address(P_CHAIN_ALIAS, network.hrp(), address)
}

/// Parse `<chain>-<hrp>1...` into `(chain, hrp, address)`.
pub fn parse_address(s: &str) -> Result<(String, String, ShortId), CryptoError> {
    let (chain, body) = s.split_once('-').ok_or_else(|| CryptoError::InvalidAddress {
        address: s.to_string(),
        reason: "missing chain alias".into(),
    })?;
    let (hrp, payload) = bech32_decode(body)?;
    let address = ShortId::from_slice(&payload).map_err(|e| CryptoError::InvalidAddress {
        address: s.to_string(),
        reason: e.to_string(),
    })?;
    Ok((chain.to_string(), hrp, address))
}
