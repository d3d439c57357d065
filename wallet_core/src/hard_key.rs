//! Key manager backed by an external signing device.
//!
//! Every call into the device blocks the calling thread and may wait for
//! a person to confirm on the device. Callers that need a timeout or a
//! progress indicator must provide it around [`KeyManager::sign_hash`].

use std::collections::HashMap;
use std::sync::Mutex;

use subnet_types::{ShortId, Signature};

use crate::error::WalletError;
use crate::keys::KeyManager;

/// Addresses derived up front from the device.
pub const DEVICE_ADDRESS_COUNT: u32 = 1024;

/// A hardware wallet or similar signer addressed by derivation index.
pub trait SigningDevice: Send {
    /// The first `count` addresses, in derivation order.
    fn addresses(&mut self, count: u32) -> Result<Vec<ShortId>, WalletError>;

    /// Sign `hash` with the keys at `indices`, one signature per index.
    fn sign_hash(&mut self, hash: &[u8; 32], indices: &[u32]) -> Result<Vec<Signature>, WalletError>;
}

pub struct HardKey {
    device: Mutex<Box<dyn SigningDevice>>,
    addresses: Vec<ShortId>,
    index: HashMap<ShortId, u32>,
}

impl HardKey {
    /// Derive [`DEVICE_ADDRESS_COUNT`] addresses from `device`.
    pub fn connect(device: Box<dyn SigningDevice>) -> Result<Self, WalletError> {
        Self::connect_with(device, DEVICE_ADDRESS_COUNT)
    }

    pub fn connect_with(mut device: Box<dyn SigningDevice>, count: u32) -> Result<Self, WalletError> {
        let addresses = device.addresses(count)?;
        if addresses.is_empty() {
            return Err(WalletError::Device("device returned no addresses".into()));
        }
        let index = addresses
            .iter()
            .enumerate()
            .map(|(i, a)| (*a, i as u32))
            .collect();
        tracing::info!(primary = %addresses[0], count = addresses.len(), "derived device addresses");
        Ok(Self {
            device: Mutex::new(device),
            addresses,
            index,
        })
    }
}

impl KeyManager for HardKey {
    fn addresses(&self) -> &[ShortId] {
        &self.addresses
    }

    fn holds(&self, address: &ShortId) -> bool {
        self.index.contains_key(address)
    }

    /// Blocks on the device for the whole batch.
    fn sign_hash(&self, hash: &[u8; 32], signers: &[ShortId]) -> Result<Vec<Signature>, WalletError> {
        let indices = signers
            .iter()
            .map(|s| self.index.get(s).copied().ok_or(WalletError::UnknownSigner(*s)))
            .collect::<Result<Vec<_>, _>>()?;
        let mut device = self
            .device
            .lock()
            .map_err(|_| WalletError::Device("device lock poisoned".into()))?;
        tracing::info!(signatures = indices.len(), "waiting for device to sign");
        let signatures = device.sign_hash(hash, &indices)?;
        if signatures.len() != indices.len() {
            return Err(WalletError::Device(format!(
                "requested {} signatures, got {}",
                indices.len(),
                signatures.len()
            )));
        }
        Ok(signatures)
    }
}
