//! Private key files.
//!
//! Two formats are read:
//! 1. the `PrivateKey-<cb58>` text form, optionally followed by a line ending
//! 2. 64 hex characters followed by at most two newline bytes
//!
//! Keys are always written in the hex form, readable only by the owner.

use std::fs;
use std::io::Write;
use std::path::Path;

use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::soft_key::SoftKey;

const TEXT_PREFIX: &str = "PrivateKey-";
const HEX_KEY_LEN: usize = 64;
const MAX_TRAILING_NEWLINES: usize = 2;

/// Read a key file into a [`SoftKey`].
pub fn load_key(path: &Path) -> Result<SoftKey, WalletError> {
    let contents = Zeroizing::new(fs::read(path)?);
    let key = parse_key_file(&contents)?;
    tracing::debug!(path = %path.display(), address = %key.address(), "loaded key file");
    Ok(key)
}

/// Parse key file contents.
pub fn parse_key_file(contents: &[u8]) -> Result<SoftKey, WalletError> {
    if contents.starts_with(TEXT_PREFIX.as_bytes()) {
        let text = std::str::from_utf8(contents).map_err(|_| WalletError::InvalidPrivateKeyEncoding)?;
        return text
            .trim_end_matches(['\r', '\n'])
            .parse()
            .map_err(|_| WalletError::InvalidPrivateKey);
    }

    if contents.len() < HEX_KEY_LEN {
        return Err(WalletError::InvalidPrivateKeyLength);
    }
    let (body, tail) = contents.split_at(HEX_KEY_LEN);
    if tail.len() > MAX_TRAILING_NEWLINES || tail.iter().any(|b| *b != b'\n') {
        return Err(WalletError::InvalidPrivateKeyEnding);
    }
    let raw = Zeroizing::new(hex::decode(body).map_err(|_| WalletError::InvalidPrivateKeyEncoding)?);
    SoftKey::from_bytes(&raw).map_err(|_| WalletError::InvalidPrivateKey)
}

/// Write `key` as hex to `path`, failing if the file already exists.
pub fn save_key(path: &Path, key: &SoftKey) -> Result<(), WalletError> {
    let encoded = Zeroizing::new(hex::encode(key.raw_bytes()));
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(encoded.as_bytes())?;
    file.sync_all()?;
    tracing::info!(path = %path.display(), address = %key.address(), "saved key file");
    Ok(())
}
