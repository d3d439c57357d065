//! Proving control of a subnet.
//!
//! Subnet-scoped transactions carry a [`SubnetAuth`] listing positions in
//! the subnet owner's address list, plus one extra credential signed by
//! those addresses. The owner comes from the subnet's creation transaction.

use subnet_rpc::PlatformApi;
use subnet_transactions::{Codec, CodecError, OutputOwners, SubnetAuth, Tx, UnsignedTx};
use subnet_types::{Id, ShortId};

use crate::error::WalletError;
use crate::keys::KeyManager;

/// The authorization proof and who must sign it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubnetAuthorization {
    pub auth: SubnetAuth,
    /// Signer set for the subnet-auth credential, aligned with
    /// `auth.sig_indices`.
    pub signers: Vec<ShortId>,
    pub owner: OutputOwners,
}

/// Extract the owner from the signed bytes of a subnet's creation
/// transaction.
pub fn subnet_owner(codec: &Codec, bytes: &[u8]) -> Result<OutputOwners, WalletError> {
    let tx = Tx::from_bytes(codec, bytes).map_err(|e| match e {
        CodecError::UnknownOwner(found) => WalletError::UnknownOwners(found),
        CodecError::UnsupportedType(found) => WalletError::WrongTxType { found },
        other => WalletError::Codec(other),
    })?;
    match tx.unsigned() {
        UnsignedTx::CreateSubnet(create) => Ok(create.owner.clone()),
        other => Err(WalletError::WrongTxType {
            found: other.kind().name(),
        }),
    }
}

/// Match `key` against `owner` at `now`.
pub fn authorize_owner<K: KeyManager + ?Sized>(
    key: &K,
    owner: &OutputOwners,
    now: u64,
) -> Result<SubnetAuthorization, WalletError> {
    match key.match_owners(owner, now) {
        Some(m) => Ok(SubnetAuthorization {
            auth: SubnetAuth {
                sig_indices: m.sig_indices,
            },
            signers: m.signers,
            owner: owner.clone(),
        }),
        None => {
            let matched = if now < owner.locktime {
                0
            } else {
                owner.addresses.iter().filter(|a| key.holds(a)).count()
            };
            Err(WalletError::CantSign {
                threshold: owner.threshold,
                matched,
            })
        }
    }
}

/// Fetch the owner of `subnet_id` and authorize `key` against it.
pub async fn authorize<K: KeyManager + ?Sized>(
    api: &dyn PlatformApi,
    codec: &Codec,
    key: &K,
    subnet_id: &Id,
    now: u64,
) -> Result<SubnetAuthorization, WalletError> {
    let bytes = api.get_tx(subnet_id).await?;
    let owner = subnet_owner(codec, &bytes)?;
    let authorization = authorize_owner(key, &owner, now)?;
    tracing::debug!(
        subnet = %subnet_id,
        threshold = owner.threshold,
        signers = authorization.signers.len(),
        "authorized for subnet"
    );
    Ok(authorization)
}
