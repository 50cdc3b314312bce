//! Account ids and free balance from `System::Account`.

use std::fmt;

use codec::Decode;
use serde::{Deserialize, Serialize};
use sp_crypto_hashing::blake2_512;

use super::codec::{blake2_128_concat, from_hex, storage_prefix, to_hex, DecodeError};
use super::{read_storage, QueryError};
use crate::rpc::RpcClient;

/// Address format of generic substrate chains.
pub const DEFAULT_SS58_PREFIX: u8 = 42;

const SS58_CONTEXT: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;

/// 32 byte account id (sr25519 public key).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Parse an SS58 address or a `0x` prefixed hex account id.
    pub fn parse(input: &str) -> Result<Self, DecodeError> {
        let input = input.trim();
        if input.starts_with("0x") {
            let bytes = from_hex(input)?;
            return Self::from_slice(&bytes);
        }
        Self::from_ss58(input)
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let id: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DecodeError::Account(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(id))
    }

    fn from_ss58(address: &str) -> Result<Self, DecodeError> {
        let data = bs58::decode(address)
            .into_vec()
            .map_err(|e| DecodeError::Account(e.to_string()))?;
        let prefix_len = match data.first().copied() {
            Some(0..=63) => 1,
            Some(64..=127) => 2,
            _ => return Err(DecodeError::Account("unknown address format".to_string())),
        };
        if data.len() != prefix_len + 32 + CHECKSUM_LEN {
            return Err(DecodeError::Account(format!("unexpected address length {}", data.len())));
        }
        let body = data.len() - CHECKSUM_LEN;
        if ss58_checksum(&data[..body]) != data[body..] {
            return Err(DecodeError::Account("checksum mismatch".to_string()));
        }
        Self::from_slice(&data[prefix_len..body])
    }

    /// SS58 address with a single byte network prefix.
    pub fn to_ss58(&self, prefix: u8) -> String {
        let mut data = Vec::with_capacity(1 + 32 + CHECKSUM_LEN);
        data.push(prefix & 0b0011_1111);
        data.extend_from_slice(&self.0);
        let checksum = ss58_checksum(&data);
        data.extend_from_slice(&checksum);
        bs58::encode(data).into_string()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_hex(&self.0))
    }
}

fn ss58_checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut preimage = SS58_CONTEXT.to_vec();
    preimage.extend_from_slice(data);
    let hash = blake2_512(&preimage);
    [hash[0], hash[1]]
}

/// `System::Account` key of `account`.
pub fn account_key(account: &AccountId) -> Vec<u8> {
    let mut key = storage_prefix("System", "Account");
    key.extend(blake2_128_concat(&account.0));
    key
}

/// Balances held by one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub address: String,
    pub account_id: String,
    pub nonce: u32,
    pub free: u128,
    pub reserved: u128,
}

/// Decode nonce, free and reserved balance from an `AccountInfo` value.
///
/// The reference counters between the nonce and the balances changed between
/// runtime versions. The nonce leads and the four `u128` balance fields close
/// the value in every layout.
pub fn decode_account_info(data: &[u8]) -> Result<(u32, u128, u128), DecodeError> {
    const BALANCES_LEN: usize = 4 * 16;
    if data.len() < 4 + BALANCES_LEN {
        return Err(DecodeError::Truncated(data.len()));
    }
    let nonce = u32::decode(&mut &data[..4])?;
    let mut balances = &data[data.len() - BALANCES_LEN..];
    let free = u128::decode(&mut balances)?;
    let reserved = u128::decode(&mut balances)?;
    Ok((nonce, free, reserved))
}

/// Read the balance of `account`. Accounts never seen on chain hold nothing.
pub async fn account_balance(client: &RpcClient, account: &AccountId) -> Result<AccountBalance, QueryError> {
    let key = account_key(account);
    tracing::debug!("state_getStorage {} ({})", to_hex(&key), account);
    let (nonce, free, reserved) = match read_storage(client, &key).await? {
        Some(bytes) => decode_account_info(&bytes)?,
        None => (0, 0, 0),
    };
    Ok(AccountBalance {
        address: account.to_ss58(DEFAULT_SS58_PREFIX),
        account_id: account.to_string(),
        nonce,
        free,
        reserved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::Encode;

    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const ALICE_ID: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";

    #[test]
    fn ss58_and_hex_name_the_same_account() {
        let from_ss58 = AccountId::parse(ALICE).unwrap();
        let from_hex = AccountId::parse(ALICE_ID).unwrap();
        assert_eq!(from_ss58, from_hex);
        assert_eq!(from_ss58.to_string(), ALICE_ID);
        assert_eq!(from_hex.to_ss58(DEFAULT_SS58_PREFIX), ALICE);
    }

    #[test]
    fn corrupted_address_is_rejected() {
        let mut corrupted = ALICE.to_string();
        corrupted.pop();
        corrupted.push('Z');
        assert!(AccountId::parse(&corrupted).is_err());
        assert!(AccountId::parse("0xd435").is_err());
        assert!(AccountId::parse("not an address").is_err());
    }

    #[test]
    fn account_key_matches_known_storage_key() {
        let alice = AccountId::parse(ALICE_ID).unwrap();
        assert_eq!(
            to_hex(&account_key(&alice)),
            "0x26aa394eea5630e07c48ae0c9558cef7b99d880ec681799c0cf30e8886371da9\
             de1e86a9a8c739864cf3cc5ec2bea59f\
             d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d"
        );
    }

    #[test]
    fn balances_are_read_from_the_tail() {
        // nonce, consumers, providers, sufficients, then free/reserved/frozen/flags
        let current = (5u32, 1u32, 1u32, 0u32, 1_000u128, 20u128, 0u128, 0u128).encode();
        assert_eq!(decode_account_info(&current).unwrap(), (5, 1_000, 20));

        // older runtimes only carry a single reference counter
        let legacy = (3u32, 0u32, u128::MAX, 0u128, 0u128, 0u128).encode();
        assert_eq!(decode_account_info(&legacy).unwrap(), (3, u128::MAX, 0));

        assert!(matches!(decode_account_info(&[0u8; 12]), Err(DecodeError::Truncated(12))));
    }
}
