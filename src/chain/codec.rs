//! SCALE decoding of stored certificates and storage key derivation.

use codec::{Decode, Encode};
use sp_crypto_hashing::{blake2_128, twox_128, twox_64};
use thiserror::Error;

use crate::certificate::CertificateRecord;

/// Pallet storage prefix
pub const PALLET_PREFIX: &str = "SiipModule";
/// Storage item holding certificates keyed by domain
pub const CERTIFICATE_MAP: &str = "CertificateMap";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid SCALE data: {0}")]
    Scale(#[from] codec::Error),

    #[error("invalid account: {0}")]
    Account(String),

    #[error("storage value too short: {0} bytes")]
    Truncated(usize),
}

/// On-chain layout of a certificate. Field order matters.
#[derive(Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub struct StoredCertificate {
    pub version_number: i32,
    pub owner_id: [u8; 32],
    pub owner_name: Vec<u8>,
    pub public_key_info: Vec<u8>,
    pub public_key: Vec<u8>,
    pub ip_addr: Vec<u8>,
    pub domain_name: Vec<u8>,
}

/// Encode a byte field with its compact length prefix.
pub fn encode_field(field: &[u8]) -> Vec<u8> {
    field.encode()
}

/// Parse one length-prefixed byte field from the front of `data`.
///
/// Returns the field and the remaining bytes.
pub fn decode_field(data: &[u8]) -> Result<(Vec<u8>, &[u8]), DecodeError> {
    let mut rest = data;
    let field = Vec::<u8>::decode(&mut rest)?;
    Ok((field, rest))
}

/// Decode a stored certificate value.
///
/// Runtimes that also store an email append it as a trailing byte field.
pub fn decode_certificate(data: &[u8]) -> Result<CertificateRecord, DecodeError> {
    let mut rest = data;
    let stored = StoredCertificate::decode(&mut rest)?;
    let email = if rest.is_empty() {
        None
    } else {
        let (email, _) = decode_field(rest)?;
        Some(text(&email))
    };
    Ok(CertificateRecord {
        domain: text(&stored.domain_name),
        owner_name: text(&stored.owner_name),
        ip_addr: text(&stored.ip_addr),
        info: text(&stored.public_key_info),
        public_key: text(&stored.public_key),
        email,
        version_number: stored.version_number,
        owner_id: Some(to_hex(&stored.owner_id)),
    })
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// `twox128(pallet) ++ twox128(item)`
pub fn storage_prefix(pallet: &str, item: &str) -> Vec<u8> {
    let mut key = twox_128(pallet.as_bytes()).to_vec();
    key.extend_from_slice(&twox_128(item.as_bytes()));
    key
}

/// Prefix under which every certificate is stored.
pub fn certificate_map_prefix() -> Vec<u8> {
    storage_prefix(PALLET_PREFIX, CERTIFICATE_MAP)
}

/// `blake2_128(key) ++ key`
pub fn blake2_128_concat(encoded: &[u8]) -> Vec<u8> {
    let mut out = blake2_128(encoded).to_vec();
    out.extend_from_slice(encoded);
    out
}

/// `twox64(key) ++ key`
pub fn twox_64_concat(encoded: &[u8]) -> Vec<u8> {
    let mut out = twox_64(encoded).to_vec();
    out.extend_from_slice(encoded);
    out
}

/// Full storage key of a domain's certificate (`blake2_128_concat` hasher).
pub fn certificate_key(domain: &str) -> Vec<u8> {
    let mut key = certificate_map_prefix();
    key.extend(blake2_128_concat(&encode_field(domain.as_bytes())));
    key
}

pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn from_hex(s: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(hex::decode(s.trim_start_matches("0x"))?)
}
