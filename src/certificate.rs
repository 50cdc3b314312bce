use serde::{Deserialize, Serialize};

use crate::validator::CertField;

/// A SIIP certificate as stored by the registry pallet.
///
/// `version_number == 0` is the pallet's default value and means the domain
/// has no registration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub domain: String,
    pub owner_name: String,
    pub ip_addr: String,
    pub info: String,
    pub public_key: String,
    pub email: Option<String>,
    pub version_number: i32,
    /// Hex encoded account id of the registering signer
    pub owner_id: Option<String>,
}

impl CertificateRecord {
    /// Whether this record represents an existing registration.
    pub fn exists(&self) -> bool {
        self.version_number > 0
    }

    /// Value of a single form field.
    pub fn field(&self, field: CertField) -> &str {
        match field {
            CertField::Domain => &self.domain,
            CertField::OwnerName => &self.owner_name,
            CertField::IpAddr => &self.ip_addr,
            CertField::Info => &self.info,
            CertField::PublicKey => &self.public_key,
            CertField::Email => self.email.as_deref().unwrap_or(""),
        }
    }
}

/// Flat record emitted by `siip dump`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpEntry {
    pub name: String,
    pub info: String,
    pub pubkey: String,
    pub ipaddr: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub version: i32,
}

impl From<&CertificateRecord> for DumpEntry {
    fn from(record: &CertificateRecord) -> Self {
        DumpEntry {
            name: record.owner_name.clone(),
            info: record.info.clone(),
            pubkey: record.public_key.clone(),
            ipaddr: record.ip_addr.clone(),
            domain: record.domain.clone(),
            email: record.email.clone(),
            version: record.version_number,
        }
    }
}
