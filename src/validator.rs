//! Field validation against the remote validator endpoint.
//!
//! The validator answers each `validate_*` method with newline separated
//! `Ok: <message>` / `Err: <message>` lines. Those are parsed into a
//! [`ValidationReport`] as soon as they arrive.

use std::fmt;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::rpc::{RpcClient, RpcError};

/// Certificate form fields
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CertField {
    Domain,
    #[value(name = "name")]
    OwnerName,
    #[value(name = "ip")]
    IpAddr,
    Info,
    #[value(name = "key")]
    PublicKey,
    Email,
}

impl CertField {
    pub const ALL: [CertField; 6] = [
        CertField::Domain,
        CertField::OwnerName,
        CertField::IpAddr,
        CertField::Info,
        CertField::PublicKey,
        CertField::Email,
    ];

    /// Validator RPC method for this field
    pub fn method(self) -> &'static str {
        match self {
            CertField::Domain => "validate_domain",
            CertField::OwnerName => "validate_name",
            CertField::IpAddr => "validate_ip",
            CertField::Info => "validate_info",
            CertField::PublicKey => "validate_key",
            CertField::Email => "validate_email",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CertField::Domain => "Domain Name",
            CertField::OwnerName => "Owner's Name",
            CertField::IpAddr => "IPv4 Address",
            CertField::Info => "Info",
            CertField::PublicKey => "Public Key",
            CertField::Email => "Email",
        }
    }
}

impl fmt::Display for CertField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of validator output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub ok: bool,
    pub message: String,
}

/// Structured validator verdict for one field value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub criteria: Vec<Criterion>,
}

impl ValidationReport {
    /// Parse the line encoded validator output.
    ///
    /// Lines that carry neither marker are kept as failing criteria.
    pub fn parse(encoded: &str) -> Self {
        let criteria = encoded
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(|line| {
                if let Some(message) = line.strip_prefix("Ok:") {
                    Criterion { ok: true, message: message.trim_start().to_string() }
                } else if let Some(message) = line.strip_prefix("Err:") {
                    Criterion { ok: false, message: message.trim_start().to_string() }
                } else {
                    Criterion { ok: false, message: line.to_string() }
                }
            })
            .collect();
        Self { criteria }
    }

    /// Build a report from locally evaluated checks.
    pub fn from_checks<I, S>(checks: I) -> Self
    where
        I: IntoIterator<Item = (bool, S)>,
        S: Into<String>,
    {
        Self {
            criteria: checks
                .into_iter()
                .map(|(ok, message)| Criterion { ok, message: message.into() })
                .collect(),
        }
    }

    /// True when no criterion failed.
    pub fn ok(&self) -> bool {
        self.criteria.iter().all(|c| c.ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter().filter(|c| !c.ok)
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("validator unreachable: {0}")]
    Rpc(#[from] RpcError),
}

/// Remote field validator
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, field: CertField, value: &str) -> Result<ValidationReport, ValidationError>;
}

/// `Validator` calling the JSON-RPC `validate_*` methods.
pub struct RpcValidator {
    client: RpcClient,
}

impl RpcValidator {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Validator for RpcValidator {
    async fn validate(&self, field: CertField, value: &str) -> Result<ValidationReport, ValidationError> {
        let encoded: String = self.client.call(field.method(), json!([value])).await?;
        tracing::debug!("{} -> {:?}", field.method(), encoded);
        Ok(ValidationReport::parse(&encoded))
    }
}
