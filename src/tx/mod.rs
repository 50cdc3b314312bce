//! Extrinsic descriptions and the submission seam.
//!
//! Signing happens outside this crate. A [`TransactionSubmitter`] receives a
//! composed [`Call`] and reports [`TransactionStatus`] transitions until the
//! transaction is finalized or fails.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

pub mod calls;

/// One named positional argument of a call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallArg {
    pub name: String,
    pub value: Value,
}

/// A pallet call with positional arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub pallet: String,
    pub call: String,
    pub args: Vec<CallArg>,
}

impl Call {
    pub fn new(pallet: &str, call: &str) -> Self {
        Self {
            pallet: pallet.to_string(),
            call: call.to_string(),
            args: Vec::new(),
        }
    }

    /// Append the next positional argument.
    pub fn arg<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.args.push(CallArg {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn arg_names(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn arg_values(&self) -> Vec<&Value> {
        self.args.iter().map(|a| &a.value).collect()
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.pallet, self.call, self.arg_names().join(", "))
    }
}

/// Lifecycle of a submitted transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[default]
    Idle,
    Sending,
    InBlock(String),
    Finalized(String),
    Failed(String),
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Finalized(_) | TransactionStatus::Failed(_))
    }

    /// A transaction is underway and must not be resubmitted.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TransactionStatus::Sending | TransactionStatus::InBlock(_))
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Idle => write!(f, "Idle"),
            TransactionStatus::Sending => write!(f, "Sending..."),
            TransactionStatus::InBlock(hash) => write!(f, "In block {}", hash),
            TransactionStatus::Finalized(hash) => write!(f, "Finalized in block {}", hash),
            TransactionStatus::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("signer {0} is not available")]
    UnknownSigner(String),

    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// Signs and submits calls on behalf of a signer.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Submit `call` signed by `signer` and stream its status transitions.
    async fn submit(&self, call: Call, signer: &str) -> Result<mpsc::Receiver<TransactionStatus>, SubmitError>;
}

/// Submitter that logs the composed call and reports immediate finality.
pub struct DryRunSubmitter;

pub const DRY_RUN_BLOCK_HASH: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

#[async_trait]
impl TransactionSubmitter for DryRunSubmitter {
    async fn submit(&self, call: Call, signer: &str) -> Result<mpsc::Receiver<TransactionStatus>, SubmitError> {
        if signer.trim().is_empty() {
            return Err(SubmitError::UnknownSigner(signer.to_string()));
        }
        tracing::info!("dry run: {} signed by {}", call, signer);
        tracing::debug!(
            "dry run arguments: {}",
            serde_json::to_string(&call.arg_values()).unwrap_or_default()
        );
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for status in [
                TransactionStatus::Sending,
                TransactionStatus::InBlock(DRY_RUN_BLOCK_HASH.to_string()),
                TransactionStatus::Finalized(DRY_RUN_BLOCK_HASH.to_string()),
            ] {
                if tx.send(status).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }
}

/// Drive a status stream to its end, reporting each transition.
///
/// A stream that closes before a terminal status counts as failed.
pub async fn follow<F>(mut rx: mpsc::Receiver<TransactionStatus>, mut on_status: F) -> TransactionStatus
where
    F: FnMut(&TransactionStatus),
{
    while let Some(status) = rx.recv().await {
        on_status(&status);
        if status.is_terminal() {
            return status;
        }
    }
    let failed = TransactionStatus::Failed("status stream closed before finalization".into());
    on_status(&failed);
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_display_lists_argument_names() {
        let call = Call::new("siipModule", "removeCertificate").arg("domain", "website.com");
        assert_eq!(call.to_string(), "siipModule.removeCertificate(domain)");
        assert_eq!(call.arg_values(), vec![&json!("website.com")]);
    }

    #[test]
    fn status_classification() {
        assert!(TransactionStatus::Sending.is_in_flight());
        assert!(TransactionStatus::InBlock("0x1".into()).is_in_flight());
        assert!(!TransactionStatus::Idle.is_in_flight());
        assert!(TransactionStatus::Finalized("0x1".into()).is_terminal());
        assert!(TransactionStatus::Failed("nope".into()).is_terminal());
        assert!(!TransactionStatus::Sending.is_terminal());
    }

    #[tokio::test]
    async fn dry_run_reaches_finalized() {
        let call = Call::new("balances", "transfer").arg("dest", "5Grw").arg("amount", 10);
        let rx = DryRunSubmitter.submit(call, "//Alice").await.unwrap();
        let mut seen = Vec::new();
        let last = follow(rx, |s| seen.push(s.clone())).await;
        assert_eq!(last, TransactionStatus::Finalized(DRY_RUN_BLOCK_HASH.into()));
        assert_eq!(seen[0], TransactionStatus::Sending);
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn dry_run_needs_a_signer() {
        let call = Call::new("balances", "transfer");
        assert!(matches!(
            DryRunSubmitter.submit(call, " ").await,
            Err(SubmitError::UnknownSigner(_))
        ));
    }

    #[tokio::test]
    async fn closed_stream_counts_as_failure() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(TransactionStatus::Sending).await.unwrap();
        drop(tx);
        let last = follow(rx, |_| {}).await;
        assert!(matches!(last, TransactionStatus::Failed(_)));
    }
}
