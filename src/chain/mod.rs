use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::json;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::certificate::CertificateRecord;
use crate::rpc::{RpcClient, RpcError};

pub mod account;
pub mod codec;
pub mod democracy;
pub mod node;

use self::codec::{certificate_key, certificate_map_prefix, decode_certificate, from_hex, to_hex, DecodeError};

#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("failed to decode storage: {0}")]
    Decode(#[from] DecodeError),
}

/// Read-only access to certificate storage.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Look up the certificate registered for `domain`.
    ///
    /// Returns `None` when the domain has no registration.
    async fn certificate(&self, domain: &str) -> Result<Option<CertificateRecord>, QueryError>;

    /// Every certificate currently stored.
    async fn certificates(&self) -> Result<Vec<CertificateRecord>, QueryError>;

    /// Certificates pointing at `ip`.
    async fn reverse(&self, ip: &str) -> Result<Vec<CertificateRecord>, QueryError> {
        let ip = ip.trim();
        Ok(self
            .certificates()
            .await?
            .into_iter()
            .filter(|c| c.ip_addr.trim() == ip)
            .collect())
    }
}

/// `ChainQuery` backed by the node's `state_*` RPC methods.
pub struct RpcChainQuery {
    client: RpcClient,
    concurrency: usize,
}

impl RpcChainQuery {
    pub fn new(client: RpcClient, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    async fn storage(&self, key: &str) -> Result<Option<Vec<u8>>, QueryError> {
        fetch_storage(&self.client, key).await
    }
}

/// Raw value stored under `key`, `None` when the key is empty.
pub async fn read_storage(client: &RpcClient, key: &[u8]) -> Result<Option<Vec<u8>>, QueryError> {
    fetch_storage(client, &to_hex(key)).await
}

async fn fetch_storage(client: &RpcClient, key: &str) -> Result<Option<Vec<u8>>, QueryError> {
    let value: Option<String> = client.call("state_getStorage", json!([key])).await?;
    match value {
        Some(hex) => Ok(Some(from_hex(&hex)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl ChainQuery for RpcChainQuery {
    async fn certificate(&self, domain: &str) -> Result<Option<CertificateRecord>, QueryError> {
        let key = to_hex(&certificate_key(domain));
        tracing::debug!("state_getStorage {} ({})", key, domain);
        match self.storage(&key).await? {
            Some(bytes) => {
                let record = decode_certificate(&bytes)?;
                Ok(Some(record).filter(CertificateRecord::exists))
            }
            None => Ok(None),
        }
    }

    async fn certificates(&self) -> Result<Vec<CertificateRecord>, QueryError> {
        let prefix = to_hex(&certificate_map_prefix());
        let keys: Vec<String> = self.client.call("state_getKeys", json!([prefix])).await?;
        tracing::debug!("{} certificate key(s) under {}", keys.len(), prefix);

        let header_span = tracing::info_span!("certificate_scan");
        header_span.pb_set_style(&crate::output::progress::get_progress_style());
        header_span.pb_set_message("Reading certificates");
        header_span.pb_set_length(keys.len() as u64);
        header_span.pb_set_position(0);
        header_span.pb_start();

        let mut results = stream::iter(keys)
            .map(|key| async move {
                let value = self.storage(&key).await;
                (key, value)
            })
            .buffer_unordered(self.concurrency);

        let mut records = Vec::new();
        while let Some((key, value)) = results.next().await {
            header_span.pb_inc(1);
            match value? {
                Some(bytes) => match decode_certificate(&bytes) {
                    Ok(record) if record.exists() => records.push(record),
                    Ok(_) => {}
                    Err(e) => tracing::debug!("skipping {}: {}", key, e),
                },
                None => tracing::debug!("key {} vanished during scan", key),
            }
        }
        drop(header_span);

        records.sort_by(|a, b| a.domain.cmp(&b.domain));
        Ok(records)
    }
}

/// One delivery from a certificate subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Snapshot {
    /// Current storage state; `None` when the domain is unregistered.
    Record(Option<CertificateRecord>),
    /// The poll failed.
    Failed(String),
}

/// Handle to a polling subscription. Dropping it stops the poller.
pub struct Subscription {
    rx: mpsc::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Next delivery, or `None` once the poller stopped.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poll `domain`'s certificate every `interval`.
///
/// The first read is always delivered; later reads only when the snapshot
/// differs from the previous delivery, so a failure is reported once and the
/// first successful read after it is delivered again.
pub fn subscribe_certificate(
    query: Arc<dyn ChainQuery>,
    domain: String,
    interval: Duration,
) -> Subscription {
    let (tx, rx) = mpsc::channel(16);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last: Option<Snapshot> = None;
        loop {
            ticker.tick().await;
            let snapshot = match query.certificate(&domain).await {
                Ok(record) => Snapshot::Record(record),
                Err(e) => {
                    tracing::warn!("certificate query for {} failed: {}", domain, e);
                    Snapshot::Failed(e.to_string())
                }
            };
            if last.as_ref() == Some(&snapshot) {
                continue;
            }
            last = Some(snapshot.clone());
            if tx.send(snapshot).await.is_err() {
                break;
            }
        }
    });
    Subscription { rx, task }
}
