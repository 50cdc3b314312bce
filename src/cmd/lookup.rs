use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::Context;
use crate::certificate::CertificateRecord;
use crate::chain::{subscribe_certificate, ChainQuery, Snapshot};
use crate::cli::LookupArgs;
use crate::output::cert::print_certificate_tree;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LookupResult {
    pub domain: String,
    pub registered: bool,
    pub certificate: Option<CertificateRecord>,
}

impl LookupResult {
    fn new(domain: &str, certificate: Option<CertificateRecord>) -> Self {
        Self {
            domain: domain.to_string(),
            registered: certificate.is_some(),
            certificate,
        }
    }
}

fn emit(ctx: &Context, result: &LookupResult) -> Result<()> {
    ctx.output
        .emit(result, |r| print_certificate_tree(&r.domain, r.certificate.as_ref()))
}

/// Look up a domain's certificate, optionally following changes until Ctrl+C.
pub async fn run(ctx: &Context, args: LookupArgs) -> Result<()> {
    let domain = args.domain.trim().to_lowercase();
    let query: Arc<dyn ChainQuery> = ctx.chain()?;

    if !args.watch {
        let record = query.certificate(&domain).await?;
        return emit(ctx, &LookupResult::new(&domain, record));
    }

    let mut subscription = subscribe_certificate(query, domain.clone(), ctx.config.poll_interval());
    tracing::info!("Watching {} (Ctrl+C to stop)", domain);
    loop {
        tokio::select! {
            snapshot = subscription.recv() => match snapshot {
                Some(Snapshot::Record(record)) => emit(ctx, &LookupResult::new(&domain, record))?,
                Some(Snapshot::Failed(reason)) => tracing::error!("Lookup of {} failed: {}", domain, reason),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopped watching {}", domain);
                break;
            }
        }
    }
    subscription.unsubscribe();
    Ok(())
}
