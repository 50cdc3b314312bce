pub mod balance;
pub mod certificate;
pub mod democracy;
pub mod dump;
pub mod lookup;
pub mod node;
pub mod reverse;
pub mod transfer;
pub mod validate;

use std::sync::Arc;

use anyhow::Result;

use crate::chain::RpcChainQuery;
use crate::cli::Cli;
use crate::config::Config;
use crate::output::tx::{print_submission_tree, FieldReport, SubmissionReport};
use crate::output::OutputTarget;
use crate::rpc::RpcClient;
use crate::tx::{follow, Call, DryRunSubmitter, TransactionStatus, TransactionSubmitter};
use crate::validator::RpcValidator;

/// Per-invocation state shared by the commands.
pub struct Context {
    pub config: Config,
    pub output: OutputTarget,
}

impl Context {
    pub fn new(cli: &Cli) -> Result<Self> {
        Ok(Self {
            config: Config::load(cli)?,
            output: OutputTarget::from_cli(cli),
        })
    }

    pub fn node_client(&self) -> Result<RpcClient> {
        Ok(RpcClient::new(&self.config.node_url, self.config.request_timeout())?)
    }

    pub fn chain(&self) -> Result<Arc<RpcChainQuery>> {
        Ok(Arc::new(RpcChainQuery::new(self.node_client()?, self.config.scan_concurrency)))
    }

    pub fn validator(&self) -> Result<Arc<RpcValidator>> {
        let client = RpcClient::new(&self.config.validator_url, self.config.request_timeout())?;
        Ok(Arc::new(RpcValidator::new(client)))
    }
}

/// Submit a locally validated call and report the outcome.
///
/// Nothing is submitted when any field fails its checks or `call` is absent.
pub async fn submit_call(ctx: &Context, call: Option<Call>, fields: Vec<FieldReport>) -> Result<()> {
    let mut report = SubmissionReport {
        call,
        signer: ctx.config.signer.clone(),
        fields,
        status: TransactionStatus::Idle,
    };
    let call = match &report.call {
        Some(call) if report.fields_ok() => call.clone(),
        _ => {
            ctx.output.emit(&report, print_submission_tree)?;
            anyhow::bail!("input did not pass validation, nothing submitted");
        }
    };

    tracing::info!("submitting {}", call);
    report.status = match DryRunSubmitter.submit(call, &ctx.config.signer).await {
        Ok(rx) => follow(rx, |status| tracing::info!("{}", status)).await,
        Err(e) => TransactionStatus::Failed(e.to_string()),
    };
    ctx.output.emit(&report, print_submission_tree)?;

    if let TransactionStatus::Failed(reason) = &report.status {
        anyhow::bail!("transaction failed: {}", reason);
    }
    Ok(())
}
