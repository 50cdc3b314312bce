use anyhow::Result;

use super::Context;
use crate::certificate::DumpEntry;
use crate::chain::{ChainQuery, RpcChainQuery};
use crate::cli::DumpArgs;
use crate::util::json::{save_json_output, to_json_string, JsonStyle};

/// Dump every registered certificate as a JSON array.
pub async fn run(ctx: &Context, args: DumpArgs) -> Result<()> {
    let concurrency = args.concurrency.unwrap_or(ctx.config.scan_concurrency).max(1);
    let query = RpcChainQuery::new(ctx.node_client()?, concurrency);
    let records = query.certificates().await?;
    let entries: Vec<DumpEntry> = records.iter().map(DumpEntry::from).collect();
    tracing::info!("Dumped {} certificate(s)", entries.len());

    let style = if args.compact { JsonStyle::Compact } else { JsonStyle::Pretty };
    if !ctx.output.no_stdout {
        println!("{}", to_json_string(&entries, style)?);
    }
    if let Some(path) = &ctx.output.path {
        save_json_output(&entries, path, style)?;
        tracing::info!("JSON output saved to {}", path.display());
    }
    Ok(())
}
