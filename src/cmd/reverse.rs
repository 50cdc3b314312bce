use anyhow::Result;

use super::Context;
use crate::chain::ChainQuery;
use crate::cli::ReverseArgs;
use crate::output::cert::print_certificate_list;

/// List the certificates registered for an IP address.
pub async fn run(ctx: &Context, args: ReverseArgs) -> Result<()> {
    let ip = args.ip.trim();
    let records = ctx.chain()?.reverse(ip).await?;
    ctx.output
        .emit(&records, |r| print_certificate_list(&format!("Certificates for {}", ip), r))
}
