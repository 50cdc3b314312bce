use anyhow::{Context as _, Result};

use super::Context;
use crate::chain::account::{account_balance, AccountId};
use crate::cli::BalanceArgs;
use crate::output::account::print_balance_tree;

pub async fn run(ctx: &Context, args: BalanceArgs) -> Result<()> {
    let account = AccountId::parse(&args.account)
        .with_context(|| format!("cannot read account {}", args.account))?;
    let client = ctx.node_client()?;
    let balance = account_balance(&client, &account).await?;
    ctx.output.emit(&balance, print_balance_tree)
}
