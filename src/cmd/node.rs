use anyhow::Result;

use super::Context;
use crate::chain::node::{block_header, node_info};
use crate::cli::NodeArgs;
use crate::output::node::{print_block_tree, print_node_tree};

/// Show identity, health and best block of the configured node, or one block by number.
pub async fn run(ctx: &Context, args: NodeArgs) -> Result<()> {
    let client = ctx.node_client()?;
    match args.block {
        Some(number) => match block_header(&client, number).await? {
            Some(header) => ctx.output.emit(&header, print_block_tree),
            None => anyhow::bail!("block #{} not found", number),
        },
        None => {
            let info = node_info(&client).await?;
            ctx.output.emit(&info, print_node_tree)
        }
    }
}
