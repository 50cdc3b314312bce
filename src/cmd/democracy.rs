use anyhow::Result;

use super::{submit_call, Context};
use crate::chain::codec::from_hex;
use crate::chain::democracy::overview;
use crate::cli::{DemocracyArgs, DemocracyCommand};
use crate::form::FieldStatus;
use crate::output::democracy::print_democracy_tree;
use crate::output::tx::FieldReport;
use crate::tx::calls::{amount_report, hash_report, note_preimage, propose, second, vote};
use crate::validator::ValidationReport;

fn preimage_report(encoded: &str) -> ValidationReport {
    let bytes = from_hex(encoded.trim()).ok();
    ValidationReport::from_checks([
        (bytes.is_some(), "The proposal must be hex encoded"),
        (bytes.map(|b| !b.is_empty()).unwrap_or(false), "The proposal must not be empty"),
    ])
}

pub async fn run(ctx: &Context, args: DemocracyArgs) -> Result<()> {
    match args.command {
        DemocracyCommand::List => {
            let client = ctx.node_client()?;
            let overview = overview(&client).await?;
            ctx.output.emit(&overview, print_democracy_tree)
        }
        DemocracyCommand::Propose { proposal_hash, value } => {
            let (value_checks, deposit) = amount_report(&value);
            let fields = vec![
                FieldReport::new("Proposal hash", &proposal_hash, FieldStatus::Checked(hash_report(&proposal_hash))),
                FieldReport::new("Deposit", &value, FieldStatus::Checked(value_checks)),
            ];
            let call = deposit.map(|deposit| propose(proposal_hash.trim(), deposit));
            submit_call(ctx, call, fields).await
        }
        DemocracyCommand::Second { proposal, seconds_upper_bound } => {
            submit_call(ctx, Some(second(proposal, seconds_upper_bound)), Vec::new()).await
        }
        DemocracyCommand::Vote { ref_index, nay, conviction, balance } => {
            let (balance_checks, amount) = amount_report(&balance);
            let fields = vec![FieldReport::new("Balance", &balance, FieldStatus::Checked(balance_checks))];
            let call = amount.map(|amount| vote(ref_index, !nay, conviction, amount));
            submit_call(ctx, call, fields).await
        }
        DemocracyCommand::Preimage { encoded_proposal } => {
            let fields = vec![FieldReport::new(
                "Encoded proposal",
                &encoded_proposal,
                FieldStatus::Checked(preimage_report(&encoded_proposal)),
            )];
            submit_call(ctx, Some(note_preimage(encoded_proposal.trim())), fields).await
        }
    }
}
