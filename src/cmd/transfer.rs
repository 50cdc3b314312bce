use anyhow::Result;

use super::{submit_call, Context};
use crate::cli::TransferArgs;
use crate::form::FieldStatus;
use crate::output::tx::FieldReport;
use crate::tx::calls::{amount_report, transfer};
use crate::validator::ValidationReport;

/// Checks on a destination account id.
pub fn account_report(account: &str) -> ValidationReport {
    ValidationReport::from_checks([(!account.trim().is_empty(), "The destination account must be set")])
}

pub async fn run(ctx: &Context, args: TransferArgs) -> Result<()> {
    let (amount_checks, amount) = amount_report(&args.amount);
    let fields = vec![
        FieldReport::new("Destination", &args.dest, FieldStatus::Checked(account_report(&args.dest))),
        FieldReport::new("Amount", &args.amount, FieldStatus::Checked(amount_checks)),
    ];
    let call = amount.map(|amount| transfer(args.dest.trim(), amount));
    submit_call(ctx, call, fields).await
}
