//! Builders for the balances and democracy calls.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Call;
use crate::chain::codec::from_hex;
use crate::validator::ValidationReport;

/// Vote conviction: multiplier on the voting balance in exchange for a lock.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Conviction {
    /// 0.1x voting balance, no lockup period
    #[default]
    None,
    Locked1x,
    Locked2x,
    Locked3x,
    Locked4x,
    Locked5x,
    Locked6x,
}

impl Conviction {
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Validate a transfer or deposit amount given in chain units.
pub fn amount_report(input: &str) -> (ValidationReport, Option<u128>) {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    // the sign is checked separately so the magnitude covers the full u128 range
    let magnitude = digits.parse::<u128>().ok().filter(|_| !digits.starts_with('+'));
    let amount = magnitude.filter(|n| !negative && *n > 0);
    let report = ValidationReport::from_checks([
        (magnitude.is_some(), "The number must be correctly formatted"),
        (amount.is_some(), "The number must have the correct sign (positive)"),
    ]);
    (report, amount)
}

/// Validate a 32 byte hex hash such as a preimage hash.
pub fn hash_report(input: &str) -> ValidationReport {
    let bytes = from_hex(input.trim()).ok();
    ValidationReport::from_checks([
        (bytes.is_some(), "The hash must be hex encoded"),
        (bytes.map(|b| b.len() == 32).unwrap_or(false), "The hash must be 32 bytes long"),
    ])
}

pub fn transfer(dest: &str, amount: u128) -> Call {
    Call::new("balances", "transfer")
        .arg("dest", dest)
        .arg("value", amount.to_string())
}

pub fn propose(proposal_hash: &str, value: u128) -> Call {
    Call::new("democracy", "propose")
        .arg("proposal_hash", proposal_hash)
        .arg("value", value.to_string())
}

pub fn second(proposal: u32, seconds_upper_bound: u32) -> Call {
    Call::new("democracy", "second")
        .arg("proposal", proposal)
        .arg("seconds_upper_bound", seconds_upper_bound)
}

pub fn vote(ref_index: u32, aye: bool, conviction: Conviction, balance: u128) -> Call {
    Call::new("democracy", "vote").arg("ref_index", ref_index).arg(
        "vote",
        json!({
            "Standard": {
                "balance": balance.to_string(),
                "vote": { "aye": aye, "conviction": conviction.index() }
            }
        }),
    )
}

pub fn note_preimage(encoded_proposal: &str) -> Call {
    Call::new("democracy", "notePreimage").arg("encoded_proposal", encoded_proposal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_must_be_positive_integer() {
        let (report, amount) = amount_report("1500");
        assert!(report.ok());
        assert_eq!(amount, Some(1500));

        let (report, amount) = amount_report("-3");
        assert!(!report.ok());
        assert!(report.criteria[0].ok);
        assert!(!report.criteria[1].ok);
        assert_eq!(amount, None);

        let (report, _) = amount_report("12.5.");
        assert!(!report.criteria[0].ok);
        assert!(!report.criteria[1].ok);
    }

    #[test]
    fn amount_covers_full_balance_range() {
        let max = u128::MAX.to_string();
        let (report, amount) = amount_report(&max);
        assert!(report.ok());
        assert_eq!(amount, Some(u128::MAX));

        let (report, amount) = amount_report(&format!("-{}", max));
        assert!(report.criteria[0].ok);
        assert!(!report.criteria[1].ok);
        assert_eq!(amount, None);

        let (report, _) = amount_report("0");
        assert!(report.criteria[0].ok);
        assert!(!report.criteria[1].ok);

        let (report, _) = amount_report("--5");
        assert!(!report.criteria[0].ok);
    }

    #[test]
    fn hash_needs_32_bytes() {
        let good = format!("0x{}", "ab".repeat(32));
        assert!(hash_report(&good).ok());
        assert!(!hash_report("0xabcd").ok());
        assert!(!hash_report("nothex").ok());
    }

    #[test]
    fn vote_matches_standard_account_vote() {
        let call = vote(3, true, Conviction::Locked2x, 100);
        assert_eq!(call.to_string(), "democracy.vote(ref_index, vote)");
        assert_eq!(
            call.args[1].value,
            json!({"Standard": {"balance": "100", "vote": {"aye": true, "conviction": 2}}})
        );
    }

    #[test]
    fn transfer_argument_order() {
        let call = transfer("5GrwvaEF", 42);
        assert_eq!(call.arg_names(), vec!["dest", "value"]);
        assert_eq!(call.args[1].value, json!("42"));
    }
}
